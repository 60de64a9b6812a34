//! Peak-resource scheduling of weighted DAGs.
//!
//! Finds a topological order of a vertex-weighted DAG that minimizes the
//! peak live weight: the largest total weight, over all steps, of vertices
//! already executed whose consumers have not all run yet. This is the
//! memory-aware ordering problem of dataflow graph execution.
//!
//! # Modules
//!
//! - **`models`**: `Dag`, `DagBuilder`, `Schedule`, `ScheduleEntry`
//! - **`construction`**: `ScheduleState` (incremental engine), construction
//!   policies (`UniformRandom`, `Greedy`) and the `construct` driver
//! - **`corrector`**: position bounds and precedence-preserving relocation
//! - **`optimizer`**: `Optimizer` trait and algorithms: random and greedy
//!   baselines, `AntColony`, `AntQ`, `SumiAco`, `SimulatedAnnealing`,
//!   `BranchAndBound`
//! - **`pool`**: batch graph suppliers (`DagGenerator`, `DagReader`)
//! - **`validation`**: graph checks and independent schedule verification
//! - **`config`**: JSON algorithm suites and graph generation parameters
//! - **`experiment`**: result tables, multi-run experiments, grid search
//!
//! # Usage
//!
//! ```
//! use u_peakmem::models::DagBuilder;
//! use u_peakmem::optimizer::{BaselineKind, Optimizer, SimulatedAnnealing};
//!
//! let dag = DagBuilder::new()
//!     .with_vertex(1)
//!     .with_vertex(2)
//!     .with_vertex(2)
//!     .with_vertex(1)
//!     .with_edge(0, 1)
//!     .with_edge(0, 2)
//!     .with_edge(1, 3)
//!     .with_edge(2, 3)
//!     .build()
//!     .unwrap();
//!
//! let mut sa = SimulatedAnnealing::new(BaselineKind::Greedy.build());
//! let schedule = sa.schedule(&dag);
//! assert_eq!(schedule.vertices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
//! assert_eq!(schedule.cost(), 4);
//! ```
//!
//! # References
//!
//! - Dorigo & Gambardella (1997), "Ant Colony System: A Cooperative Learning
//!   Approach to the Traveling Salesman Problem"
//! - Gambardella & Dorigo (1995), "Ant-Q: A Reinforcement Learning Approach
//!   to the Traveling Salesman Problem"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Sethi (1975), "Complete Register Allocation Problems"

pub mod config;
pub mod construction;
pub mod corrector;
pub mod error;
pub mod experiment;
pub mod models;
pub mod optimizer;
pub mod pool;
pub mod validation;

pub use error::{Result, ScheduleError};
