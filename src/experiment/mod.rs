//! Experiment drivers.
//!
//! # Components
//!
//! | Item | Role |
//! |------|------|
//! | [`ExperimentRunner`] | Runs algorithms over a [`DagPool`](crate::pool::DagPool), one table per batch |
//! | [`ResultTable`] | Labelled integer table with CSV export |
//! | [`ParameterGrid`] / [`grid_search`] | Parallel parameter sweeps |
//!
//! # Usage
//!
//! ```
//! use u_peakmem::experiment::ExperimentRunner;
//! use u_peakmem::optimizer::{GreedyScheduler, Optimizer, RandomScheduler};
//! use u_peakmem::pool::{DagGenerator, Density};
//!
//! let mut pool = DagGenerator::new((6, 10), Density::Choices(vec![0.2]), (1, 20), 4, 4, 3).unwrap();
//! let mut algorithms: Vec<Box<dyn Optimizer>> =
//!     vec![Box::new(GreedyScheduler::new()), Box::new(RandomScheduler::new())];
//!
//! let tables = ExperimentRunner::new()
//!     .with_duplicates(2)
//!     .run(&mut algorithms, &mut pool)
//!     .unwrap();
//! assert_eq!(tables.len(), 2);
//! assert_eq!(tables[0].label(), "Greedy_0");
//! ```

mod grid;
mod runner;
mod table;

pub use grid::{grid_search, GridPoint, ParameterGrid};
pub use runner::ExperimentRunner;
pub use table::{ResultTable, TableRow};
