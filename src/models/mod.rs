//! Peak-resource scheduling domain models.
//!
//! Provides the graph being scheduled and the schedules produced for it.
//!
//! # Domain Mappings
//!
//! | u-peakmem | Dataflow execution | Instruction scheduling |
//! |-----------|--------------------|------------------------|
//! | Vertex | Operator / tensor | Instruction / value |
//! | Weight | Output bytes | Registers occupied |
//! | Edge | Data dependency | Def-use |
//! | Schedule | Execution order | Issue order |
//! | Cost | Peak memory | Peak register pressure |

mod dag;
mod schedule;

pub use dag::{Dag, DagBuilder, VertexId, Weight};
pub use schedule::{Schedule, ScheduleEntry};
