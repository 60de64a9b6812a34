//! Graph suppliers.
//!
//! A [`DagPool`] hands out named graphs in batches so experiment drivers can
//! process large collections without holding them all in memory.
//!
//! - [`DagGenerator`]: seeded random layered graphs
//! - [`DagReader`]: graphs read from a directory of text files

mod generator;
mod reader;

pub use generator::{DagGenerator, Density};
pub use reader::DagReader;

use crate::error::Result;
use crate::models::Dag;

/// A graph with a display name (file stem or generated label).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedDag {
    pub name: String,
    pub dag: Dag,
}

impl NamedDag {
    pub fn new(name: impl Into<String>, dag: Dag) -> Self {
        Self {
            name: name.into(),
            dag,
        }
    }
}

/// Batch-wise supplier of graphs.
pub trait DagPool {
    /// Clears `buffer` and fills it with up to [`batch_size`](Self::batch_size)
    /// graphs. Returns how many were produced; 0 once the pool is exhausted.
    fn next_batch(&mut self, buffer: &mut Vec<NamedDag>) -> Result<usize>;

    /// Maximum graphs per batch.
    fn batch_size(&self) -> usize;

    /// Total graphs the pool will supply (an upper bound for readers, which
    /// may skip files).
    fn sample_count(&self) -> usize;
}
