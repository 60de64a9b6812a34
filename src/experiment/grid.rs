//! Parallel grid search over algorithm parameters.
//!
//! Every point of a [`ParameterGrid`] builds its own optimizer from an
//! [`AlgorithmConfig`], so points share nothing and run on a dedicated
//! `rayon` pool. Results come back in grid order regardless of thread count.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AlgorithmConfig;
use crate::error::Result;
use crate::pool::NamedDag;

/// Named parameter axes; the grid is their cartesian product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    axes: BTreeMap<String, Vec<f64>>,
}

impl ParameterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an axis.
    pub fn with_axis(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.axes.insert(name.into(), values);
        self
    }

    pub fn axes(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.axes
    }

    /// Number of points. An empty axis empties the grid; no axes at all is a
    /// single point with no overrides.
    pub fn len(&self) -> usize {
        self.axes.values().map(Vec::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All points, axes in name order with the last axis varying fastest.
    pub fn points(&self) -> Vec<BTreeMap<String, f64>> {
        let mut points = vec![BTreeMap::new()];
        for (name, values) in &self.axes {
            points = points
                .into_iter()
                .flat_map(|point| {
                    values.iter().map(move |&value| {
                        let mut next = point.clone();
                        next.insert(name.clone(), value);
                        next
                    })
                })
                .collect();
        }
        points
    }
}

/// Aggregate outcome of one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub parameters: BTreeMap<String, f64>,
    pub mean_cost: f64,
    pub mean_micros: f64,
    /// Schedules computed (graphs x duplicates).
    pub runs: usize,
}

/// Evaluates every point of `grid` on every graph, `duplicates` times each,
/// using `threads` workers.
///
/// # Errors
/// - [`ScheduleError::WorkerPool`](crate::error::ScheduleError::WorkerPool)
///   if the thread pool cannot be created
/// - the first parameter error raised while building a point's optimizer
pub fn grid_search(
    config: &AlgorithmConfig,
    grid: &ParameterGrid,
    graphs: &[NamedDag],
    duplicates: usize,
    threads: usize,
) -> Result<Vec<GridPoint>> {
    let duplicates = duplicates.max(1);
    let points = grid.points();
    info!(
        algorithm = %config.kind,
        points = points.len(),
        graphs = graphs.len(),
        threads,
        "starting grid search"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;

    pool.install(|| {
        points
            .into_par_iter()
            .map(|parameters| {
                let mut optimizer = config.build_with(&parameters)?;
                let mut total_cost = 0u64;
                let mut total_micros = 0u64;
                for graph in graphs {
                    for _ in 0..duplicates {
                        total_cost += optimizer.schedule(&graph.dag).cost();
                        total_micros += optimizer.last_run_micros();
                    }
                }
                let runs = graphs.len() * duplicates;
                let mean = |total: u64| {
                    if runs == 0 {
                        0.0
                    } else {
                        total as f64 / runs as f64
                    }
                };
                debug!(?parameters, mean_cost = mean(total_cost), "grid point done");
                Ok(GridPoint {
                    mean_cost: mean(total_cost),
                    mean_micros: mean(total_micros),
                    parameters,
                    runs,
                })
            })
            .collect()
    })
}
