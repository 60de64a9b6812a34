//! Multi-run experiments over a graph pool.

use std::path::PathBuf;

use tracing::{debug, info};

use super::table::ResultTable;
use crate::error::Result;
use crate::optimizer::Optimizer;
use crate::pool::DagPool;

/// Runs every algorithm on every graph of a pool, `duplicates` times each,
/// and tabulates cost, time and iterations.
///
/// One table is produced per (algorithm, batch), labelled
/// `<algorithm>_<batch>`, with columns
/// `duplicates, n_vertex, n_edges, cost_i..., time_i..., iters_i...`.
/// Times are microseconds; non-iterative algorithms report one iteration.
#[derive(Debug, Clone)]
pub struct ExperimentRunner {
    duplicates: usize,
    output_dir: Option<PathBuf>,
    separator: char,
}

impl Default for ExperimentRunner {
    fn default() -> Self {
        Self {
            duplicates: 1,
            output_dir: None,
            separator: ResultTable::SEPARATOR,
        }
    }
}

impl ExperimentRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs per graph and algorithm (at least 1).
    pub fn with_duplicates(mut self, duplicates: usize) -> Self {
        self.duplicates = duplicates.max(1);
        self
    }

    /// Writes each table to `<dir>/<label>.csv` as it completes.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    fn columns(&self) -> Vec<String> {
        let d = self.duplicates;
        ["duplicates", "n_vertex", "n_edges"]
            .iter()
            .map(|c| c.to_string())
            .chain((0..d).map(|i| format!("cost_{i}")))
            .chain((0..d).map(|i| format!("time_{i}")))
            .chain((0..d).map(|i| format!("iters_{i}")))
            .collect()
    }

    /// Drains `pool` batch by batch.
    ///
    /// # Errors
    /// Pool errors (unreadable or malformed graphs) and CSV write failures.
    pub fn run(
        &self,
        algorithms: &mut [Box<dyn Optimizer>],
        pool: &mut dyn DagPool,
    ) -> Result<Vec<ResultTable>> {
        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir)?;
        }

        let mut tables = Vec::new();
        let mut batch = Vec::with_capacity(pool.batch_size());
        let mut batch_index = 0;
        while pool.next_batch(&mut batch)? > 0 {
            debug!(batch = batch_index, graphs = batch.len(), "running batch");
            for algorithm in algorithms.iter_mut() {
                let label = format!("{}_{}", algorithm.name(), batch_index);
                let mut table = ResultTable::new(label, self.columns());

                for graph in &batch {
                    let mut costs = Vec::with_capacity(self.duplicates);
                    let mut times = Vec::with_capacity(self.duplicates);
                    let mut iters = Vec::with_capacity(self.duplicates);
                    for _ in 0..self.duplicates {
                        let schedule = algorithm.schedule(&graph.dag);
                        costs.push(schedule.cost());
                        times.push(algorithm.last_run_micros());
                        iters.push(u64::from(algorithm.iteration_count().unwrap_or(1)));
                    }

                    let mut cells = vec![
                        self.duplicates as u64,
                        graph.dag.vertex_count() as u64,
                        graph.dag.edge_count() as u64,
                    ];
                    cells.extend(costs);
                    cells.extend(times);
                    cells.extend(iters);
                    table.push_row(graph.name.clone(), cells);
                }

                if let Some(dir) = &self.output_dir {
                    let path = dir.join(format!("{}.csv", table.label()));
                    table.write_csv(&path, self.separator)?;
                    info!(path = %path.display(), "wrote result table");
                }
                tables.push(table);
            }
            batch_index += 1;
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{BaselineKind, GreedyScheduler, SimulatedAnnealing};
    use crate::pool::{DagGenerator, Density};

    fn pool() -> DagGenerator {
        DagGenerator::new((5, 8), Density::Choices(vec![0.3]), (1, 5), 3, 2, 4).unwrap()
    }

    #[test]
    fn test_tables_per_algorithm_and_batch() {
        let mut algorithms: Vec<Box<dyn Optimizer>> = vec![
            Box::new(GreedyScheduler::new()),
            Box::new(
                SimulatedAnnealing::new(BaselineKind::Greedy.build())
                    .with_temperatures(1.0, 4.0),
            ),
        ];
        let runner = ExperimentRunner::new().with_duplicates(2);
        let tables = runner.run(&mut algorithms, &mut pool()).unwrap();

        let labels: Vec<_> = tables.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["Greedy_0", "SAO_0", "Greedy_1", "SAO_1"]);
        assert_eq!(
            tables[0].columns(),
            &[
                "duplicates", "n_vertex", "n_edges", "cost_0", "cost_1", "time_0", "time_1",
                "iters_0", "iters_1"
            ]
        );
        assert_eq!(tables[0].rows().len(), 2);
        assert_eq!(tables[2].rows().len(), 1);
        assert_eq!(tables[0].rows()[0].label, "dag_0");
        // Greedy is not iterative.
        assert_eq!(tables[0].column("iters_0"), Some(vec![1, 1]));
        assert_eq!(tables[0].column("duplicates"), Some(vec![2, 2]));
    }

    #[test]
    fn test_writes_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let mut algorithms: Vec<Box<dyn Optimizer>> = vec![Box::new(GreedyScheduler::new())];
        ExperimentRunner::new()
            .with_output_dir(&out)
            .run(&mut algorithms, &mut pool())
            .unwrap();
        let text = std::fs::read_to_string(out.join("Greedy_0.csv")).unwrap();
        assert!(text.starts_with(";duplicates;n_vertex;n_edges;cost_0;time_0;iters_0\n"));
        assert!(out.join("Greedy_1.csv").exists());
    }

    #[test]
    fn test_duplicates_floor() {
        assert_eq!(ExperimentRunner::new().with_duplicates(0).duplicates(), 1);
    }
}
