//! Seeded random DAG generation.

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DagPool, NamedDag};
use crate::error::{Result, ScheduleError};
use crate::models::{Dag, VertexId, Weight};

/// Edge density of generated graphs, as a fraction of the possible
/// non-tree edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Density {
    /// One of the listed values, uniformly.
    Choices(Vec<f64>),
    /// Uniform in `[min, max]`.
    Range { min: f64, max: f64 },
}

impl Density {
    fn validate(&self) -> Result<()> {
        let in_unit = |d: f64| d.is_finite() && (0.0..=1.0).contains(&d);
        match self {
            Density::Choices(values) if values.is_empty() => Err(
                ScheduleError::invalid_parameter("density", f64::NAN, "needs at least one value"),
            ),
            Density::Choices(values) => match values.iter().find(|&&d| !in_unit(d)) {
                Some(&bad) => Err(ScheduleError::invalid_parameter(
                    "density",
                    bad,
                    "must lie in [0, 1]",
                )),
                None => Ok(()),
            },
            Density::Range { min, max } if !(in_unit(*min) && in_unit(*max) && min <= max) => Err(
                ScheduleError::invalid_parameter("density", *min, "range must lie in [0, 1]"),
            ),
            Density::Range { .. } => Ok(()),
        }
    }

    fn sample(&self, rng: &mut SmallRng) -> f64 {
        match self {
            Density::Choices(values) => values[rng.random_range(0..values.len())],
            Density::Range { min, max } if min == max => *min,
            Density::Range { min, max } => rng.random_range(*min..=*max),
        }
    }
}

/// Generates weakly connected DAGs with edges oriented from lower to higher
/// id.
///
/// Each graph draws a density `d` and a vertex count `n`, then keeps a
/// random spanning tree plus random extra edges up to
/// `max(n - 1, d * (n - 1)(n - 2) / 2)` edges in total. Vertex weights are
/// uniform in the weight range except for sinks, which weigh 0 (their
/// output is never held for a consumer).
///
/// # Example
/// ```
/// use u_peakmem::pool::{DagGenerator, DagPool, Density};
///
/// let mut pool = DagGenerator::new((5, 8), Density::Choices(vec![0.3]), (1, 10), 4, 2, 7).unwrap();
/// let mut batch = Vec::new();
/// assert_eq!(pool.next_batch(&mut batch).unwrap(), 2);
/// assert_eq!(batch[0].name, "dag_0");
/// ```
#[derive(Debug, Clone)]
pub struct DagGenerator {
    vertices: (usize, usize),
    density: Density,
    weights: (Weight, Weight),
    samples: usize,
    batch_size: usize,
    produced: usize,
    prefix: String,
    rng: SmallRng,
}

impl DagGenerator {
    /// Creates a generator of `samples` graphs in batches of `batch_size`.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidParameter`] for an empty or inverted vertex
    /// range, an inverted weight range, densities outside `[0, 1]` or a zero
    /// batch size.
    pub fn new(
        vertices: (usize, usize),
        density: Density,
        weights: (Weight, Weight),
        samples: usize,
        batch_size: usize,
        seed: u64,
    ) -> Result<Self> {
        if vertices.0 == 0 || vertices.0 > vertices.1 {
            return Err(ScheduleError::invalid_parameter(
                "nVertices",
                vertices.0 as f64,
                "range must be non-empty and start at 1 or more",
            ));
        }
        if weights.0 > weights.1 {
            return Err(ScheduleError::invalid_parameter(
                "weights",
                weights.0 as f64,
                "minimum exceeds maximum",
            ));
        }
        if batch_size == 0 {
            return Err(ScheduleError::invalid_parameter(
                "batchSize",
                0.0,
                "must be at least 1",
            ));
        }
        density.validate()?;

        Ok(Self {
            vertices,
            density,
            weights,
            samples,
            batch_size,
            produced: 0,
            prefix: "dag_".to_string(),
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Sets the graph name prefix (default `dag_`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Graphs handed out so far.
    pub fn produced(&self) -> usize {
        self.produced
    }

    fn make_graph(&mut self) -> Result<Dag> {
        let density = self.density.sample(&mut self.rng);
        let n = self.rng.random_range(self.vertices.0..=self.vertices.1);

        let tree_edges = n - 1;
        let max_edges = n * (n - 1) / 2;
        let extra_pairs = tree_edges * n.saturating_sub(2) / 2;
        let target = ((density * extra_pairs as f64) as usize)
            .max(tree_edges)
            .min(max_edges);

        let mut edges: Vec<(VertexId, VertexId)> = Vec::with_capacity(target);
        let mut present = HashSet::with_capacity(target);
        for v in 1..n {
            let parent = self.rng.random_range(0..v);
            edges.push((parent, v));
            present.insert((parent, v));
        }

        if target > edges.len() {
            let mut candidates: Vec<(VertexId, VertexId)> = (0..n)
                .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
                .filter(|pair| !present.contains(pair))
                .collect();
            candidates.shuffle(&mut self.rng);
            let missing = target - edges.len();
            edges.extend(candidates.into_iter().take(missing));
        }

        let mut has_successor = vec![false; n];
        for &(from, _) in &edges {
            has_successor[from] = true;
        }
        let weights = has_successor
            .iter()
            .map(|&inner| {
                if inner {
                    self.rng.random_range(self.weights.0..=self.weights.1)
                } else {
                    0
                }
            })
            .collect();

        Dag::new(weights, &edges)
    }
}

impl DagPool for DagGenerator {
    fn next_batch(&mut self, buffer: &mut Vec<NamedDag>) -> Result<usize> {
        buffer.clear();
        while self.produced < self.samples && buffer.len() < self.batch_size {
            let dag = self.make_graph()?;
            let name = format!("{}{}", self.prefix, self.produced);
            debug!(name = %name, vertices = dag.vertex_count(), edges = dag.edge_count(), "generated graph");
            buffer.push(NamedDag::new(name, dag));
            self.produced += 1;
        }
        Ok(buffer.len())
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn sample_count(&self) -> usize {
        self.samples
    }
}
