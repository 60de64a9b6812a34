//! Weighted precedence graph.
//!
//! A [`Dag`] is immutable once built: every optimizer borrows it read-only
//! for the duration of a scheduling call, so one graph can be shared across
//! threads without synchronization.
//!
//! Vertex `v` carries a resource weight (e.g. the bytes of the tensor it
//! produces). An edge `u -> v` means `v` consumes `u`'s output, so `u` must
//! be scheduled first and stays resident until its last consumer runs.

use std::collections::VecDeque;

use crate::error::{Result, ScheduleError};
use crate::validation::validate_graph;

/// Dense vertex identifier, `0..vertex_count`.
pub type VertexId = usize;

/// Resource weight of a vertex.
pub type Weight = u64;

/// An immutable, validated, weighted DAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dag {
    weights: Vec<Weight>,
    successors: Vec<Vec<VertexId>>,
    predecessors: Vec<Vec<VertexId>>,
    edge_count: usize,
}

impl Dag {
    /// Builds a graph from per-vertex weights and an edge list.
    ///
    /// # Errors
    /// - [`ScheduleError::EmptyGraph`] if `weights` is empty
    /// - [`ScheduleError::InvalidGraph`] listing every out-of-range edge,
    ///   self-loop, duplicate edge and cycle
    pub fn new(weights: Vec<Weight>, edges: &[(VertexId, VertexId)]) -> Result<Self> {
        let n = weights.len();
        if n == 0 {
            return Err(ScheduleError::EmptyGraph);
        }
        validate_graph(n, edges).map_err(ScheduleError::InvalidGraph)?;

        let mut successors = vec![Vec::new(); n];
        let mut predecessors = vec![Vec::new(); n];
        for &(from, to) in edges {
            successors[from].push(to);
            predecessors[to].push(from);
        }
        for list in successors.iter_mut().chain(predecessors.iter_mut()) {
            list.sort_unstable();
        }

        Ok(Self {
            weights,
            successors,
            predecessors,
            edge_count: edges.len(),
        })
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.weights.len()
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Resource weight of `v`.
    #[inline]
    pub fn weight(&self, v: VertexId) -> Weight {
        self.weights[v]
    }

    /// All vertex weights, indexed by vertex.
    pub fn weights(&self) -> &[Weight] {
        &self.weights
    }

    /// Direct successors (consumers) of `v`, ascending.
    #[inline]
    pub fn successors(&self, v: VertexId) -> &[VertexId] {
        &self.successors[v]
    }

    /// Direct predecessors (inputs) of `v`, ascending.
    #[inline]
    pub fn predecessors(&self, v: VertexId) -> &[VertexId] {
        &self.predecessors[v]
    }

    #[inline]
    pub fn in_degree(&self, v: VertexId) -> usize {
        self.predecessors[v].len()
    }

    #[inline]
    pub fn out_degree(&self, v: VertexId) -> usize {
        self.successors[v].len()
    }

    /// Vertices without predecessors, ascending.
    pub fn sources(&self) -> Vec<VertexId> {
        (0..self.vertex_count())
            .filter(|&v| self.predecessors[v].is_empty())
            .collect()
    }

    /// Sum of all vertex weights; an upper bound on any schedule's peak.
    pub fn total_weight(&self) -> Weight {
        self.weights.iter().sum()
    }

    /// All edges as `(from, to)` pairs, grouped by source.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(from, succ)| succ.iter().map(move |&to| (from, to)))
    }

    /// A topological order (Kahn's algorithm, sources in ascending id).
    pub fn topological_order(&self) -> Vec<VertexId> {
        let mut remaining: Vec<usize> = (0..self.vertex_count()).map(|v| self.in_degree(v)).collect();
        let mut queue: VecDeque<VertexId> = self.sources().into();
        let mut order = Vec::with_capacity(self.vertex_count());
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &s in &self.successors[v] {
                remaining[s] -= 1;
                if remaining[s] == 0 {
                    queue.push_back(s);
                }
            }
        }
        order
    }
}

/// Incremental builder for [`Dag`].
///
/// Vertices may be declared out of order with [`DagBuilder::with_weight`];
/// any vertex referenced by an edge but never weighted is rejected at
/// [`DagBuilder::build`].
///
/// # Example
/// ```
/// use u_peakmem::models::DagBuilder;
///
/// let dag = DagBuilder::new()
///     .with_vertex(4)
///     .with_vertex(2)
///     .with_edge(0, 1)
///     .build()
///     .unwrap();
/// assert_eq!(dag.vertex_count(), 2);
/// assert_eq!(dag.successors(0), &[1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DagBuilder {
    weights: Vec<Option<Weight>>,
    edges: Vec<(VertexId, VertexId)>,
}

impl DagBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex with the next free id.
    pub fn with_vertex(mut self, weight: Weight) -> Self {
        self.weights.push(Some(weight));
        self
    }

    /// Sets the weight of vertex `v`, growing the vertex range if needed.
    pub fn with_weight(mut self, v: VertexId, weight: Weight) -> Self {
        self.set_weight(v, weight);
        self
    }

    /// Adds a precedence edge `from -> to`.
    pub fn with_edge(mut self, from: VertexId, to: VertexId) -> Self {
        self.add_edge(from, to);
        self
    }

    /// In-place form of [`DagBuilder::with_weight`].
    pub fn set_weight(&mut self, v: VertexId, weight: Weight) {
        if v >= self.weights.len() {
            self.weights.resize(v + 1, None);
        }
        self.weights[v] = Some(weight);
    }

    /// In-place form of [`DagBuilder::with_edge`].
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) {
        let needed = from.max(to) + 1;
        if needed > self.weights.len() {
            self.weights.resize(needed, None);
        }
        self.edges.push((from, to));
    }

    /// Validates and freezes the graph.
    ///
    /// # Errors
    /// [`ScheduleError::UndefinedWeight`] for the first vertex without a
    /// weight, then anything [`Dag::new`] rejects.
    pub fn build(self) -> Result<Dag> {
        let weights = self
            .weights
            .iter()
            .enumerate()
            .map(|(v, w)| w.ok_or(ScheduleError::UndefinedWeight(v)))
            .collect::<Result<Vec<_>>>()?;
        Dag::new(weights, &self.edges)
    }
}
