//! Input and output validation.
//!
//! Checks structural integrity of a weighted DAG before it reaches the
//! optimizers, and independently verifies schedules they produce. Detects:
//! - Edges pointing outside the vertex range
//! - Self-loops and duplicate edges
//! - Circular precedence dependencies
//! - Incomplete schedules, repeated or unknown vertices
//! - Precedence violations
//! - Recorded costs that disagree with the live-set definition
//!
//! Problems are collected rather than reported one at a time.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::models::{Dag, Schedule, VertexId, Weight};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An edge endpoint is not a vertex of the graph.
    EdgeOutOfRange,
    /// An edge connects a vertex to itself.
    SelfLoop,
    /// The same edge appears more than once.
    DuplicateEdge,
    /// Precedence graph contains a cycle.
    CyclicDependency,
    /// A schedule does not cover every vertex.
    IncompleteSchedule,
    /// A vertex appears twice in a schedule.
    DuplicateVertex,
    /// A schedule names a vertex the graph does not have.
    UnknownVertex,
    /// A vertex is scheduled before one of its predecessors.
    PrecedenceViolation,
    /// A recorded step cost differs from the recomputed one.
    CostMismatch,
    /// The recorded peak differs from the recomputed one.
    PeakMismatch,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates an edge list over `vertex_count` vertices.
///
/// Checks:
/// 1. Both endpoints of every edge are in `0..vertex_count`
/// 2. No self-loops
/// 3. No duplicate edges
/// 4. No cycles
pub fn validate_graph(vertex_count: usize, edges: &[(VertexId, VertexId)]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut usable = Vec::with_capacity(edges.len());

    for &(from, to) in edges {
        if from >= vertex_count || to >= vertex_count {
            errors.push(ValidationError::new(
                ValidationErrorKind::EdgeOutOfRange,
                format!("edge {from}->{to} references a vertex outside 0..{vertex_count}"),
            ));
            continue;
        }
        if from == to {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfLoop,
                format!("self-loop on vertex {from}"),
            ));
            continue;
        }
        if !seen.insert((from, to)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateEdge,
                format!("duplicate edge {from}->{to}"),
            ));
            continue;
        }
        usable.push((from, to));
    }

    if let Some(cycle_err) = detect_cycles(vertex_count, &usable) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles with Kahn's algorithm: any vertex never reaching
/// in-degree zero lies on or behind a cycle.
fn detect_cycles(vertex_count: usize, edges: &[(VertexId, VertexId)]) -> Option<ValidationError> {
    let mut adj = vec![Vec::new(); vertex_count];
    let mut in_degree = vec![0usize; vertex_count];
    for &(from, to) in edges {
        adj[from].push(to);
        in_degree[to] += 1;
    }

    let mut queue: VecDeque<VertexId> = (0..vertex_count).filter(|&v| in_degree[v] == 0).collect();
    let mut visited = 0;
    while let Some(v) = queue.pop_front() {
        visited += 1;
        for &next in &adj[v] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if visited == vertex_count {
        return None;
    }
    let stuck = (0..vertex_count).find(|&v| in_degree[v] > 0).unwrap_or(0);
    Some(ValidationError::new(
        ValidationErrorKind::CyclicDependency,
        format!("circular dependency detected involving vertex {stuck}"),
    ))
}

/// Verifies a schedule against its graph without replaying `ScheduleState`.
///
/// Checks:
/// 1. Every vertex appears exactly once and no unknown vertex appears
/// 2. Every edge `u -> v` has `u` before `v`
/// 3. Every recorded step cost equals the live weight of that prefix
/// 4. The recorded peak equals the maximum step cost
///
/// Cost checks run only when the order is a complete permutation.
pub fn validate_schedule(dag: &Dag, schedule: &Schedule) -> ValidationResult {
    let mut errors = Vec::new();
    let n = dag.vertex_count();
    let mut position: Vec<Option<usize>> = vec![None; n];

    for (pos, entry) in schedule.entries().iter().enumerate() {
        let v = entry.vertex;
        if v >= n {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownVertex,
                format!("position {pos} holds unknown vertex {v}"),
            ));
            continue;
        }
        if position[v].is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateVertex,
                format!("vertex {v} scheduled more than once"),
            ));
            continue;
        }
        position[v] = Some(pos);
    }

    let missing = position.iter().filter(|p| p.is_none()).count();
    if missing > 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::IncompleteSchedule,
            format!("{missing} of {n} vertices are not scheduled"),
        ));
    }

    for v in 0..n {
        let Some(v_pos) = position[v] else { continue };
        for &p in dag.predecessors(v) {
            if let Some(p_pos) = position[p] {
                if p_pos > v_pos {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::PrecedenceViolation,
                        format!("vertex {v} at position {v_pos} precedes its predecessor {p} at {p_pos}"),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        let order: Vec<VertexId> = schedule.vertices().collect();
        let expected = step_costs(dag, &order);
        for (pos, (entry, cost)) in schedule.entries().iter().zip(&expected).enumerate() {
            if entry.cost != *cost {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CostMismatch,
                    format!(
                        "position {pos} records cost {} but the live weight is {cost}",
                        entry.cost
                    ),
                ));
            }
        }
        let peak = expected.iter().copied().max().unwrap_or(0);
        if schedule.cost() != peak {
            errors.push(ValidationError::new(
                ValidationErrorKind::PeakMismatch,
                format!("schedule records peak {} but the recomputed peak is {peak}", schedule.cost()),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Live weight after each prefix of `order`.
///
/// A vertex counts toward prefix `k` when it is in the prefix and at least
/// one of its successors is not. `order` must be a permutation of the
/// graph's vertices that respects every edge.
pub fn step_costs(dag: &Dag, order: &[VertexId]) -> Vec<Weight> {
    let n = order.len();
    let mut position = vec![0usize; dag.vertex_count()];
    for (pos, &v) in order.iter().enumerate() {
        position[v] = pos;
    }

    // Each non-sink vertex is live on [position, last successor position).
    let mut delta = vec![0i128; n + 1];
    for &v in order {
        if let Some(last) = dag.successors(v).iter().map(|&s| position[s]).max() {
            delta[position[v]] += dag.weight(v) as i128;
            delta[last] -= dag.weight(v) as i128;
        }
    }

    let mut running = 0i128;
    delta[..n]
        .iter()
        .map(|d| {
            running += d;
            running as Weight
        })
        .collect()
}

/// Peak live weight of an arbitrary topological order.
pub fn peak_cost(dag: &Dag, order: &[VertexId]) -> Weight {
    step_costs(dag, order).into_iter().max().unwrap_or(0)
}
