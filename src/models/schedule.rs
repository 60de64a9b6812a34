//! Schedule (solution) model.
//!
//! A schedule is a topological order of the DAG's vertices together with the
//! live resource weight observed after each step. Its cost is the peak of
//! those per-step values.
//!
//! Schedules are append-only while being constructed and have a fixed
//! capacity equal to the vertex count. The only in-place edit afterwards is
//! [`Schedule::relocate`], which must be followed by fresh step costs and
//! [`Schedule::recompute_cost`].

use serde::{Deserialize, Serialize};

use super::{VertexId, Weight};
use crate::error::{Result, ScheduleError};

/// One scheduled vertex and the live weight right after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Scheduled vertex.
    pub vertex: VertexId,
    /// Live weight after this step.
    pub cost: Weight,
}

/// A complete or partial peak-cost schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
    capacity: usize,
    cost: Weight,
}

impl Schedule {
    /// Creates an empty schedule for `capacity` vertices.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "schedule capacity must be positive");
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            cost: 0,
        }
    }

    /// Appends a step, raising the peak if needed.
    ///
    /// # Errors
    /// [`ScheduleError::ScheduleFull`] once `capacity` steps are recorded.
    pub fn append(&mut self, vertex: VertexId, cost: Weight) -> Result<()> {
        if self.is_complete() {
            return Err(ScheduleError::ScheduleFull {
                capacity: self.capacity,
            });
        }
        self.push(vertex, cost);
        Ok(())
    }

    /// Appends without the capacity check; callers guarantee room.
    pub(crate) fn push(&mut self, vertex: VertexId, cost: Weight) {
        debug_assert!(!self.is_complete(), "schedule overflow");
        self.entries.push(ScheduleEntry { vertex, cost });
        self.cost = self.cost.max(cost);
    }

    /// Peak live weight over all recorded steps.
    #[inline]
    pub fn cost(&self) -> Weight {
        self.cost
    }

    /// Number of recorded steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no step has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fixed capacity (the vertex count of the source graph).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether every vertex has been scheduled.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Recorded steps in schedule order.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Scheduled vertices in order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.entries.iter().map(|e| e.vertex)
    }

    /// Step at `position`, if recorded.
    pub fn get(&self, position: usize) -> Option<&ScheduleEntry> {
        self.entries.get(position)
    }

    /// Moves the entry at `from` so that it ends up at index `to`.
    ///
    /// Step costs are left stale; callers overwrite them and then call
    /// [`Schedule::recompute_cost`].
    pub fn relocate(&mut self, from: usize, to: usize) {
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
    }

    /// Overwrites the recorded cost of the step at `position`.
    pub(crate) fn set_step_cost(&mut self, position: usize, cost: Weight) {
        self.entries[position].cost = cost;
    }

    /// Recomputes the peak from the recorded step costs.
    pub fn recompute_cost(&mut self) {
        self.cost = self.entries.iter().map(|e| e.cost).max().unwrap_or(0);
    }
}
