//! Incremental schedule construction state.

use std::collections::BTreeSet;

use crate::models::{Dag, Schedule, VertexId, Weight};

/// Bookkeeping for one in-flight construction over a borrowed [`Dag`].
///
/// Tracks, per vertex, how many predecessors are still unscheduled (a vertex
/// is ready when this reaches zero) and how many successors are still
/// unscheduled (a scheduled vertex stays live until this reaches zero). The
/// live weight is maintained incrementally.
///
/// Both sets iterate in ascending vertex id, which makes every policy built
/// on top of this state deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct ScheduleState<'a> {
    dag: &'a Dag,
    remaining_predecessors: Vec<usize>,
    remaining_successors: Vec<usize>,
    ready: BTreeSet<VertexId>,
    live: BTreeSet<VertexId>,
    live_cost: Weight,
    schedule: Schedule,
}

impl<'a> ScheduleState<'a> {
    /// Fresh state: every source is ready, nothing is live.
    pub fn new(dag: &'a Dag) -> Self {
        let n = dag.vertex_count();
        let remaining_predecessors: Vec<usize> = (0..n).map(|v| dag.in_degree(v)).collect();
        let remaining_successors = (0..n).map(|v| dag.out_degree(v)).collect();
        let ready = (0..n).filter(|&v| remaining_predecessors[v] == 0).collect();
        Self {
            dag,
            remaining_predecessors,
            remaining_successors,
            ready,
            live: BTreeSet::new(),
            live_cost: 0,
            schedule: Schedule::new(n),
        }
    }

    /// Replays a full vertex order and returns the resulting schedule.
    ///
    /// # Panics
    /// If the order schedules a vertex before one of its predecessors, or
    /// schedules a vertex twice.
    pub fn replay(dag: &'a Dag, order: impl IntoIterator<Item = VertexId>) -> Schedule {
        let mut state = Self::new(dag);
        for v in order {
            state.apply(v);
        }
        state.into_schedule()
    }

    /// Schedules `vertex` and returns the live weight after the step.
    ///
    /// The vertex becomes live if it has consumers; every predecessor for
    /// which it was the last pending consumer is released.
    ///
    /// # Panics
    /// If `vertex` is not in the ready set.
    pub fn apply(&mut self, vertex: VertexId) -> Weight {
        let was_ready = self.ready.remove(&vertex);
        assert!(was_ready, "vertex {vertex} is not ready for scheduling");
        let dag = self.dag;

        for &s in dag.successors(vertex) {
            self.remaining_predecessors[s] -= 1;
            if self.remaining_predecessors[s] == 0 {
                self.ready.insert(s);
            }
        }

        if self.remaining_successors[vertex] > 0 {
            self.live.insert(vertex);
            self.live_cost += dag.weight(vertex);
        }

        for &p in dag.predecessors(vertex) {
            self.remaining_successors[p] -= 1;
            if self.remaining_successors[p] == 0 {
                self.live.remove(&p);
                self.live_cost -= dag.weight(p);
            }
        }

        self.schedule.push(vertex, self.live_cost);
        self.live_cost
    }

    /// The graph being scheduled.
    #[inline]
    pub fn dag(&self) -> &'a Dag {
        self.dag
    }

    /// Vertices whose predecessors are all scheduled, ascending.
    #[inline]
    pub fn ready(&self) -> &BTreeSet<VertexId> {
        &self.ready
    }

    /// Scheduled vertices still awaiting a consumer, ascending.
    #[inline]
    pub fn live(&self) -> &BTreeSet<VertexId> {
        &self.live
    }

    /// Total weight of the live set.
    #[inline]
    pub fn live_cost(&self) -> Weight {
        self.live_cost
    }

    /// Number of unscheduled predecessors of `v`.
    #[inline]
    pub fn remaining_predecessors(&self, v: VertexId) -> usize {
        self.remaining_predecessors[v]
    }

    /// Number of unscheduled successors of `v`.
    #[inline]
    pub fn remaining_successors(&self, v: VertexId) -> usize {
        self.remaining_successors[v]
    }

    /// Index of the next step (number of vertices scheduled so far).
    #[inline]
    pub fn step(&self) -> usize {
        self.schedule.len()
    }

    /// Whether every vertex has been scheduled.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.schedule.is_complete()
    }

    /// Running peak of the partial schedule.
    #[inline]
    pub fn cost(&self) -> Weight {
        self.schedule.cost()
    }

    /// Weight released if `v` were scheduled now: the predecessors for which
    /// `v` is the last pending consumer.
    pub fn freed_weight(&self, v: VertexId) -> Weight {
        self.dag
            .predecessors(v)
            .iter()
            .filter(|&&p| self.remaining_successors[p] == 1)
            .map(|&p| self.dag.weight(p))
            .sum()
    }

    /// The partial schedule built so far.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn into_schedule(self) -> Schedule {
        self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Dag {
        Dag::new(vec![1, 2, 2, 1], &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let dag = diamond();
        let state = ScheduleState::new(&dag);
        assert_eq!(state.ready().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert!(state.live().is_empty());
        assert_eq!(state.live_cost(), 0);
        assert_eq!(state.remaining_predecessors(3), 2);
        assert_eq!(state.remaining_successors(0), 2);
        assert_eq!(state.step(), 0);
    }

    #[test]
    fn test_apply_diamond_step_costs() {
        let dag = diamond();
        let mut state = ScheduleState::new(&dag);
        assert_eq!(state.apply(0), 1);
        assert_eq!(state.ready().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(state.apply(1), 3);
        assert_eq!(state.apply(2), 4);
        assert_eq!(state.live().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        // Vertex 0 was released once its last consumer ran.
        assert_eq!(state.remaining_successors(0), 0);
        assert_eq!(state.apply(3), 0);
        assert!(state.is_complete());
        assert!(state.ready().is_empty());
        assert!(state.live().is_empty());

        let schedule = state.into_schedule();
        assert_eq!(schedule.cost(), 4);
        assert_eq!(
            schedule.entries().iter().map(|e| e.cost).collect::<Vec<_>>(),
            vec![1, 3, 4, 0]
        );
    }

    #[test]
    #[should_panic(expected = "vertex 3 is not ready")]
    fn test_apply_unready_vertex_panics() {
        let dag = diamond();
        let mut state = ScheduleState::new(&dag);
        state.apply(3);
    }

    #[test]
    #[should_panic(expected = "not ready")]
    fn test_apply_twice_panics() {
        let dag = diamond();
        let mut state = ScheduleState::new(&dag);
        state.apply(0);
        state.apply(0);
    }

    #[test]
    fn test_freed_weight() {
        let dag = diamond();
        let mut state = ScheduleState::new(&dag);
        state.apply(0);
        // 0 still has two pending consumers.
        assert_eq!(state.freed_weight(1), 0);
        state.apply(1);
        assert_eq!(state.freed_weight(2), 1);
        state.apply(2);
        assert_eq!(state.freed_weight(3), 4);
    }

    #[test]
    fn test_replay_matches_incremental() {
        let dag = diamond();
        let schedule = ScheduleState::replay(&dag, [0, 2, 1, 3]);
        assert_eq!(schedule.vertices().collect::<Vec<_>>(), vec![0, 2, 1, 3]);
        assert_eq!(schedule.cost(), 4);
    }

    #[test]
    fn test_zero_weight_vertices_cost_nothing() {
        let dag = Dag::new(vec![0, 0, 5], &[(0, 1), (1, 2)]).unwrap();
        let schedule = ScheduleState::replay(&dag, [0, 1, 2]);
        assert_eq!(schedule.cost(), 0);
    }
}
