//! Precedence-preserving relocation moves.
//!
//! For a complete schedule every vertex can slide anywhere between its
//! latest predecessor and its earliest successor without breaking
//! precedence. [`ScheduleCorrector::correct`] performs one such slide at
//! random and rebuilds the step costs; it is the neighborhood operator of
//! [`SimulatedAnnealing`](crate::optimizer::SimulatedAnnealing) and the
//! local search of [`SumiAco`](crate::optimizer::SumiAco).
//!
//! Bounds are recomputed from scratch on every call (`O(V + E)`), so the
//! operator can be applied repeatedly without external bookkeeping.

use rand::rngs::SmallRng;
use rand::Rng;
use tracing::trace;

use crate::construction::ScheduleState;
use crate::models::{Dag, Schedule, VertexId};

/// Feasible position window of one vertex in a complete schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionBounds {
    /// Current index in the schedule.
    pub position: usize,
    /// One past the latest predecessor, or 0.
    pub lower: usize,
    /// One before the earliest successor, or the last index.
    pub upper: usize,
}

impl PositionBounds {
    /// Whether the vertex has at least one alternative position.
    #[inline]
    pub fn is_movable(&self) -> bool {
        self.upper > self.lower
    }
}

/// Random single-vertex relocation within precedence bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleCorrector;

impl ScheduleCorrector {
    pub fn new() -> Self {
        Self
    }

    /// Computes the bounds of every vertex, indexed by vertex id.
    ///
    /// `schedule` must be complete.
    pub fn make_bounds(&self, dag: &Dag, schedule: &Schedule) -> Vec<PositionBounds> {
        let n = dag.vertex_count();
        debug_assert_eq!(schedule.len(), n, "bounds need a complete schedule");

        let mut position = vec![0; n];
        for (index, v) in schedule.vertices().enumerate() {
            position[v] = index;
        }

        (0..n)
            .map(|v| {
                let lower = dag
                    .predecessors(v)
                    .iter()
                    .map(|&p| position[p] + 1)
                    .max()
                    .unwrap_or(0);
                let upper = dag
                    .successors(v)
                    .iter()
                    .map(|&s| position[s] - 1)
                    .min()
                    .unwrap_or(n - 1);
                PositionBounds {
                    position: position[v],
                    lower,
                    upper,
                }
            })
            .collect()
    }

    /// Vertices that have somewhere else to go, ascending.
    pub fn movable(&self, bounds: &[PositionBounds]) -> Vec<VertexId> {
        bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_movable())
            .map(|(v, _)| v)
            .collect()
    }

    /// Returns a copy of `schedule` with one random vertex moved to a random
    /// other position inside its window, step costs and peak recomputed.
    ///
    /// A schedule without movable vertices (a chain) is returned unchanged.
    pub fn correct(&self, dag: &Dag, schedule: &Schedule, rng: &mut SmallRng) -> Schedule {
        let bounds = self.make_bounds(dag, schedule);
        self.correct_with(dag, schedule, &bounds, rng)
    }

    /// [`correct`](Self::correct) with precomputed bounds of `schedule`.
    pub fn correct_with(
        &self,
        dag: &Dag,
        schedule: &Schedule,
        bounds: &[PositionBounds],
        rng: &mut SmallRng,
    ) -> Schedule {
        let movable = self.movable(bounds);
        if movable.is_empty() {
            return schedule.clone();
        }

        let vertex = movable[rng.random_range(0..movable.len())];
        let b = bounds[vertex];
        let mut target = b.lower + rng.random_range(0..b.upper - b.lower);
        if target >= b.position {
            target += 1;
        }
        trace!(vertex, from = b.position, to = target, "relocating vertex");

        let mut next = schedule.clone();
        next.relocate(b.position, target);

        let mut state = ScheduleState::new(dag);
        for index in 0..next.len() {
            let v = next.entries()[index].vertex;
            let cost = state.apply(v);
            next.set_step_cost(index, cost);
        }
        next.recompute_cost();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_schedule;
    use rand::SeedableRng;

    fn diamond() -> Dag {
        Dag::new(vec![1, 2, 2, 1], &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap()
    }

    #[test]
    fn test_bounds_diamond() {
        let dag = diamond();
        let schedule = ScheduleState::replay(&dag, [0, 1, 2, 3]);
        let bounds = ScheduleCorrector.make_bounds(&dag, &schedule);
        assert_eq!(
            bounds[1],
            PositionBounds {
                position: 1,
                lower: 1,
                upper: 2
            }
        );
        assert_eq!(bounds[0].lower, 0);
        assert_eq!(bounds[0].upper, 0);
        assert_eq!(bounds[3].upper, 3);
        assert_eq!(ScheduleCorrector.movable(&bounds), vec![1, 2]);
    }

    #[test]
    fn test_bounds_are_stable() {
        let dag = diamond();
        let schedule = ScheduleState::replay(&dag, [0, 2, 1, 3]);
        let corrector = ScheduleCorrector::new();
        assert_eq!(
            corrector.make_bounds(&dag, &schedule),
            corrector.make_bounds(&dag, &schedule)
        );
    }

    #[test]
    fn test_chain_has_no_movable_vertex() {
        let dag = Dag::new(vec![1, 2, 3, 4, 5], &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let schedule = ScheduleState::replay(&dag, 0..5);
        let corrector = ScheduleCorrector::new();
        let bounds = corrector.make_bounds(&dag, &schedule);
        assert!(corrector.movable(&bounds).is_empty());

        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(corrector.correct(&dag, &schedule, &mut rng), schedule);
    }

    #[test]
    fn test_correct_swaps_diamond_middle() {
        let dag = diamond();
        let schedule = ScheduleState::replay(&dag, [0, 1, 2, 3]);
        let mut rng = SmallRng::seed_from_u64(11);
        let moved = ScheduleCorrector.correct(&dag, &schedule, &mut rng);
        assert_eq!(moved.vertices().collect::<Vec<_>>(), vec![0, 2, 1, 3]);
        assert_eq!(moved.cost(), 4);
        assert!(validate_schedule(&dag, &moved).is_ok());
    }

    #[test]
    fn test_correct_keeps_schedules_valid() {
        let dag = Dag::new(
            vec![3, 1, 4, 1, 5, 9, 2, 6],
            &[(0, 2), (1, 2), (2, 5), (3, 4), (4, 5), (1, 6), (6, 7)],
        )
        .unwrap();
        let corrector = ScheduleCorrector::new();
        let mut schedule = ScheduleState::replay(&dag, dag.topological_order());
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..200 {
            schedule = corrector.correct(&dag, &schedule, &mut rng);
            assert!(validate_schedule(&dag, &schedule).is_ok());
        }
    }

    #[test]
    fn test_unchanged_input_schedule() {
        let dag = diamond();
        let schedule = ScheduleState::replay(&dag, [0, 1, 2, 3]);
        let before = schedule.clone();
        let mut rng = SmallRng::seed_from_u64(2);
        let _ = ScheduleCorrector.correct(&dag, &schedule, &mut rng);
        assert_eq!(schedule, before);
    }
}
