//! Built-in construction policies.
//!
//! - **UniformRandom**: any ready vertex, uniformly (the default baseline)
//! - **Greedy**: the ready vertex with the best [`desirability`]
//!
//! # Tie Breaking
//! The ready set is ordered by vertex id, so ties go to the lowest id.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{ConstructionPolicy, ScheduleState};
use crate::models::VertexId;

/// Heuristic desirability of scheduling `v` next.
///
/// Projects the live weight after the step as `live - freed + weight(v)`,
/// where `freed` is the weight of predecessors for which `v` is the last
/// pending consumer, and returns its reciprocal. Zero-weight vertices score
/// `1.0`.
pub fn desirability(state: &ScheduleState<'_>, v: VertexId) -> f64 {
    let weight = state.dag().weight(v);
    if weight == 0 {
        return 1.0;
    }
    let projected = state.live_cost() - state.freed_weight(v) + weight;
    1.0 / projected as f64
}

/// Picks a ready vertex uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandom;

impl ConstructionPolicy for UniformRandom {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn choose(&mut self, state: &ScheduleState<'_>, rng: &mut SmallRng) -> VertexId {
        let ready = state.ready();
        let index = rng.random_range(0..ready.len());
        ready
            .iter()
            .nth(index)
            .copied()
            .expect("ready set is non-empty while construction is incomplete")
    }
}

/// Picks the ready vertex with the highest [`desirability`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl ConstructionPolicy for Greedy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn choose(&mut self, state: &ScheduleState<'_>, _rng: &mut SmallRng) -> VertexId {
        argmax(state.ready().iter().map(|&v| (v, desirability(state, v))))
            .expect("ready set is non-empty while construction is incomplete")
    }
}

/// First candidate with the strictly highest score.
pub(crate) fn argmax(candidates: impl IntoIterator<Item = (VertexId, f64)>) -> Option<VertexId> {
    let mut best: Option<(VertexId, f64)> = None;
    for (v, score) in candidates {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((v, score)),
        }
    }
    best.map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::construct;
    use crate::models::Dag;
    use rand::SeedableRng;

    fn diamond() -> Dag {
        Dag::new(vec![1, 2, 2, 1], &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap()
    }

    #[test]
    fn test_desirability() {
        let dag = diamond();
        let mut state = ScheduleState::new(&dag);
        // Nothing live yet: 1 / weight.
        assert!((desirability(&state, 0) - 1.0).abs() < 1e-12);
        state.apply(0);
        // live 1, nothing freed, weight 2.
        assert!((desirability(&state, 1) - 1.0 / 3.0).abs() < 1e-12);
        state.apply(1);
        // live 3, frees vertex 0, weight 2.
        assert!((desirability(&state, 2) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weight_scores_one() {
        let dag = Dag::new(vec![5, 0], &[(0, 1)]).unwrap();
        let mut state = ScheduleState::new(&dag);
        state.apply(0);
        assert_eq!(desirability(&state, 1), 1.0);
    }

    #[test]
    fn test_greedy_prefers_releasing_vertex() {
        // 0 -> 2, 1 -> 2; 0 -> 3 with a heavy 3.
        let dag = Dag::new(vec![1, 1, 1, 10], &[(0, 2), (1, 2), (0, 3)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        let schedule = construct(&dag, &mut Greedy, &mut rng);
        assert_eq!(schedule.vertices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_greedy_ties_go_to_lowest_id() {
        let dag = diamond();
        let mut rng = SmallRng::seed_from_u64(0);
        let schedule = construct(&dag, &mut Greedy, &mut rng);
        assert_eq!(schedule.vertices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(schedule.cost(), 4);
    }

    #[test]
    fn test_uniform_random_is_seeded() {
        let dag = Dag::new(vec![1; 6], &[]).unwrap();
        let run = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            construct(&dag, &mut UniformRandom, &mut rng)
        };
        assert_eq!(run(3), run(3));
        let mut order: Vec<_> = run(3).vertices().collect();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax([(4, 0.5), (7, 0.9), (9, 0.9)]), Some(7));
        assert_eq!(argmax(std::iter::empty()), None);
    }
}
