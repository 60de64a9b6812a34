//! Property tests over arbitrary small DAGs.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use u_peakmem::construction::ScheduleState;
use u_peakmem::corrector::ScheduleCorrector;
use u_peakmem::models::{Dag, Schedule};
use u_peakmem::optimizer::{
    AntColony, AntQ, BaselineKind, BranchAndBound, GreedyScheduler, Optimizer, RandomScheduler,
    SimulatedAnnealing, SumiAco,
};
use u_peakmem::validation::{peak_cost, step_costs, validate_schedule};

/// DAGs of up to 8 vertices with arbitrary weights (sinks included) and
/// shuffled ids, so edges do not always point from lower to higher id.
fn arb_dag() -> impl Strategy<Value = Dag> {
    (1usize..=8)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(0u64..10, n),
                prop::collection::vec(any::<bool>(), n * (n - 1) / 2),
                Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            )
        })
        .prop_map(|(weights, mask, ids)| {
            let n = weights.len();
            let edges: Vec<_> = (0..n)
                .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
                .zip(mask)
                .filter(|&(_, keep)| keep)
                .map(|((u, v), _)| (ids[u], ids[v]))
                .collect();
            Dag::new(weights, &edges).unwrap()
        })
}

fn order(schedule: &Schedule) -> Vec<usize> {
    schedule.vertices().collect()
}

fn optimizers(seed: u64) -> Vec<Box<dyn Optimizer>> {
    let baseline = || BaselineKind::Random { seed }.build();
    let mut aco = AntColony::new(baseline()).with_seed(seed);
    aco.set_parameter("epochs", 5.0).unwrap();
    let mut antq = AntQ::new(baseline()).with_seed(seed);
    antq.set_parameter("epochs", 5.0).unwrap();
    let mut sumiaco = SumiAco::new(baseline())
        .with_seed(seed)
        .with_local_search_iters(4);
    sumiaco.set_parameter("epochs", 3.0).unwrap();

    vec![
        Box::new(RandomScheduler::with_seed(seed)),
        Box::new(GreedyScheduler::new()),
        Box::new(aco),
        Box::new(antq),
        Box::new(sumiaco),
        Box::new(SimulatedAnnealing::new(baseline()).with_seed(seed)),
        Box::new(BranchAndBound::new(baseline())),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_optimizers_produce_valid_schedules(dag in arb_dag(), seed in 0u64..1000) {
        for mut optimizer in optimizers(seed) {
            let schedule = optimizer.schedule(&dag);
            prop_assert_eq!(schedule.len(), dag.vertex_count());
            prop_assert_eq!(validate_schedule(&dag, &schedule), Ok(()));
            prop_assert_eq!(schedule.cost(), peak_cost(&dag, &order(&schedule)));
        }
    }

    #[test]
    fn prop_branch_and_bound_is_optimal_among_optimizers(dag in arb_dag(), seed in 0u64..1000) {
        let exact = BranchAndBound::new(BaselineKind::Greedy.build()).schedule(&dag).cost();
        for mut optimizer in optimizers(seed) {
            prop_assert!(exact <= optimizer.schedule(&dag).cost());
        }
    }

    #[test]
    fn prop_replay_matches_prefix_costs(dag in arb_dag()) {
        let topo = dag.topological_order();
        let replayed = ScheduleState::replay(&dag, topo.iter().copied());
        let steps: Vec<_> = replayed.entries().iter().map(|e| e.cost).collect();
        prop_assert_eq!(steps, step_costs(&dag, &topo));
    }

    #[test]
    fn prop_corrector_preserves_validity(dag in arb_dag(), seed in 0u64..1000, moves in 1usize..12) {
        let corrector = ScheduleCorrector::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut schedule = RandomScheduler::with_seed(seed).schedule(&dag);
        for _ in 0..moves {
            schedule = corrector.correct(&dag, &schedule, &mut rng);
            prop_assert_eq!(validate_schedule(&dag, &schedule), Ok(()));

            for (v, bounds) in corrector.make_bounds(&dag, &schedule).iter().enumerate() {
                prop_assert_eq!(schedule.get(bounds.position).map(|e| e.vertex), Some(v));
                prop_assert!(bounds.lower <= bounds.position && bounds.position <= bounds.upper);
            }
        }
    }

    #[test]
    fn prop_bounds_are_idempotent(dag in arb_dag(), seed in 0u64..1000) {
        let corrector = ScheduleCorrector::new();
        let schedule = RandomScheduler::with_seed(seed).schedule(&dag);
        prop_assert_eq!(
            corrector.make_bounds(&dag, &schedule),
            corrector.make_bounds(&dag, &schedule)
        );
    }
}
