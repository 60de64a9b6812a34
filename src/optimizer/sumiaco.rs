//! Memetic ant colony: ACO with corrector hill climbing on every ant.

use rand::rngs::SmallRng;

use super::colony::{AntColony, GlobalUpdate};
use super::{params, report, Optimizer};
use crate::corrector::ScheduleCorrector;
use crate::error::Result;
use crate::models::{Dag, Schedule};

/// [`AntColony`] whose ants each run `localSearchIters` corrector moves.
/// Only the cheapest refined ant of each epoch feeds the global pheromone
/// update.
///
/// The local search is hill climbing: a move is kept only when it is
/// strictly cheaper than the best schedule the ant has reached so far.
#[derive(Debug)]
pub struct SumiAco {
    colony: AntColony,
    local_search_iters: u32,
    corrector: ScheduleCorrector,
}

impl SumiAco {
    pub fn new(baseline: Box<dyn Optimizer>) -> Self {
        Self {
            colony: AntColony::new(baseline),
            local_search_iters: 20,
            corrector: ScheduleCorrector::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.colony = self.colony.with_seed(seed);
        self
    }

    pub fn with_local_search_iters(mut self, iters: u32) -> Self {
        self.local_search_iters = iters;
        self
    }

    pub fn local_search_iters(&self) -> u32 {
        self.local_search_iters
    }

    /// The underlying colony (parameters, dynamics, trail).
    pub fn colony(&self) -> &AntColony {
        &self.colony
    }
}

/// Keeps the cheapest of `iters` successive corrector moves.
fn hill_climb(
    corrector: &ScheduleCorrector,
    dag: &Dag,
    start: Schedule,
    iters: u32,
    rng: &mut SmallRng,
) -> Schedule {
    let mut best = start;
    for _ in 0..iters {
        let candidate = corrector.correct(dag, &best, rng);
        if candidate.cost() < best.cost() {
            best = candidate;
        }
    }
    best
}

impl Optimizer for SumiAco {
    fn name(&self) -> &'static str {
        "ACOLS"
    }

    fn schedule(&mut self, dag: &Dag) -> Schedule {
        let corrector = self.corrector;
        let iters = self.local_search_iters;
        let best = self.colony.run(dag, GlobalUpdate::EpochWinner, |dag, schedule, rng| {
            hill_climb(&corrector, dag, schedule, iters, rng)
        });
        report(self.name(), dag, &best, self.iteration_count(), self.last_run_micros());
        best
    }

    fn set_parameter(&mut self, key: &str, value: f64) -> Result<()> {
        match key {
            "localSearchIters" => {
                self.local_search_iters = params::count(key, value)?;
                Ok(())
            }
            _ => self.colony.set_parameter(key, value),
        }
    }

    fn last_run_micros(&self) -> u64 {
        self.colony.last_run_micros()
    }

    fn iteration_count(&self) -> Option<u32> {
        self.colony.iteration_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::ScheduleState;
    use crate::error::ScheduleError;
    use crate::optimizer::BaselineKind;
    use crate::validation::validate_schedule;
    use rand::SeedableRng;

    fn fan_in() -> Dag {
        // Three heavy producers feeding one consumer, plus light side work.
        Dag::new(
            vec![6, 6, 6, 1, 1, 1, 0],
            &[(0, 6), (1, 6), (2, 6), (3, 4), (4, 5), (5, 6)],
        )
        .unwrap()
    }

    #[test]
    fn test_hill_climb_never_worsens() {
        let dag = fan_in();
        let start = ScheduleState::replay(&dag, dag.topological_order());
        let mut rng = SmallRng::seed_from_u64(3);
        let climbed = hill_climb(&ScheduleCorrector::new(), &dag, start.clone(), 50, &mut rng);
        assert!(climbed.cost() <= start.cost());
        assert!(validate_schedule(&dag, &climbed).is_ok());
    }

    #[test]
    fn test_zero_iters_is_identity() {
        let dag = fan_in();
        let start = ScheduleState::replay(&dag, dag.topological_order());
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(
            hill_climb(&ScheduleCorrector::new(), &dag, start.clone(), 0, &mut rng),
            start
        );
    }

    #[test]
    fn test_sumiaco_schedule() {
        let dag = fan_in();
        let mut aco = SumiAco::new(BaselineKind::Random { seed: 1 }.build()).with_seed(2);
        aco.set_parameter("epochs", 5.0).unwrap();
        aco.set_parameter("localSearchIters", 10.0).unwrap();
        let schedule = aco.schedule(&dag);
        assert!(validate_schedule(&dag, &schedule).is_ok());
        assert_eq!(aco.iteration_count(), Some(5));
        assert_eq!(aco.local_search_iters(), 10);
        assert_eq!(aco.name(), "ACOLS");
    }

    #[test]
    fn test_global_update_follows_epoch_winner_only() {
        // Five producers into one sink: the walk touches one entry per row.
        let dag = Dag::new(
            vec![1, 1, 1, 1, 1, 0],
            &[(0, 5), (1, 5), (2, 5), (3, 5), (4, 5)],
        )
        .unwrap();
        let init = 1.0 / BaselineKind::Greedy.build().schedule(&dag).cost() as f64;

        let mut aco = SumiAco::new(BaselineKind::Greedy.build())
            .with_seed(4)
            .with_local_search_iters(0);
        aco.set_parameter("ants", 4.0).unwrap();
        aco.set_parameter("epochs", 1.0).unwrap();
        aco.set_parameter("threshold", 0.0).unwrap();
        aco.schedule(&dag);

        let matrix = aco.colony().matrix().unwrap();
        for position in 0..matrix.size() {
            let changed = matrix
                .row(position)
                .iter()
                .filter(|&&value| (value - init).abs() > 1e-12)
                .count();
            assert_eq!(changed, 1, "row {position}");
        }
    }

    #[test]
    fn test_unknown_keys_reach_colony() {
        let mut aco = SumiAco::new(BaselineKind::Greedy.build());
        aco.set_parameter("pheInfluence", 1.5).unwrap();
        assert_eq!(aco.colony().params().phe_influence, 1.5);
        assert!(matches!(
            aco.set_parameter("maxTemp", 3.0),
            Err(ScheduleError::UnknownParameter(_))
        ));
        assert!(aco.set_parameter("localSearchIters", 0.5).is_err());
    }
}
