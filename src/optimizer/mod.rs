//! Peak-cost schedule optimizers.
//!
//! Every algorithm implements [`Optimizer`]: one `schedule(dag)` entry point
//! plus string-keyed parameters. Algorithms are composed, not layered: each
//! one owns a [`RunContext`] (seeded RNG and timing), an explicit baseline
//! optimizer where it needs a starting point, and an [`IterationControl`] if
//! it iterates.
//!
//! # Algorithms
//!
//! | Type | Name | Kind |
//! |------|------|------|
//! | [`RandomScheduler`] | `Random` | uniform random construction |
//! | [`GreedyScheduler`] | `Greedy` | heuristic construction |
//! | [`AntColony`] | `ACO` | ant colony, pheromone trail |
//! | [`AntQ`] | `AntQ` | ant colony, Q-value trail |
//! | [`SumiAco`] | `ACOLS` | ant colony with corrector local search |
//! | [`SimulatedAnnealing`] | `SAO` | annealing over corrector moves |
//! | [`BranchAndBound`] | `BnB` | exact enumeration |
//!
//! # Parameters
//!
//! Keys a component does not recognize are passed on to the component it
//! builds on (`saturation` is handled by the iteration control,
//! `randomState` by the run context); a key nobody recognizes is
//! [`ScheduleError::UnknownParameter`].
//!
//! # References
//!
//! - Dorigo & Gambardella (1997), "Ant Colony System"
//! - Gambardella & Dorigo (1995), "Ant-Q: A Reinforcement Learning approach
//!   to the traveling salesman problem"
//! - Kirkpatrick et al. (1983), "Optimization by Simulated Annealing"

mod annealing;
mod baseline;
mod branch_bound;
mod colony;
mod iterative;
pub(crate) mod params;
mod sumiaco;

pub use annealing::{ReductionRule, SimulatedAnnealing};
pub use baseline::{BaselineKind, GreedyScheduler, RandomScheduler};
pub use branch_bound::BranchAndBound;
pub use colony::{
    AcoParams, AntColony, AntQ, Colony, DesirabilityMatrix, PheromoneTrail, QLearning, TrailRule,
};
pub use iterative::IterationControl;
pub use sumiaco::SumiAco;

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use crate::error::{Result, ScheduleError};
use crate::models::{Dag, Schedule};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// A schedule optimizer.
///
/// Implementations hold mutable run state (RNG, trail matrices), so one
/// instance must not be shared between concurrent runs; build one per
/// worker instead.
pub trait Optimizer: Send + Debug {
    /// Algorithm name (e.g., "ACO", "SAO").
    fn name(&self) -> &'static str;

    /// Produces a complete, precedence-valid schedule of `dag`.
    fn schedule(&mut self, dag: &Dag) -> Schedule;

    /// Sets one named parameter.
    ///
    /// # Errors
    /// - [`ScheduleError::UnknownParameter`] if no component recognizes `key`
    /// - [`ScheduleError::InvalidParameter`] if `value` is out of range
    fn set_parameter(&mut self, key: &str, value: f64) -> Result<()>;

    /// Sets several parameters, stopping at the first error.
    fn set_parameters(&mut self, parameters: &BTreeMap<String, f64>) -> Result<()> {
        for (key, &value) in parameters {
            self.set_parameter(key, value)?;
        }
        Ok(())
    }

    /// Wall-clock duration of the last `schedule` call, in microseconds.
    fn last_run_micros(&self) -> u64;

    /// Iterations of the last run, for iterative algorithms.
    fn iteration_count(&self) -> Option<u32> {
        None
    }
}

/// Per-optimizer randomness and timing.
///
/// The RNG persists across `schedule` calls: repeated runs of one instance
/// differ, while fresh instances with equal seeds agree.
#[derive(Debug, Clone)]
pub struct RunContext {
    seed: u64,
    rng: SmallRng,
    last_run: Duration,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RunContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
            last_run: Duration::ZERO,
        }
    }

    /// Seed the RNG was last reset with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the RNG stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self {
            last_run: self.last_run,
            ..Self::new(seed)
        };
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    pub fn last_run(&self) -> Duration {
        self.last_run
    }

    pub fn last_run_micros(&self) -> u64 {
        u64::try_from(self.last_run.as_micros()).unwrap_or(u64::MAX)
    }

    /// Stores the time elapsed since `started` as the last run duration.
    pub(crate) fn finish(&mut self, started: Instant) {
        self.last_run = started.elapsed();
    }

    /// Handles `randomState`; returns `Ok(false)` for any other key.
    pub(crate) fn set_parameter(&mut self, key: &str, value: f64) -> Result<bool> {
        match key {
            "randomState" => self.reseed(params::seed(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Maps "nobody recognized this key" to an error.
pub(crate) fn recognized(key: &str, handled: bool) -> Result<()> {
    if handled {
        Ok(())
    } else {
        Err(ScheduleError::UnknownParameter(key.to_string()))
    }
}

/// Logs a finished run.
pub(crate) fn report(name: &str, dag: &Dag, schedule: &Schedule, iterations: Option<u32>, micros: u64) {
    info!(
        algorithm = name,
        vertices = dag.vertex_count(),
        edges = dag.edge_count(),
        cost = schedule.cost(),
        iterations = ?iterations,
        elapsed_us = micros,
        "schedule complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_context_reseed_restarts_stream() {
        let mut a = RunContext::new(9);
        let first: u64 = a.rng().random();
        a.reseed(9);
        let again: u64 = a.rng().random();
        assert_eq!(first, again);
        assert_eq!(a.seed(), 9);
    }

    #[test]
    fn test_context_handles_random_state() {
        let mut ctx = RunContext::default();
        assert_eq!(ctx.seed(), DEFAULT_SEED);
        assert!(ctx.set_parameter("randomState", 7.0).unwrap());
        assert_eq!(ctx.seed(), 7);
        assert!(!ctx.set_parameter("epochs", 7.0).unwrap());
        assert!(ctx.set_parameter("randomState", -1.0).is_err());
    }

    #[test]
    fn test_recognized() {
        assert!(recognized("ants", true).is_ok());
        assert!(matches!(
            recognized("bogus", false),
            Err(ScheduleError::UnknownParameter(k)) if k == "bogus"
        ));
    }

    #[test]
    fn test_set_parameters_stops_at_first_error() {
        let mut greedy = GreedyScheduler::new();
        let mut parameters = BTreeMap::new();
        parameters.insert("randomState".to_string(), 3.0);
        parameters.insert("zzz".to_string(), 1.0);
        assert!(greedy.set_parameters(&parameters).is_err());
    }
}
