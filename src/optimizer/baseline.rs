//! Single-pass construction schedulers.
//!
//! Besides being optimizers on their own, these seed the trail matrices of
//! the ant colonies and the starting point of annealing and branch and
//! bound.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::{recognized, report, Optimizer, RunContext};
use crate::construction::{construct, rules};
use crate::error::Result;
use crate::models::{Dag, Schedule};

/// Uniform random topological order.
#[derive(Debug, Clone, Default)]
pub struct RandomScheduler {
    context: RunContext,
}

impl RandomScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            context: RunContext::new(seed),
        }
    }
}

impl Optimizer for RandomScheduler {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn schedule(&mut self, dag: &Dag) -> Schedule {
        let started = Instant::now();
        let schedule = construct(dag, &mut rules::UniformRandom, self.context.rng());
        self.context.finish(started);
        report(self.name(), dag, &schedule, None, self.last_run_micros());
        schedule
    }

    fn set_parameter(&mut self, key: &str, value: f64) -> Result<()> {
        let handled = self.context.set_parameter(key, value)?;
        recognized(key, handled)
    }

    fn last_run_micros(&self) -> u64 {
        self.context.last_run_micros()
    }
}

/// Greedy construction by [`rules::desirability`].
#[derive(Debug, Clone, Default)]
pub struct GreedyScheduler {
    context: RunContext,
}

impl GreedyScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Optimizer for GreedyScheduler {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn schedule(&mut self, dag: &Dag) -> Schedule {
        let started = Instant::now();
        let schedule = construct(dag, &mut rules::Greedy, self.context.rng());
        self.context.finish(started);
        report(self.name(), dag, &schedule, None, self.last_run_micros());
        schedule
    }

    fn set_parameter(&mut self, key: &str, value: f64) -> Result<()> {
        let handled = self.context.set_parameter(key, value)?;
        recognized(key, handled)
    }

    fn last_run_micros(&self) -> u64 {
        self.context.last_run_micros()
    }
}

/// Which baseline an optimizer is seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineKind {
    /// [`RandomScheduler`] with its own seed.
    Random { seed: u64 },
    /// [`GreedyScheduler`].
    Greedy,
}

impl Default for BaselineKind {
    fn default() -> Self {
        BaselineKind::Random {
            seed: super::DEFAULT_SEED,
        }
    }
}

impl BaselineKind {
    /// Creates a fresh baseline optimizer.
    pub fn build(&self) -> Box<dyn Optimizer> {
        match *self {
            BaselineKind::Random { seed } => Box::new(RandomScheduler::with_seed(seed)),
            BaselineKind::Greedy => Box::new(GreedyScheduler::new()),
        }
    }
}
