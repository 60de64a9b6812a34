//! Simulated annealing over corrector moves.
//!
//! # Algorithm
//!
//! 1. Start from the baseline schedule
//! 2. At iteration `i` (1-based) set `T = rule(maxTemp, i)`; stop once
//!    `T <= minTemp`
//! 3. Propose a [`ScheduleCorrector`] move; accept it if it is not worse,
//!    otherwise with probability `exp(-delta / T)`
//! 4. Keep the best schedule ever accepted
//!
//! With a nonzero `saturation` the loop also stops after that many
//! consecutive iterations without a new best. A floor the rule cannot
//! reach within `u32::MAX` iterations ends the run there.
//!
//! Cost dynamics record the cost of every proposed move, accepted or not.
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

use std::str::FromStr;
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::iterative::IterationControl;
use super::{params, recognized, report, Optimizer, RunContext};
use crate::corrector::ScheduleCorrector;
use crate::error::{Result, ScheduleError};
use crate::models::{Dag, Schedule};

/// Temperature decay law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionRule {
    /// `T0 / log2(1 + i)`
    #[default]
    Boltzmann,
    /// `T0 / (1 + i)`
    #[serde(alias = "couchy")]
    Cauchy,
    /// `T0 * log2(1 + i) / (1 + i)`
    Mixed,
}

impl ReductionRule {
    /// Temperature at 1-based iteration `i`.
    pub fn temperature(&self, max_temp: f64, i: u32) -> f64 {
        let i = f64::from(i);
        match self {
            ReductionRule::Boltzmann => max_temp / (1.0 + i).log2(),
            ReductionRule::Cauchy => max_temp / (1.0 + i),
            ReductionRule::Mixed => max_temp * (1.0 + i).log2() / (1.0 + i),
        }
    }

    /// Rule by numeric selector (0, 1, 2).
    pub fn from_index(index: f64) -> Result<Self> {
        match index {
            x if x == 0.0 => Ok(ReductionRule::Boltzmann),
            x if x == 1.0 => Ok(ReductionRule::Cauchy),
            x if x == 2.0 => Ok(ReductionRule::Mixed),
            other => Err(ScheduleError::UnknownReductionRule(other.to_string())),
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            ReductionRule::Boltzmann => 0,
            ReductionRule::Cauchy => 1,
            ReductionRule::Mixed => 2,
        }
    }
}

impl FromStr for ReductionRule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "boltzmann" => Ok(ReductionRule::Boltzmann),
            "cauchy" | "couchy" => Ok(ReductionRule::Cauchy),
            "mixed" => Ok(ReductionRule::Mixed),
            _ => Err(ScheduleError::UnknownReductionRule(s.to_string())),
        }
    }
}

/// Simulated annealing seeded from a baseline.
#[derive(Debug)]
pub struct SimulatedAnnealing {
    min_temp: f64,
    max_temp: f64,
    rule: ReductionRule,
    iteration: IterationControl,
    context: RunContext,
    baseline: Box<dyn Optimizer>,
    corrector: ScheduleCorrector,
}

impl SimulatedAnnealing {
    pub fn new(baseline: Box<dyn Optimizer>) -> Self {
        Self {
            min_temp: 1.0,
            max_temp: 13.0,
            rule: ReductionRule::default(),
            iteration: IterationControl::new(),
            context: RunContext::default(),
            baseline,
            corrector: ScheduleCorrector::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.context.reseed(seed);
        self
    }

    /// Sets the temperature range (`min_temp` is the stopping floor).
    pub fn with_temperatures(mut self, min_temp: f64, max_temp: f64) -> Self {
        self.min_temp = min_temp;
        self.max_temp = max_temp;
        self
    }

    pub fn with_rule(mut self, rule: ReductionRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_saturation(mut self, saturation: u32) -> Self {
        self.iteration.set_saturation(saturation);
        self
    }

    pub fn rule(&self) -> ReductionRule {
        self.rule
    }

    pub fn min_temp(&self) -> f64 {
        self.min_temp
    }

    pub fn max_temp(&self) -> f64 {
        self.max_temp
    }

    pub fn iteration(&self) -> &IterationControl {
        &self.iteration
    }
}

impl Optimizer for SimulatedAnnealing {
    fn name(&self) -> &'static str {
        "SAO"
    }

    fn schedule(&mut self, dag: &Dag) -> Schedule {
        let started = Instant::now();
        self.iteration.reset();

        let mut current = self.baseline.schedule(dag);
        let mut best = current.clone();

        while !self.iteration.is_saturated() {
            let Some(step) = self.iteration.next_iteration() else {
                warn!(
                    min_temp = self.min_temp,
                    max_temp = self.max_temp,
                    "iteration counter exhausted before the temperature floor"
                );
                break;
            };
            let temperature = self.rule.temperature(self.max_temp, step);
            if temperature <= self.min_temp {
                break;
            }

            let candidate = self.corrector.correct(dag, &current, self.context.rng());
            let proposed = candidate.cost();
            let delta = proposed as f64 - current.cost() as f64;
            if delta <= 0.0 || self.context.rng().random::<f64>() < (-delta / temperature).exp() {
                current = candidate;
            }

            let improved = current.cost() < best.cost();
            if improved {
                best = current.clone();
                debug!(
                    iteration = step,
                    temperature,
                    cost = best.cost(),
                    "new best schedule"
                );
            }
            self.iteration.record(best.cost(), proposed, improved);
        }

        self.context.finish(started);
        report(self.name(), dag, &best, self.iteration_count(), self.last_run_micros());
        best
    }

    fn set_parameter(&mut self, key: &str, value: f64) -> Result<()> {
        match key {
            "minTemp" => self.min_temp = params::positive(key, value)?,
            "maxTemp" => self.max_temp = params::finite(key, value)?,
            "reductionRule" => self.rule = ReductionRule::from_index(value)?,
            _ => {
                let handled = self.iteration.set_parameter(key, value)?
                    || self.context.set_parameter(key, value)?;
                return recognized(key, handled);
            }
        }
        Ok(())
    }

    fn last_run_micros(&self) -> u64 {
        self.context.last_run_micros()
    }

    fn iteration_count(&self) -> Option<u32> {
        Some(self.iteration.iterations())
    }
}
