//! Iteration bookkeeping shared by the iterative optimizers.

use crate::error::Result;
use crate::models::Weight;

use super::params;

/// Counts iterations, tracks stagnation and records cost dynamics.
///
/// With a nonzero `saturation`, a loop stops once that many consecutive
/// iterations failed to improve the best cost, and an iteration limit no
/// longer applies (see [`is_finished`](Self::is_finished)).
#[derive(Debug, Clone, Default)]
pub struct IterationControl {
    saturation: u32,
    iterations: u32,
    stagnation: u32,
    best_dynamics: Vec<Weight>,
    cost_dynamics: Vec<Weight>,
}

impl IterationControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stagnation limit (0 disables it).
    pub fn with_saturation(mut self, saturation: u32) -> Self {
        self.saturation = saturation;
        self
    }

    pub fn saturation(&self) -> u32 {
        self.saturation
    }

    pub fn set_saturation(&mut self, saturation: u32) {
        self.saturation = saturation;
    }

    /// Clears the counters and dynamics before a new run.
    pub fn reset(&mut self) {
        self.iterations = 0;
        self.stagnation = 0;
        self.best_dynamics.clear();
        self.cost_dynamics.clear();
    }

    /// Records one finished iteration.
    ///
    /// `best` is the best-so-far cost after the iteration, `current` the
    /// cost the iteration itself produced.
    pub fn record(&mut self, best: Weight, current: Weight, improved: bool) {
        self.iterations = self.iterations.saturating_add(1);
        self.stagnation = if improved {
            0
        } else {
            self.stagnation.saturating_add(1)
        };
        self.best_dynamics.push(best);
        self.cost_dynamics.push(current);
    }

    /// Whether the stagnation limit has been reached.
    pub fn is_saturated(&self) -> bool {
        self.saturation > 0 && self.stagnation >= self.saturation
    }

    /// Whether a loop capped at `limit` iterations is done: saturation
    /// alone decides when it is set, the cap otherwise.
    pub fn is_finished(&self, limit: u32) -> bool {
        if self.saturation > 0 {
            self.is_saturated()
        } else {
            self.iterations >= limit
        }
    }

    /// 1-based index of the next iteration, or `None` once the counter is
    /// exhausted.
    pub fn next_iteration(&self) -> Option<u32> {
        self.iterations.checked_add(1)
    }

    /// Iterations completed in the last run.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Best-so-far cost after each iteration of the last run.
    pub fn best_dynamics(&self) -> &[Weight] {
        &self.best_dynamics
    }

    /// Cost produced by each iteration of the last run.
    pub fn cost_dynamics(&self) -> &[Weight] {
        &self.cost_dynamics
    }

    /// Handles `saturation`; returns `Ok(false)` for any other key.
    pub(crate) fn set_parameter(&mut self, key: &str, value: f64) -> Result<bool> {
        match key {
            "saturation" => self.saturation = params::count(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturation_after_stagnation() {
        let mut control = IterationControl::new().with_saturation(2);
        control.record(10, 10, true);
        assert!(!control.is_saturated());
        control.record(10, 12, false);
        assert!(!control.is_saturated());
        control.record(10, 11, false);
        assert!(control.is_saturated());
        assert_eq!(control.iterations(), 3);
        assert_eq!(control.best_dynamics(), &[10, 10, 10]);
        assert_eq!(control.cost_dynamics(), &[10, 12, 11]);
    }

    #[test]
    fn test_zero_saturation_never_stops() {
        let mut control = IterationControl::new();
        for _ in 0..100 {
            control.record(1, 2, false);
        }
        assert!(!control.is_saturated());
    }

    #[test]
    fn test_saturation_replaces_iteration_limit() {
        let mut control = IterationControl::new().with_saturation(3);
        control.record(5, 5, true);
        control.record(5, 6, false);
        assert!(!control.is_finished(1));
        control.record(5, 6, false);
        control.record(5, 7, false);
        assert!(control.is_finished(100));

        let mut capped = IterationControl::new();
        capped.record(5, 5, false);
        assert!(!capped.is_finished(2));
        capped.record(5, 5, false);
        assert!(capped.is_finished(2));
    }

    #[test]
    fn test_counter_exhaustion() {
        let mut control = IterationControl {
            iterations: u32::MAX - 1,
            ..IterationControl::default()
        };
        assert_eq!(control.next_iteration(), Some(u32::MAX));
        control.record(1, 1, false);
        assert_eq!(control.next_iteration(), None);
        control.record(1, 1, false);
        assert_eq!(control.iterations(), u32::MAX);
    }

    #[test]
    fn test_reset_clears_run_state() {
        let mut control = IterationControl::new().with_saturation(1);
        control.record(3, 3, false);
        control.reset();
        assert_eq!(control.iterations(), 0);
        assert!(!control.is_saturated());
        assert!(control.best_dynamics().is_empty());
        assert_eq!(control.saturation(), 1);
    }

    #[test]
    fn test_set_parameter() {
        let mut control = IterationControl::new();
        assert!(control.set_parameter("saturation", 4.0).unwrap());
        assert_eq!(control.saturation(), 4);
        assert!(!control.set_parameter("epochs", 4.0).unwrap());
        assert!(control.set_parameter("saturation", -1.0).is_err());
    }
}
