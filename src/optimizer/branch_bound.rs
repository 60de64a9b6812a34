//! Exact branch and bound.
//!
//! Depth-first enumeration of the ready set at every step, bounded by the
//! best complete schedule found so far (initially the baseline). A partial
//! schedule is expanded only while its running peak is strictly below the
//! best cost; a complete schedule replaces the best only when strictly
//! cheaper. Exponential in the worst case; meant for small graphs and as a
//! reference for the heuristics.

use std::time::Instant;

use tracing::debug;

use super::{recognized, report, Optimizer, RunContext};
use crate::construction::ScheduleState;
use crate::error::Result;
use crate::models::{Dag, Schedule};

#[derive(Debug)]
pub struct BranchAndBound {
    context: RunContext,
    baseline: Box<dyn Optimizer>,
    explored: u64,
}

impl BranchAndBound {
    pub fn new(baseline: Box<dyn Optimizer>) -> Self {
        Self {
            context: RunContext::default(),
            baseline,
            explored: 0,
        }
    }

    /// Search nodes expanded in the last run.
    pub fn explored_nodes(&self) -> u64 {
        self.explored
    }

    fn explore(&mut self, state: &ScheduleState<'_>, best: &mut Schedule) {
        let ready: Vec<_> = state.ready().iter().copied().collect();
        for vertex in ready {
            let mut next = state.clone();
            next.apply(vertex);
            self.explored += 1;

            if next.is_complete() {
                if next.cost() < best.cost() {
                    *best = next.into_schedule();
                    debug!(cost = best.cost(), nodes = self.explored, "new best schedule");
                }
            } else if next.cost() < best.cost() {
                self.explore(&next, best);
            }
        }
    }
}

impl Optimizer for BranchAndBound {
    fn name(&self) -> &'static str {
        "BnB"
    }

    fn schedule(&mut self, dag: &Dag) -> Schedule {
        let started = Instant::now();
        self.explored = 0;

        let mut best = self.baseline.schedule(dag);
        self.explore(&ScheduleState::new(dag), &mut best);

        self.context.finish(started);
        report(self.name(), dag, &best, None, self.last_run_micros());
        best
    }

    fn set_parameter(&mut self, key: &str, value: f64) -> Result<()> {
        let handled = self.context.set_parameter(key, value)?;
        recognized(key, handled)
    }

    fn last_run_micros(&self) -> u64 {
        self.context.last_run_micros()
    }
}
