//! Ant colony optimizers.
//!
//! Ants build schedules step by step from a position-indexed trail matrix:
//! `matrix[position][vertex]` scores placing `vertex` at step `position`.
//! At each step an ant scores the ready vertices as
//! `trail^alpha * desirability^beta`; with probability `threshold` it takes
//! the best one, otherwise it samples proportionally to the scores.
//!
//! How the trail learns is a [`TrailRule`]:
//!
//! - [`PheromoneTrail`] (ACO): local decay toward the initial trail, global
//!   deposit of `1 / cost` along a new best path.
//! - [`QLearning`] (Ant-Q): both updates blend toward a discounted maximum
//!   of the next position's trail over the vertices then available.
//!
//! The trail starts at `1 / baseline cost`. A zero-cost baseline is already
//! optimal and is returned without iterating.
//!
//! # References
//!
//! - Dorigo & Gambardella (1997), "Ant Colony System: A Cooperative Learning
//!   Approach to the Traveling Salesman Problem"
//! - Gambardella & Dorigo (1995), "Ant-Q"

use std::fmt::Debug;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::Rng;
use tracing::debug;

use super::iterative::IterationControl;
use super::{params, recognized, report, Optimizer, RunContext};
use crate::construction::rules::{argmax, desirability};
use crate::construction::{construct, ConstructionPolicy, ScheduleState};
use crate::error::Result;
use crate::models::{Dag, Schedule, VertexId};

/// Square trail matrix indexed by `[position][vertex]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DesirabilityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DesirabilityMatrix {
    /// A `size x size` matrix filled with `init`.
    pub fn new(size: usize, init: f64) -> Self {
        Self {
            size,
            values: vec![init; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, position: usize, vertex: VertexId) -> f64 {
        self.values[position * self.size + vertex]
    }

    #[inline]
    pub fn set(&mut self, position: usize, vertex: VertexId, value: f64) {
        self.values[position * self.size + vertex] = value;
    }

    /// Trail values of one position.
    pub fn row(&self, position: usize) -> &[f64] {
        &self.values[position * self.size..(position + 1) * self.size]
    }

    /// Largest trail value at `position` among `vertices` (0 if none).
    pub fn max_over(&self, position: usize, vertices: impl IntoIterator<Item = VertexId>) -> f64 {
        vertices
            .into_iter()
            .map(|v| self.get(position, v))
            .fold(0.0, f64::max)
    }
}

/// Colony parameters shared by every trail rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcoParams {
    /// Trail decay `rho` in `[0, 1]`.
    pub phe_decay: f64,
    /// Exploitation probability `tau` in `[0, 1]`.
    pub threshold: f64,
    /// Trail exponent `alpha`.
    pub phe_influence: f64,
    /// Heuristic exponent `beta`.
    pub heu_influence: f64,
    /// Ants per epoch (at least 1).
    pub ants: u32,
    /// Number of epochs; ignored when a saturation limit is set.
    pub epochs: u32,
}

impl Default for AcoParams {
    fn default() -> Self {
        Self {
            phe_decay: 0.1,
            threshold: 0.4,
            phe_influence: 0.6,
            heu_influence: 0.8,
            ants: 5,
            epochs: 100,
        }
    }
}

impl AcoParams {
    /// Handles the colony keys; returns `Ok(false)` for any other key.
    pub(crate) fn set_parameter(&mut self, key: &str, value: f64) -> Result<bool> {
        match key {
            "pheDecay" => self.phe_decay = params::unit_interval(key, value)?,
            "threshold" => self.threshold = params::unit_interval(key, value)?,
            "pheInfluence" => self.phe_influence = params::non_negative(key, value)?,
            "heuInfluence" => self.heu_influence = params::non_negative(key, value)?,
            "ants" => self.ants = params::positive_count(key, value)?,
            "epochs" => self.epochs = params::count(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// How the trail matrix learns from the ants.
pub trait TrailRule: Send + Sync + Debug {
    /// Algorithm name reported by the colony (e.g., "ACO").
    fn name(&self) -> &'static str;

    /// Handles rule-specific keys; returns `Ok(false)` for any other key.
    fn set_parameter(&mut self, _key: &str, _value: f64) -> Result<bool> {
        Ok(false)
    }

    /// Update after an ant placed `vertex` at `position`. `state` is the
    /// ant's state after the step.
    fn local_update(
        &self,
        matrix: &mut DesirabilityMatrix,
        state: &ScheduleState<'_>,
        vertex: VertexId,
        position: usize,
        params: &AcoParams,
        init: f64,
    );

    /// Update along a finished schedule. `improved` is set when the schedule
    /// became the new best.
    fn global_update(
        &self,
        matrix: &mut DesirabilityMatrix,
        dag: &Dag,
        schedule: &Schedule,
        improved: bool,
        params: &AcoParams,
    );
}

/// Ant Colony System pheromone rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct PheromoneTrail;

impl TrailRule for PheromoneTrail {
    fn name(&self) -> &'static str {
        "ACO"
    }

    fn local_update(
        &self,
        matrix: &mut DesirabilityMatrix,
        _state: &ScheduleState<'_>,
        vertex: VertexId,
        position: usize,
        params: &AcoParams,
        init: f64,
    ) {
        let rho = params.phe_decay;
        let value = matrix.get(position, vertex) * (1.0 - rho) + rho * init;
        matrix.set(position, vertex, value);
    }

    fn global_update(
        &self,
        matrix: &mut DesirabilityMatrix,
        _dag: &Dag,
        schedule: &Schedule,
        improved: bool,
        params: &AcoParams,
    ) {
        let rho = params.phe_decay;
        let deposit = if improved {
            rho / schedule.cost().max(1) as f64
        } else {
            0.0
        };
        for (position, vertex) in schedule.vertices().enumerate() {
            let value = (1.0 - rho) * matrix.get(position, vertex) + deposit;
            matrix.set(position, vertex, value);
        }
    }
}

/// Ant-Q rule: the trail is a Q-value table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLearning {
    /// Discount `gamma` of the next position's best Q-value.
    pub gamma: f64,
    /// Exploration weight `W`; stored for configuration, not used by the
    /// update.
    pub exploration: f64,
}

impl Default for QLearning {
    fn default() -> Self {
        Self {
            gamma: 0.2,
            exploration: 0.5,
        }
    }
}

impl QLearning {
    /// `gamma * max Q[position + 1][v]` over the currently ready `v`, or 0
    /// at the last position.
    fn discounted_future(
        &self,
        matrix: &DesirabilityMatrix,
        state: &ScheduleState<'_>,
        position: usize,
    ) -> f64 {
        if position + 1 < matrix.size() {
            self.gamma * matrix.max_over(position + 1, state.ready().iter().copied())
        } else {
            0.0
        }
    }
}

impl TrailRule for QLearning {
    fn name(&self) -> &'static str {
        "AntQ"
    }

    fn set_parameter(&mut self, key: &str, value: f64) -> Result<bool> {
        match key {
            "gamma" => self.gamma = params::non_negative(key, value)?,
            "W" => self.exploration = params::non_negative(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn local_update(
        &self,
        matrix: &mut DesirabilityMatrix,
        state: &ScheduleState<'_>,
        vertex: VertexId,
        position: usize,
        params: &AcoParams,
        _init: f64,
    ) {
        let rho = params.phe_decay;
        let future = self.discounted_future(matrix, state, position);
        let value = (1.0 - rho) * matrix.get(position, vertex) + rho * future;
        matrix.set(position, vertex, value);
    }

    fn global_update(
        &self,
        matrix: &mut DesirabilityMatrix,
        dag: &Dag,
        schedule: &Schedule,
        improved: bool,
        params: &AcoParams,
    ) {
        let rho = params.phe_decay;
        let reward = if improved {
            1.0 / schedule.cost().max(1) as f64
        } else {
            0.0
        };
        let mut state = ScheduleState::new(dag);
        for (position, vertex) in schedule.vertices().enumerate() {
            state.apply(vertex);
            let future = self.discounted_future(matrix, &state, position);
            let value = (1.0 - rho) * matrix.get(position, vertex) + rho * (reward + future);
            matrix.set(position, vertex, value);
        }
    }
}

/// One ant walking the trail matrix.
#[derive(Debug)]
struct AntWalk<'m, R> {
    matrix: &'m mut DesirabilityMatrix,
    rule: &'m R,
    params: &'m AcoParams,
    init: f64,
}

impl<R: TrailRule> ConstructionPolicy for AntWalk<'_, R> {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn choose(&mut self, state: &ScheduleState<'_>, rng: &mut SmallRng) -> VertexId {
        let position = state.step();
        let ready = state.ready();
        if ready.len() == 1 {
            if let Some(&only) = ready.first() {
                return only;
            }
        }

        let scored: Vec<(VertexId, f64)> = ready
            .iter()
            .map(|&v| {
                let trail = self.matrix.get(position, v).powf(self.params.phe_influence);
                let heuristic = desirability(state, v).powf(self.params.heu_influence);
                (v, trail * heuristic)
            })
            .collect();

        let best = || argmax(scored.iter().copied()).unwrap_or(scored[0].0);
        if rng.random::<f64>() <= self.params.threshold {
            return best();
        }

        let total: f64 = scored.iter().map(|&(_, s)| s).sum();
        if !(total.is_finite() && total > 0.0) {
            return best();
        }
        let draw = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        for &(v, score) in &scored {
            cumulative += score;
            if draw < cumulative {
                return v;
            }
        }
        scored[scored.len() - 1].0
    }

    fn on_applied(&mut self, state: &ScheduleState<'_>, vertex: VertexId, position: usize) {
        self.rule
            .local_update(self.matrix, state, vertex, position, self.params, self.init);
    }
}

/// Which finished schedules of an epoch feed [`TrailRule::global_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GlobalUpdate {
    /// Every ant, cheapest first.
    EveryAnt,
    /// Only the cheapest ant of the epoch.
    EpochWinner,
}

/// Ant colony optimizer generic over its trail rule.
///
/// # Example
/// ```
/// use u_peakmem::models::Dag;
/// use u_peakmem::optimizer::{AntColony, BaselineKind, Optimizer};
///
/// let dag = Dag::new(vec![1, 2, 2, 1], &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();
/// let mut aco = AntColony::new(BaselineKind::Greedy.build()).with_seed(3);
/// aco.set_parameter("epochs", 10.0).unwrap();
/// let schedule = aco.schedule(&dag);
/// assert_eq!(schedule.cost(), 4);
/// ```
#[derive(Debug)]
pub struct Colony<R> {
    params: AcoParams,
    rule: R,
    iteration: IterationControl,
    context: RunContext,
    baseline: Box<dyn Optimizer>,
    matrix: Option<DesirabilityMatrix>,
}

/// Ant Colony System over a pheromone trail.
pub type AntColony = Colony<PheromoneTrail>;

/// Ant-Q over a Q-value trail.
pub type AntQ = Colony<QLearning>;

impl<R: TrailRule + Default> Colony<R> {
    /// Colony with default parameters, seeded from `baseline`.
    pub fn new(baseline: Box<dyn Optimizer>) -> Self {
        Self::with_rule(baseline, R::default())
    }
}

impl<R: TrailRule> Colony<R> {
    pub fn with_rule(baseline: Box<dyn Optimizer>, rule: R) -> Self {
        Self {
            params: AcoParams::default(),
            rule,
            iteration: IterationControl::new(),
            context: RunContext::default(),
            baseline,
            matrix: None,
        }
    }

    pub fn with_params(mut self, params: AcoParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.context.reseed(seed);
        self
    }

    pub fn with_saturation(mut self, saturation: u32) -> Self {
        self.iteration.set_saturation(saturation);
        self
    }

    pub fn params(&self) -> &AcoParams {
        &self.params
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Iteration counters and cost dynamics of the last run.
    pub fn iteration(&self) -> &IterationControl {
        &self.iteration
    }

    /// Trail matrix at the end of the last run (none if the baseline was
    /// already optimal).
    pub fn matrix(&self) -> Option<&DesirabilityMatrix> {
        self.matrix.as_ref()
    }

    /// Runs the epoch loop, passing every ant's schedule through `refine`
    /// before the global update selected by `update`.
    pub(crate) fn run<F>(&mut self, dag: &Dag, update: GlobalUpdate, mut refine: F) -> Schedule
    where
        F: FnMut(&Dag, Schedule, &mut SmallRng) -> Schedule,
    {
        let started = Instant::now();
        self.iteration.reset();
        self.matrix = None;

        let mut best = self.baseline.schedule(dag);
        if best.cost() == 0 {
            self.context.finish(started);
            return best;
        }

        let init = 1.0 / best.cost() as f64;
        let mut matrix = DesirabilityMatrix::new(dag.vertex_count(), init);

        while !self.iteration.is_finished(self.params.epochs) {
            let mut results = Vec::with_capacity(self.params.ants as usize);
            for _ in 0..self.params.ants {
                let mut ant = AntWalk {
                    matrix: &mut matrix,
                    rule: &self.rule,
                    params: &self.params,
                    init,
                };
                let schedule = construct(dag, &mut ant, self.context.rng());
                results.push(refine(dag, schedule, self.context.rng()));
            }
            results.sort_by_key(Schedule::cost);
            if update == GlobalUpdate::EpochWinner {
                results.truncate(1);
            }

            let epoch_cost = results.first().map_or(best.cost(), Schedule::cost);
            let mut improved = false;
            for schedule in results {
                let better = schedule.cost() < best.cost();
                self.rule
                    .global_update(&mut matrix, dag, &schedule, better, &self.params);
                if better {
                    best = schedule;
                    improved = true;
                }
            }
            self.iteration.record(best.cost(), epoch_cost, improved);
            if improved {
                debug!(
                    algorithm = self.rule.name(),
                    epoch = self.iteration.iterations(),
                    cost = best.cost(),
                    "new best schedule"
                );
            }
        }

        self.matrix = Some(matrix);
        self.context.finish(started);
        best
    }

    /// Applies a key to the colony's components.
    pub(crate) fn apply_parameter(&mut self, key: &str, value: f64) -> Result<bool> {
        Ok(self.params.set_parameter(key, value)?
            || self.rule.set_parameter(key, value)?
            || self.iteration.set_parameter(key, value)?
            || self.context.set_parameter(key, value)?)
    }

    pub(crate) fn last_micros(&self) -> u64 {
        self.context.last_run_micros()
    }
}

impl<R: TrailRule> Optimizer for Colony<R> {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn schedule(&mut self, dag: &Dag) -> Schedule {
        let best = self.run(dag, GlobalUpdate::EveryAnt, |_, schedule, _| schedule);
        report(self.name(), dag, &best, self.iteration_count(), self.last_run_micros());
        best
    }

    fn set_parameter(&mut self, key: &str, value: f64) -> Result<()> {
        let handled = self.apply_parameter(key, value)?;
        recognized(key, handled)
    }

    fn last_run_micros(&self) -> u64 {
        self.last_micros()
    }

    fn iteration_count(&self) -> Option<u32> {
        Some(self.iteration.iterations())
    }
}
