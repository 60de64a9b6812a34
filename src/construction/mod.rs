//! Step-by-step schedule construction.
//!
//! [`ScheduleState`] turns a sequence of vertex choices into a valid,
//! cost-tracked schedule. A [`ConstructionPolicy`] makes those choices; the
//! [`construct`] driver alternates the two until every vertex is placed.
//!
//! # Usage
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use u_peakmem::construction::{construct, rules};
//! use u_peakmem::models::Dag;
//!
//! let dag = Dag::new(vec![1, 2, 2, 1], &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();
//! let mut rng = SmallRng::seed_from_u64(7);
//! let schedule = construct(&dag, &mut rules::Greedy, &mut rng);
//! assert_eq!(schedule.len(), 4);
//! ```
//!
//! # References
//!
//! - Sethi (1975), "Complete Register Allocation Problems"
//! - Kayaaslan et al. (2018), "Scheduling series-parallel task graphs to
//!   minimize peak memory"

pub mod rules;
mod state;

pub use state::ScheduleState;

use std::fmt::Debug;

use rand::rngs::SmallRng;

use crate::models::{Dag, Schedule, VertexId};

/// Chooses the next vertex to schedule.
///
/// Policies may keep mutable state (e.g. a trail matrix updated after each
/// step), which is why both hooks take `&mut self`.
pub trait ConstructionPolicy: Send + Debug {
    /// Policy name (e.g., "Greedy").
    fn name(&self) -> &'static str;

    /// Picks a member of `state.ready()`. The ready set is never empty when
    /// this is called.
    fn choose(&mut self, state: &ScheduleState<'_>, rng: &mut SmallRng) -> VertexId;

    /// Called after `vertex` was applied at `position`.
    fn on_applied(&mut self, _state: &ScheduleState<'_>, _vertex: VertexId, _position: usize) {}
}

/// Builds a complete schedule by repeatedly asking `policy` for a ready
/// vertex.
pub fn construct<P>(dag: &Dag, policy: &mut P, rng: &mut SmallRng) -> Schedule
where
    P: ConstructionPolicy + ?Sized,
{
    let mut state = ScheduleState::new(dag);
    while !state.is_complete() {
        let position = state.step();
        let vertex = policy.choose(&state, rng);
        state.apply(vertex);
        policy.on_applied(&state, vertex, position);
    }
    state.into_schedule()
}
