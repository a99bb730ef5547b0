//! The physics-model contract shared by every simulation
//!
//! A model is a pure function of `(parameters, t)`. It knows nothing about
//! pixels or frames: the clock feeds it time, a scene builder reads its
//! output. Implementations live in [`crate::simulation::models`].

use crate::simulation::params::{ChangePolicy, ParameterStore, SimulationParameter};
use crate::simulation::states::{Evaluation, ModelState};
use crate::simulation::trace::TracePolicy;

/// Trait for closed-form or phase-indexed physics models
///
/// `evaluate` must return identical output for identical input; the render
/// loop relies on that to stay idempotent and to be testable without
/// mocking time.
pub trait PhysicsModel {
    /// Short identifier used in logs and announcements
    fn name(&self) -> &'static str;

    /// Slider definitions with their defaults
    fn parameters(&self) -> Vec<SimulationParameter>;

    /// Physical quantities at simulation time `t`
    fn evaluate(&self, params: &ParameterStore, t: f64) -> Evaluation;

    /// Time at which the run terminates, `None` for cyclic or open-ended models
    fn horizon(&self, _params: &ParameterStore) -> Option<f64> {
        None
    }

    /// What a parameter change does to the clock
    fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::Reset
    }

    /// Trail history kept for rendering, if any
    fn trace_policy(&self) -> Option<TracePolicy> {
        None
    }

    /// Message for a user-visible transition between two consecutive frames
    fn describe_transition(&self, _prev: &ModelState, _next: &ModelState) -> Option<String> {
        None
    }
}
