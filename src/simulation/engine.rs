//! High-level runtime engine settings
//!
//! Selects the simulation, how its clock advances, and the lifecycle
//! limits used when building and running a `Scenario`

use crate::configuration::config::{EngineConfig, ModelKind};
use crate::simulation::clock::TimeStep;

/// Fronts kept by the Doppler model when the scenario does not say
pub const DEFAULT_MAX_FRONTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub model: ModelKind, // which simulation is mounted
    pub time_step: TimeStep, // fixed step or clamped wall clock
    pub max_runtime: Option<f64>, // wall seconds before auto-pause, None = unbounded
    pub max_fronts: usize, // wavefront history for the Doppler model
}

impl Engine {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            model: cfg.model,
            time_step: cfg.time_step,
            max_runtime: cfg.max_runtime,
            max_fronts: cfg.max_fronts.unwrap_or(DEFAULT_MAX_FRONTS),
        }
    }
}
