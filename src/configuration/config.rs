//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]   - which simulation, time stepping and runtime limits
//! - [`ViewportConfig`] - drawing area size and margin in pixels
//! - `parameters`       - slider overrides, key -> value, applied once at mount
//! - [`ScenarioConfig`] - top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   model: projectile       # projectile | dc_circuit | ac_circuit | carnot | doppler | calorimetry | torque
//!   time_step: !wall_clock  # or `!fixed 0.0002` for a constant step
//!     max_dt: 0.1           # clamp on a single frame's wall delta
//!   max_runtime: 300.0      # auto-pause after this many wall seconds, null = never
//!
//! viewport:
//!   width: 800
//!   height: 500
//!   margin: 50
//!
//! parameters:
//!   angle: 45
//!   velocity: 25
//! ```
//!
//! The engine then maps this configuration into its runtime scenario
//! representation.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::clock::TimeStep;

/// Which simulation a scenario mounts
/// `model: "projectile"`, `model: "doppler"`, ...
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Projectile,
    DcCircuit,
    AcCircuit,
    Carnot,
    Doppler,
    Calorimetry,
    Torque,
}

impl ModelKind {
    pub const ALL: [ModelKind; 7] = [
        ModelKind::Projectile,
        ModelKind::DcCircuit,
        ModelKind::AcCircuit,
        ModelKind::Carnot,
        ModelKind::Doppler,
        ModelKind::Calorimetry,
        ModelKind::Torque,
    ];
}

fn default_max_runtime() -> Option<f64> {
    Some(300.0)
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub model: ModelKind, // simulation to mount
    #[serde(default)]
    pub time_step: TimeStep, // defaults to the wall clock clamped at 0.1 s
    #[serde(default = "default_max_runtime")]
    pub max_runtime: Option<f64>, // wall seconds of continuous running, null disables
    pub max_fronts: Option<usize>, // Doppler only, number of wavefronts kept
}

/// Drawing area in pixels
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default = "ViewportConfig::default_margin")]
    pub margin: f64, // inset for axes and labels
}

impl ViewportConfig {
    fn default_margin() -> f64 {
        50.0
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            margin: Self::default_margin(),
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // Engine-level configuration
    #[serde(default)]
    pub viewport: ViewportConfig, // Canvas size
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>, // Slider overrides, validated against the model at build time
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> SimResult<Self> {
        let cfg: ScenarioConfig = serde_yaml::from_str(text).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_reader<R: Read>(reader: R) -> SimResult<Self> {
        let cfg: ScenarioConfig = serde_yaml::from_reader(reader).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings no simulation can run with
    pub fn validate(&self) -> SimResult<()> {
        match self.engine.time_step {
            TimeStep::Fixed(dt) if !(dt.is_finite() && dt > 0.0) => {
                return Err(SimError::InvalidConfig(format!("fixed time step must be positive, got {dt}")));
            }
            TimeStep::WallClock { max_dt } if !(max_dt.is_finite() && max_dt > 0.0) => {
                return Err(SimError::InvalidConfig(format!("max_dt must be positive, got {max_dt}")));
            }
            _ => {}
        }
        if let Some(m) = self.engine.max_runtime {
            if !(m.is_finite() && m > 0.0) {
                return Err(SimError::InvalidConfig(format!("max_runtime must be positive, got {m}")));
            }
        }
        let v = self.viewport;
        if !(v.margin >= 0.0 && v.width > 2.0 * v.margin && v.height > 2.0 * v.margin) {
            return Err(SimError::InvalidViewport {
                width: v.width,
                height: v.height,
                margin: v.margin,
            });
        }
        if let Some((key, _)) = self.parameters.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimError::NonFiniteInput { key: key.clone() });
        }
        Ok(())
    }
}
