//! Carnot cycle of one mole of ideal diatomic gas
//!
//! Four equal-duration phases per cycle, indexed by cumulative progress:
//!
//! | phase | process                | law                 |
//! |-------|------------------------|---------------------|
//! | 0     | isothermal expansion   | P = nRT_h / V       |
//! | 1     | adiabatic expansion    | P V^gamma = const   |
//! | 2     | isothermal compression | P = nRT_c / V       |
//! | 3     | adiabatic compression  | P V^gamma = const   |
//!
//! Volumes are in litres, so nRT/V comes out in kPa. V3 and V4 follow from
//! T V^(gamma - 1) = const so the adiabats actually meet the isotherms.

use crate::simulation::model::PhysicsModel;
use crate::simulation::params::{ChangePolicy, ParameterStore, SimulationParameter};
use crate::simulation::states::{Evaluation, ModelState, Singularity};

pub const T_HOT: &str = "t_hot";
pub const T_COLD: &str = "t_cold";

pub const GAMMA: f64 = 1.4;
pub const GAS_CONSTANT: f64 = 8.314;
pub const MOLES: f64 = 1.0;
pub const V1: f64 = 1.0;
pub const V2: f64 = 3.0;
/// 200 frames at 60 Hz
pub const CYCLE_PERIOD: f64 = 200.0 / 60.0;

pub const PHASE_NAMES: [&str; 4] = [
    "Isothermal Expansion",
    "Adiabatic Expansion",
    "Isothermal Compression",
    "Adiabatic Compression",
];

/// Corner volumes and reservoir temperatures of one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleGeometry {
    pub t_hot: f64,
    pub t_cold: f64,
    pub volumes: [f64; 4], // V1..V4
}

/// Thermodynamic point on the cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclePoint {
    pub volume: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl CycleGeometry {
    pub fn new(t_hot: f64, t_cold: f64) -> Result<Self, Singularity> {
        if !(t_cold > 0.0) {
            return Err(Singularity::ZeroDenominator("cold reservoir temperature"));
        }
        if !(t_hot > t_cold) {
            return Err(Singularity::Degenerate("hot reservoir must be hotter than cold reservoir"));
        }
        let expansion = (t_hot / t_cold).powf(1.0 / (GAMMA - 1.0));
        Ok(Self {
            t_hot,
            t_cold,
            volumes: [V1, V2, V2 * expansion, V1 * expansion],
        })
    }

    pub fn from_params(params: &ParameterStore) -> Result<Self, Singularity> {
        Self::new(params.value(T_HOT), params.value(T_COLD))
    }

    /// Point at fraction `s` in `[0, 1]` through `phase`
    pub fn point(&self, phase: usize, s: f64) -> CyclePoint {
        let phase = phase % 4;
        let v_start = self.volumes[phase];
        let v_end = self.volumes[(phase + 1) % 4];
        let volume = v_start + (v_end - v_start) * s.clamp(0.0, 1.0);

        let temperature = match phase {
            0 => self.t_hot,
            2 => self.t_cold,
            // adiabat: T V^(gamma-1) = const, anchored at the phase start
            1 => self.t_hot * (v_start / volume).powf(GAMMA - 1.0),
            _ => self.t_cold * (v_start / volume).powf(GAMMA - 1.0),
        };
        // every point satisfies the ideal gas law; on the adiabats this is P V^gamma = const
        let pressure = MOLES * GAS_CONSTANT * temperature / volume;

        CyclePoint {
            volume,
            pressure,
            temperature,
        }
    }

    /// Carnot efficiency 1 - T_c / T_h
    pub fn efficiency(&self) -> f64 {
        1.0 - self.t_cold / self.t_hot
    }

    /// Net work per cycle, J: nR (T_h - T_c) ln(V2 / V1)
    pub fn net_work(&self) -> f64 {
        MOLES * GAS_CONSTANT * (self.t_hot - self.t_cold) * (self.volumes[1] / self.volumes[0]).ln()
    }

    pub fn max_pressure(&self) -> f64 {
        self.point(0, 0.0).pressure
    }

    pub fn max_volume(&self) -> f64 {
        self.volumes[2]
    }
}

/// Phase index and fraction through it at time `t`, wrapping each cycle
pub fn phase_at(t: f64) -> (usize, f64) {
    let progress = (t.max(0.0) / CYCLE_PERIOD).fract();
    let scaled = progress * 4.0;
    let phase = (scaled.floor() as usize).min(3);
    (phase, scaled - phase as f64)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CarnotCycle;

impl PhysicsModel for CarnotCycle {
    fn name(&self) -> &'static str {
        "carnot"
    }

    fn parameters(&self) -> Vec<SimulationParameter> {
        vec![
            SimulationParameter::new(T_HOT, "Hot reservoir temperature", "kelvin", 600.0, 400.0, 800.0, 50.0),
            SimulationParameter::new(T_COLD, "Cold reservoir temperature", "kelvin", 300.0, 200.0, 400.0, 50.0),
        ]
    }

    fn evaluate(&self, params: &ParameterStore, t: f64) -> Evaluation {
        let cycle = match CycleGeometry::from_params(params) {
            Ok(c) => c,
            Err(cause) => return Evaluation::undefined(t, cause),
        };
        let (phase, s) = phase_at(t);
        let p = cycle.point(phase, s);

        Evaluation::checked(
            ModelState::at(t)
                .with("phase", phase as f64)
                .with("phase_progress", s)
                .with("cycles", (t.max(0.0) / CYCLE_PERIOD).floor())
                .with("volume", p.volume)
                .with("pressure", p.pressure)
                .with("temperature", p.temperature)
                .with("efficiency", cycle.efficiency())
                .with("net_work", cycle.net_work()),
        )
    }

    fn describe_transition(&self, prev: &ModelState, next: &ModelState) -> Option<String> {
        let before = prev.get("phase")?;
        let after = next.get("phase")?;
        if before == after {
            return None;
        }
        let idx = (after as usize).min(3);
        Some(format!("Phase {}: {}", idx + 1, PHASE_NAMES[idx]))
    }

    fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::Reset
    }
}
