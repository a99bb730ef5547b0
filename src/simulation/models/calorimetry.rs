//! Two bodies exchanging heat until they share one temperature
//!
//! T(t) = T_eq + (T0 - T_eq) e^(-k t) with the mass-weighted equilibrium
//! T_eq = (m1 T1 + m2 T2) / (m1 + m2). Both bodies share the specific heat
//! of water, so heat lost by the hot body equals heat gained by the cold one.

use crate::simulation::model::PhysicsModel;
use crate::simulation::params::{ChangePolicy, ParameterStore, SimulationParameter};
use crate::simulation::states::{Evaluation, ModelState, Singularity};
use crate::simulation::trace::TracePolicy;

pub const T_HOT: &str = "t_hot";
pub const M_HOT: &str = "m_hot";
pub const T_COLD: &str = "t_cold";
pub const M_COLD: &str = "m_cold";

/// Heat transfer rate constant, 1/s
pub const RATE: f64 = 0.5;
/// cal / (g °C)
pub const SPECIFIC_HEAT: f64 = 1.0;
/// Length of one run, s
pub const DURATION: f64 = 10.0;

/// Mass-weighted equilibrium, `None` when the total mass is not positive
pub fn equilibrium_temperature(m1: f64, t1: f64, m2: f64, t2: f64) -> Option<f64> {
    let total = m1 + m2;
    if !(total > 0.0) {
        return None;
    }
    Some((m1 * t1 + m2 * t2) / total)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Calorimetry;

impl PhysicsModel for Calorimetry {
    fn name(&self) -> &'static str {
        "calorimetry"
    }

    fn parameters(&self) -> Vec<SimulationParameter> {
        vec![
            SimulationParameter::new(T_HOT, "Hot body temperature", "°C", 80.0, 30.0, 100.0, 1.0),
            SimulationParameter::new(M_HOT, "Hot body mass", "grams", 100.0, 50.0, 200.0, 10.0),
            SimulationParameter::new(T_COLD, "Cold body temperature", "°C", 20.0, 0.0, 40.0, 1.0),
            SimulationParameter::new(M_COLD, "Cold body mass", "grams", 100.0, 50.0, 200.0, 10.0),
        ]
    }

    fn evaluate(&self, params: &ParameterStore, t: f64) -> Evaluation {
        let (t1, m1) = (params.value(T_HOT), params.value(M_HOT));
        let (t2, m2) = (params.value(T_COLD), params.value(M_COLD));

        let Some(t_eq) = equilibrium_temperature(m1, t1, m2, t2) else {
            return Evaluation::undefined(t, Singularity::ZeroDenominator("total mass"));
        };
        let decay = (-RATE * t.max(0.0)).exp();

        Evaluation::checked(
            ModelState::at(t)
                .with("t_hot", t_eq + (t1 - t_eq) * decay)
                .with("t_cold", t_eq + (t2 - t_eq) * decay)
                .with("t_eq", t_eq)
                .with("heat_transferred", m1 * SPECIFIC_HEAT * (t1 - t_eq).abs()),
        )
    }

    fn horizon(&self, _params: &ParameterStore) -> Option<f64> {
        Some(DURATION)
    }

    fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::Reset
    }

    fn trace_policy(&self) -> Option<TracePolicy> {
        // 50 intervals plus the t = 0 sample
        Some(TracePolicy::new(51, DURATION / 50.0))
    }
}
