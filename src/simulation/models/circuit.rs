//! Battery, resistor, switch and bulb in a single DC loop
//!
//! Ohm's law gives the current; brightness and carrier drift speed follow it.

use crate::simulation::model::PhysicsModel;
use crate::simulation::params::{ChangePolicy, ParameterStore, SimulationParameter};
use crate::simulation::states::{Evaluation, ModelState, Singularity};

pub const VOLTAGE: &str = "voltage";
pub const RESISTANCE: &str = "resistance";
pub const SWITCH: &str = "switch";

/// Current at which the bulb reaches full brightness, mA
pub const FULL_BRIGHTNESS_MA: f64 = 100.0;
/// Loop fractions travelled per second per mA of current
pub const CARRIER_RATE: f64 = 0.001;

#[derive(Debug, Clone, Copy, Default)]
pub struct DcCircuit;

impl PhysicsModel for DcCircuit {
    fn name(&self) -> &'static str {
        "circuit"
    }

    fn parameters(&self) -> Vec<SimulationParameter> {
        vec![
            SimulationParameter::new(VOLTAGE, "Voltage", "volts", 9.0, 1.0, 24.0, 1.0),
            SimulationParameter::new(RESISTANCE, "Resistance", "ohms", 100.0, 10.0, 500.0, 10.0),
            SimulationParameter::new(SWITCH, "Switch", "", 0.0, 0.0, 1.0, 1.0),
        ]
    }

    fn evaluate(&self, params: &ParameterStore, t: f64) -> Evaluation {
        let v = params.value(VOLTAGE);
        let r = params.value(RESISTANCE);
        let closed = params.value(SWITCH) >= 0.5;

        if !(r > 0.0) {
            return Evaluation::undefined(t, Singularity::ZeroDenominator("resistance"));
        }

        let current_ma = if closed { 1000.0 * v / r } else { 0.0 };
        let power_w = v * current_ma / 1000.0;
        let brightness = (current_ma / FULL_BRIGHTNESS_MA).clamp(0.0, 1.0);
        let drift = (CARRIER_RATE * current_ma * t).rem_euclid(1.0);

        Evaluation::checked(
            ModelState::at(t)
                .with("current_ma", current_ma)
                .with("power_w", power_w)
                .with("brightness", brightness)
                .with("carrier_drift", drift)
                .with("switch_closed", if closed { 1.0 } else { 0.0 }),
        )
    }

    fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::Continue
    }
}
