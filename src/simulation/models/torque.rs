//! Force applied to the end of a wrench: tau = r F sin(theta)

use crate::simulation::model::PhysicsModel;
use crate::simulation::params::{ChangePolicy, ParameterStore, SimulationParameter};
use crate::simulation::states::{Evaluation, ModelState};

pub const FORCE: &str = "force";
pub const ANGLE: &str = "angle";
pub const LEVER_ARM: &str = "lever_arm";

/// Display rotation of the wrench while running, rad/s
pub const ROTATION_RATE: f64 = 1.2;

#[derive(Debug, Clone, Copy, Default)]
pub struct Torque;

impl PhysicsModel for Torque {
    fn name(&self) -> &'static str {
        "torque"
    }

    fn parameters(&self) -> Vec<SimulationParameter> {
        vec![
            SimulationParameter::new(FORCE, "Force", "Newtons", 50.0, 10.0, 200.0, 5.0),
            SimulationParameter::new(ANGLE, "Angle", "degrees", 90.0, 0.0, 180.0, 5.0),
            SimulationParameter::new(LEVER_ARM, "Lever arm", "meters", 0.3, 0.1, 0.8, 0.05),
        ]
    }

    fn evaluate(&self, params: &ParameterStore, t: f64) -> Evaluation {
        let f = params.value(FORCE);
        let theta = params.value(ANGLE).to_radians();
        let r = params.value(LEVER_ARM);

        let torque = r * f * theta.sin();
        // sin(180°) is ~1e-16, treat that as no torque
        let direction = if torque.abs() < 1e-9 { 0.0 } else { torque.signum() };

        Evaluation::checked(
            ModelState::at(t)
                .with("torque", torque)
                .with("perpendicular", f * theta.sin())
                .with("parallel", f * theta.cos())
                .with("lever_arm", r)
                .with("rotation", direction * ROTATION_RATE * t.max(0.0)),
        )
    }

    fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::Continue
    }
}
