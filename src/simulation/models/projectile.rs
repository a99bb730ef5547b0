//! Projectile launched from the origin over flat ground
//!
//! x(t) = v0 cos(theta) t
//! y(t) = v0 sin(theta) t - g t^2 / 2
//!
//! The run terminates when the projectile lands, at t = 2 v0 sin(theta) / g.

use crate::simulation::model::PhysicsModel;
use crate::simulation::params::{ChangePolicy, ParameterStore, SimulationParameter};
use crate::simulation::states::{Evaluation, ModelState, NVec2, Singularity};
use crate::simulation::trace::TracePolicy;

pub const ANGLE: &str = "angle";
pub const VELOCITY: &str = "velocity";
pub const GRAVITY: &str = "gravity";

/// Launch conditions resolved from the sliders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub vx: f64, // horizontal velocity, constant
    pub vy: f64, // initial vertical velocity
    pub g: f64, // gravitational acceleration
}

impl Launch {
    /// `None` when gravity is not positive (no landing, no closed form)
    pub fn new(angle_deg: f64, v0: f64, g: f64) -> Option<Self> {
        if !(g > 0.0) || !angle_deg.is_finite() || !v0.is_finite() {
            return None;
        }
        let theta = angle_deg.to_radians();
        Some(Self {
            vx: v0 * theta.cos(),
            vy: v0 * theta.sin(),
            g,
        })
    }

    pub fn from_params(params: &ParameterStore) -> Option<Self> {
        Self::new(params.value(ANGLE), params.value(VELOCITY), params.value(GRAVITY))
    }

    /// T = 2 v0 sin(theta) / g
    pub fn flight_time(&self) -> f64 {
        (2.0 * self.vy / self.g).max(0.0)
    }

    /// R = v0^2 sin(2 theta) / g
    pub fn range(&self) -> f64 {
        self.vx * self.flight_time()
    }

    /// H = v0^2 sin^2(theta) / 2g
    pub fn max_height(&self) -> f64 {
        (self.vy * self.vy / (2.0 * self.g)).max(0.0)
    }

    /// Position at time t, clamped to the flight so y never goes below ground
    pub fn position(&self, t: f64) -> NVec2 {
        let t = t.clamp(0.0, self.flight_time());
        NVec2::new(self.vx * t, (self.vy * t - 0.5 * self.g * t * t).max(0.0))
    }

    pub fn velocity(&self, t: f64) -> NVec2 {
        let t = t.clamp(0.0, self.flight_time());
        NVec2::new(self.vx, self.vy - self.g * t)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Projectile;

impl PhysicsModel for Projectile {
    fn name(&self) -> &'static str {
        "projectile"
    }

    fn parameters(&self) -> Vec<SimulationParameter> {
        vec![
            SimulationParameter::new(ANGLE, "Launch angle", "degrees", 45.0, 0.0, 90.0, 1.0).locked(),
            SimulationParameter::new(VELOCITY, "Initial velocity", "m/s", 25.0, 5.0, 50.0, 1.0).locked(),
            SimulationParameter::new(GRAVITY, "Gravity", "m/s²", 9.8, 1.0, 25.0, 0.1).locked(),
        ]
    }

    fn evaluate(&self, params: &ParameterStore, t: f64) -> Evaluation {
        let Some(launch) = Launch::from_params(params) else {
            return Evaluation::undefined(t, Singularity::ZeroDenominator("gravity"));
        };
        let x = launch.position(t);
        let v = launch.velocity(t);

        Evaluation::checked(
            ModelState::at(t)
                .with("x", x.x)
                .with("y", x.y)
                .with("vx", v.x)
                .with("vy", v.y)
                .with("speed", v.norm())
                .with("range", launch.range())
                .with("max_height", launch.max_height())
                .with("flight_time", launch.flight_time()),
        )
    }

    fn horizon(&self, params: &ParameterStore) -> Option<f64> {
        Launch::from_params(params).map(|l| l.flight_time())
    }

    fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::Reset
    }

    fn trace_policy(&self) -> Option<TracePolicy> {
        Some(TracePolicy::new(50, 0.08))
    }
}
