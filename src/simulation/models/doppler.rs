//! Moving point source emitting spherical fronts in a still medium
//!
//! A front leaves the source every period 1/f and grows at the sound speed.
//! Only the most recent `max_fronts` are reported, which bounds the
//! rendering cost no matter how long the run lasts.

use crate::simulation::model::PhysicsModel;
use crate::simulation::params::{ChangePolicy, ParameterStore, SimulationParameter};
use crate::simulation::states::{Evaluation, ModelState, NVec2, Singularity, Wavefront};

pub const SOURCE_SPEED: &str = "source_speed";
pub const SOUND_SPEED: &str = "sound_speed";
pub const FREQUENCY: &str = "frequency";

/// Half width of the plotted medium, m
pub const HALF_WIDTH: f64 = 8.0;
/// Observers sit at +/- this distance from the origin, m
pub const OBSERVER_OFFSET: f64 = 6.0;

#[derive(Debug, Clone, Copy)]
pub struct Doppler {
    pub max_fronts: usize,
    pub half_width: f64,
}

impl Default for Doppler {
    fn default() -> Self {
        Self {
            max_fronts: 10,
            half_width: HALF_WIDTH,
        }
    }
}

impl Doppler {
    pub fn with_max_fronts(mut self, max_fronts: usize) -> Self {
        self.max_fronts = max_fronts;
        self
    }

    /// Observed frequencies ahead of and behind the source
    pub fn observed(f: f64, c: f64, vs: f64) -> Result<(f64, f64), Singularity> {
        if !(c > 0.0) {
            return Err(Singularity::ZeroDenominator("sound speed"));
        }
        if vs.abs() >= c {
            return Err(Singularity::SupersonicSource {
                source_speed: vs,
                wave_speed: c,
            });
        }
        Ok((f * c / (c - vs), f * c / (c + vs)))
    }

    fn fronts(&self, f: f64, c: f64, vs: f64, t: f64) -> Vec<Wavefront> {
        if self.max_fronts == 0 || t < 0.0 {
            return Vec::new();
        }
        let period = 1.0 / f;
        // small slack so a front due exactly at t is not lost to rounding
        let newest = ((t / period) + 1e-9).floor() as u64;
        let oldest = (newest + 1).saturating_sub(self.max_fronts as u64);

        (oldest..=newest)
            .map(|k| {
                let emitted_at = k as f64 * period;
                Wavefront {
                    emitted_at,
                    center: NVec2::new(vs * emitted_at, 0.0),
                    radius: c * (t - emitted_at).max(0.0),
                }
            })
            .collect()
    }
}

impl PhysicsModel for Doppler {
    fn name(&self) -> &'static str {
        "doppler"
    }

    fn parameters(&self) -> Vec<SimulationParameter> {
        vec![
            SimulationParameter::new(SOURCE_SPEED, "Source speed", "× sound speed", 0.3, 0.0, 0.8, 0.05),
            SimulationParameter::new(FREQUENCY, "Frequency", "Hz", 500.0, 200.0, 1000.0, 50.0),
            SimulationParameter::new(SOUND_SPEED, "Speed of sound", "m/s", 340.0, 300.0, 400.0, 10.0),
        ]
    }

    fn evaluate(&self, params: &ParameterStore, t: f64) -> Evaluation {
        let c = params.value(SOUND_SPEED);
        let f = params.value(FREQUENCY);
        let vs = params.value(SOURCE_SPEED) * c;

        if !(f > 0.0) {
            return Evaluation::undefined(t, Singularity::ZeroDenominator("frequency"));
        }
        let (ahead, behind) = match Self::observed(f, c, vs) {
            Ok(pair) => pair,
            Err(cause) => return Evaluation::undefined(t, cause),
        };

        let fronts = self.fronts(f, c, vs, t);
        Evaluation::checked(
            ModelState::at(t)
                .with("source_x", vs * t)
                .with("source_velocity", vs)
                .with("observed_ahead", ahead)
                .with("observed_behind", behind)
                .with("wavelength", c / f)
                .with("wavelength_ahead", c / ahead)
                .with("wavelength_behind", c / behind)
                .with("fronts_emitted", ((t.max(0.0) * f) + 1e-9).floor() + 1.0)
                .with_fronts(fronts),
        )
    }

    /// Ends when the source leaves the plotted medium; a stationary source runs until paused
    fn horizon(&self, params: &ParameterStore) -> Option<f64> {
        let vs = params.value(SOURCE_SPEED) * params.value(SOUND_SPEED);
        if vs.is_finite() && vs > 0.0 {
            Some(self.half_width / vs)
        } else {
            None
        }
    }

    fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::Reset
    }
}
