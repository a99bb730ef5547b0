//! Series RLC circuit driven by a unit-amplitude sinusoidal source

use std::f64::consts::TAU;

use crate::simulation::model::PhysicsModel;
use crate::simulation::params::{ChangePolicy, ParameterStore, SimulationParameter};
use crate::simulation::states::{Evaluation, ModelState, Singularity};

pub const RESISTANCE: &str = "resistance";
pub const INDUCTANCE: &str = "inductance";
pub const CAPACITANCE: &str = "capacitance";
pub const FREQUENCY: &str = "frequency";

/// Reactances and impedance at one driving frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impedance {
    pub omega: f64, // angular frequency, rad/s
    pub xl: f64, // inductive reactance
    pub xc: f64, // capacitive reactance
    pub z: f64, // |Z|
    pub phi: f64, // phase of current behind voltage, rad
}

impl Impedance {
    /// `capacitance_uf` in microfarads
    pub fn new(r: f64, l: f64, capacitance_uf: f64, f: f64) -> Result<Self, Singularity> {
        let omega = TAU * f;
        let c = capacitance_uf * 1e-6;
        if !(omega * c > 0.0) {
            return Err(Singularity::ZeroDenominator("omega * C"));
        }
        let xl = omega * l;
        let xc = 1.0 / (omega * c);
        let x = xl - xc;
        let z = (r * r + x * x).sqrt();
        if !(z > 0.0) {
            return Err(Singularity::ZeroDenominator("impedance"));
        }
        Ok(Self {
            omega,
            xl,
            xc,
            z,
            phi: x.atan2(r),
        })
    }

    pub fn from_params(params: &ParameterStore) -> Result<Self, Singularity> {
        Self::new(
            params.value(RESISTANCE),
            params.value(INDUCTANCE),
            params.value(CAPACITANCE),
            params.value(FREQUENCY),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AcCircuit;

impl PhysicsModel for AcCircuit {
    fn name(&self) -> &'static str {
        "ac_circuit"
    }

    fn parameters(&self) -> Vec<SimulationParameter> {
        vec![
            SimulationParameter::new(RESISTANCE, "Resistance", "ohms", 50.0, 10.0, 100.0, 10.0),
            SimulationParameter::new(INDUCTANCE, "Inductance", "henry", 0.1, 0.05, 0.5, 0.05),
            SimulationParameter::new(CAPACITANCE, "Capacitance", "microfarads", 100.0, 25.0, 100.0, 5.0),
            SimulationParameter::new(FREQUENCY, "Frequency", "hertz", 50.0, 50.0, 200.0, 10.0),
        ]
    }

    fn evaluate(&self, params: &ParameterStore, t: f64) -> Evaluation {
        let imp = match Impedance::from_params(params) {
            Ok(imp) => imp,
            Err(cause) => return Evaluation::undefined(t, cause),
        };
        let wt = imp.omega * t;

        Evaluation::checked(
            ModelState::at(t)
                .with("omega", imp.omega)
                .with("xl", imp.xl)
                .with("xc", imp.xc)
                .with("reactance", imp.xl - imp.xc)
                .with("impedance", imp.z)
                .with("phase", imp.phi)
                .with("phase_deg", imp.phi.to_degrees())
                .with("current_peak", 1.0 / imp.z)
                .with("voltage", wt.sin())
                .with("current", (wt - imp.phi).sin() / imp.z)
                .with("phasor_angle", wt.rem_euclid(TAU)),
        )
    }

    fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::Continue
    }
}
