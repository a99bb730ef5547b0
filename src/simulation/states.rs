//! Core state types produced by the physics models
//!
//! - [`ModelState`]  a value snapshot of the named quantities at time `t`
//! - [`Evaluation`]  either a defined state or the "undefined" sentinel
//! - [`Wavefront`]   expanding fronts emitted by oscillating sources
//!
//! States are recomputed every frame from `(parameters, t)` and never
//! mutated after a model returns them.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// One expanding front, in physical units
#[derive(Debug, Clone, PartialEq)]
pub struct Wavefront {
    pub emitted_at: f64, // emission time
    pub center: NVec2, // source position at emission
    pub radius: f64, // current radius
}

/// Physical quantities at one instant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelState {
    pub t: f64, // simulation time
    pub quantities: BTreeMap<&'static str, f64>, // named scalar outputs
    pub fronts: Vec<Wavefront>, // empty for non-wave models
}

impl ModelState {
    pub fn at(t: f64) -> Self {
        Self {
            t,
            ..Default::default()
        }
    }

    /// Builder-style insert of one quantity
    pub fn with(mut self, name: &'static str, value: f64) -> Self {
        self.quantities.insert(name, value);
        self
    }

    pub fn with_fronts(mut self, fronts: Vec<Wavefront>) -> Self {
        self.fronts = fronts;
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.quantities.get(name).copied()
    }

    /// Quantity or 0.0, for scene code that already checked the model kind
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    /// True when every quantity and front is finite
    pub fn is_finite(&self) -> bool {
        self.quantities.values().all(|v| v.is_finite())
            && self
                .fronts
                .iter()
                .all(|f| f.center.iter().all(|c| c.is_finite()) && f.radius.is_finite())
    }
}

/// Why a parameter combination has no physical meaning
#[derive(Debug, Clone, PartialEq)]
pub enum Singularity {
    /// Source moves at or above the propagation speed
    SupersonicSource { source_speed: f64, wave_speed: f64 },
    /// A denominator collapsed to zero or below
    ZeroDenominator(&'static str),
    /// Parameters are individually valid but jointly unphysical
    Degenerate(&'static str),
    /// A computed quantity came out NaN or infinite
    NonFinite(&'static str),
}

impl fmt::Display for Singularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Singularity::SupersonicSource { source_speed, wave_speed } => write!(
                f,
                "source speed {source_speed:.1} m/s reaches wave speed {wave_speed:.1} m/s"
            ),
            Singularity::ZeroDenominator(what) => write!(f, "zero denominator: {what}"),
            Singularity::Degenerate(what) => write!(f, "degenerate parameters: {what}"),
            Singularity::NonFinite(what) => write!(f, "non-finite result: {what}"),
        }
    }
}

/// Output of [`PhysicsModel::evaluate`](crate::simulation::model::PhysicsModel::evaluate)
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Defined(ModelState),
    Undefined { t: f64, cause: Singularity },
}

impl Evaluation {
    /// Wrap a state, downgrading it to `Undefined` if anything is non-finite
    pub fn checked(state: ModelState) -> Self {
        if state.is_finite() {
            Evaluation::Defined(state)
        } else {
            let t = state.t;
            let culprit = state
                .quantities
                .iter()
                .find(|(_, v)| !v.is_finite())
                .map(|(k, _)| *k)
                .unwrap_or("wavefront");
            Evaluation::Undefined {
                t,
                cause: Singularity::NonFinite(culprit),
            }
        }
    }

    pub fn undefined(t: f64, cause: Singularity) -> Self {
        Evaluation::Undefined { t, cause }
    }

    pub fn t(&self) -> f64 {
        match self {
            Evaluation::Defined(s) => s.t,
            Evaluation::Undefined { t, .. } => *t,
        }
    }

    pub fn state(&self) -> Option<&ModelState> {
        match self {
            Evaluation::Defined(s) => Some(s),
            Evaluation::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Evaluation::Defined(_))
    }
}
