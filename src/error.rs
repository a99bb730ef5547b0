//! Error types for the simulation engine
//!
//! Only input and configuration problems are errors. Singular physical
//! states are not: models report them as [`Evaluation::Undefined`] and the
//! frame simply draws less.
//!
//! [`Evaluation::Undefined`]: crate::simulation::states::Evaluation::Undefined

use thiserror::Error;

/// Result alias used throughout the library
pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// No parameter with this key exists for the mounted model
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// NaN or infinite slider input
    #[error("non-finite value for parameter `{key}`")]
    NonFiniteInput { key: String },

    /// Parameter may not change while the clock is running
    #[error("parameter `{key}` is locked while the simulation is running")]
    ParameterLocked { key: String },

    /// Axis bounds that cannot form an invertible scale
    #[error("degenerate {axis} domain [{min}, {max}]")]
    DegenerateDomain { axis: &'static str, min: f64, max: f64 },

    /// Viewport too small for its margins, or non-finite size
    #[error("invalid viewport {width}x{height} px with {margin} px margin")]
    InvalidViewport { width: f64, height: f64, margin: f64 },

    /// Scenario file content that deserialized but makes no sense
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
