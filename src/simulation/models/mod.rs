//! Physics models, one per simulation
//!
//! Every model is a stateless unit struct (or a small config struct) whose
//! [`PhysicsModel::evaluate`](crate::simulation::model::PhysicsModel::evaluate)
//! is a closed-form function of the parameters and time.

pub mod projectile;
pub mod circuit;
pub mod ac_circuit;
pub mod carnot;
pub mod doppler;
pub mod calorimetry;
pub mod torque;

pub use projectile::{Launch, Projectile};
pub use circuit::DcCircuit;
pub use ac_circuit::{AcCircuit, Impedance};
pub use carnot::{CarnotCycle, CycleGeometry};
pub use doppler::Doppler;
pub use calorimetry::{equilibrium_temperature, Calorimetry};
pub use torque::Torque;
