//! Scene builders, one per simulation
//!
//! A builder reads model output (plus trace and parameters) and emits a
//! [`Scene`]. It may call a model's closed-form helpers to sample a curve,
//! but never mutates anything and never touches a surface.

use crate::simulation::params::ParameterStore;
use crate::simulation::states::{Evaluation, NVec2};
use crate::simulation::trace::TraceBuffer;
use crate::visualization::coords::CoordinateMapper;
use crate::visualization::scene::{Anchor, Color, DrawCommand, Layer, Scene};

pub mod projectile;
pub mod circuit;
pub mod ac_circuit;
pub mod carnot;
pub mod doppler;
pub mod calorimetry;
pub mod torque;

pub use projectile::ProjectileScene;
pub use circuit::CircuitScene;
pub use ac_circuit::AcCircuitScene;
pub use carnot::CarnotScene;
pub use doppler::DopplerScene;
pub use calorimetry::CalorimetryScene;
pub use torque::TorqueScene;

/// Physical bounds of a plot, `(x_min, x_max), (y_min, y_max)`
pub type Bounds = ((f64, f64), (f64, f64));

/// Everything a builder may read for one frame
pub struct FrameContext<'a> {
    pub evaluation: &'a Evaluation,
    pub trace: &'a TraceBuffer,
    pub params: &'a ParameterStore,
    pub mapper: &'a CoordinateMapper,
}

pub trait SceneBuilder {
    /// Physical region to plot for the current parameters
    fn bounds(&self, params: &ParameterStore) -> Bounds;

    /// Keep one physical unit the same pixel length on both axes
    fn equal_aspect(&self) -> bool {
        false
    }

    fn build(&self, ctx: &FrameContext<'_>) -> Scene;
}

/// Overlay line explaining why nothing dynamic is drawn this frame
pub(crate) fn undefined_notice(scene: &mut Scene, mapper: &CoordinateMapper, evaluation: &Evaluation) {
    if let Evaluation::Undefined { cause, .. } = evaluation {
        let (top_left, bottom_right) = mapper.plot_area();
        let at = NVec2::new(0.5 * (top_left.x + bottom_right.x), 0.5 * (top_left.y + bottom_right.y));
        scene.push(
            Layer::Overlay,
            DrawCommand::Text {
                at,
                content: format!("Undefined: {cause}"),
                size: 14.0,
                color: Color::RED,
                anchor: Anchor::Middle,
            },
        );
    }
}

/// Point at `fraction` of the total arc length of a closed polyline
pub(crate) fn point_along(points: &[NVec2], fraction: f64) -> Option<NVec2> {
    if points.len() < 2 {
        return points.first().copied();
    }
    let segments: Vec<(NVec2, NVec2)> = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
        .collect();
    let total: f64 = segments.iter().map(|(a, b)| (b - a).norm()).sum();
    if !(total > 0.0) {
        return points.first().copied();
    }

    let mut remaining = fraction.rem_euclid(1.0) * total;
    for (a, b) in &segments {
        let len = (b - a).norm();
        if remaining <= len && len > 0.0 {
            return Some(a + (b - a) * (remaining / len));
        }
        remaining -= len;
    }
    points.first().copied()
}
