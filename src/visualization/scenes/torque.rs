use crate::simulation::models::torque::{ANGLE, FORCE, LEVER_ARM};
use crate::simulation::params::ParameterStore;
use crate::simulation::states::NVec2;
use crate::visualization::scene::{Anchor, Color, Layer, Scene, Style};
use crate::visualization::scenes::{undefined_notice, Bounds, FrameContext, SceneBuilder};

/// Force arrow length at the slider maximum, as a fraction of the lever arm
const FORCE_SCALE: f64 = 0.8 / 200.0;

/// Wrench seen face-on; the plotted radius follows the lever arm
#[derive(Debug, Clone, Copy, Default)]
pub struct TorqueScene;

impl SceneBuilder for TorqueScene {
    fn bounds(&self, params: &ParameterStore) -> Bounds {
        let r = params.value(LEVER_ARM);
        let r = if r.is_finite() && r > 0.0 { r } else { 1.0 };
        let extent = 2.0 * r;
        ((-extent, extent), (-extent, extent))
    }

    fn equal_aspect(&self) -> bool {
        true
    }

    fn build(&self, ctx: &FrameContext<'_>) -> Scene {
        let mut scene = Scene::new();
        let m = ctx.mapper;
        let r = ctx.params.value(LEVER_ARM);
        let pivot = m.to_pixel(NVec2::zeros());

        scene.circle(Layer::Background, pivot, m.length_to_px(r), Style::stroke(Color::GRID, 1.5).dashed(6.0, 4.0));

        let Some(state) = ctx.evaluation.state() else {
            undefined_notice(&mut scene, m, ctx.evaluation);
            return scene;
        };

        let rho = state.value("rotation");
        let along = NVec2::new(rho.cos(), rho.sin());
        let normal = NVec2::new(-rho.sin(), rho.cos());
        let tip = along * r;

        scene.line(Layer::Dynamic, pivot, m.to_pixel(tip), Style::stroke(Color::hex(0x9ca3af), 10.0));
        scene.circle(Layer::Dynamic, pivot, 9.0, Style::fill(Color::SLATE));

        let f = ctx.params.value(FORCE);
        let theta = ctx.params.value(ANGLE).to_radians();
        let scale = r * FORCE_SCALE;
        let force = (along * theta.cos() + normal * theta.sin()) * f * scale;
        let tip_px = m.to_pixel(tip);
        scene.arrow(Layer::Dynamic, tip_px, m.to_pixel(tip + force), Style::stroke(Color::RED, 3.0));

        let perpendicular = normal * (state.value("perpendicular") * scale);
        let parallel = along * (state.value("parallel") * scale);
        scene.arrow(Layer::Dynamic, tip_px, m.to_pixel(tip + perpendicular), Style::stroke(Color::GREEN, 2.0).dashed(4.0, 3.0));
        scene.arrow(Layer::Dynamic, tip_px, m.to_pixel(tip + parallel), Style::stroke(Color::AMBER, 2.0).dashed(4.0, 3.0));

        // torque magnitude as a glow on the pivot
        let torque = state.value("torque");
        let max_torque = 0.8 * 200.0;
        scene.glow(Layer::Dynamic, pivot, 30.0, Color::VIOLET, torque.abs() / max_torque);

        let sense = if torque.abs() < 1e-9 {
            "no rotation"
        } else if torque > 0.0 {
            "counter-clockwise"
        } else {
            "clockwise"
        };
        let (top_left, _) = m.plot_area();
        scene.text(Layer::Overlay, top_left, format!("τ = {:.2} N·m ({sense})", torque), Anchor::Start);
        scene.text(
            Layer::Overlay,
            top_left + NVec2::new(0.0, 16.0),
            format!("F⊥ = {:.1} N   F∥ = {:.1} N   r = {:.2} m", state.value("perpendicular"), state.value("parallel"), r),
            Anchor::Start,
        );
        scene
    }
}
