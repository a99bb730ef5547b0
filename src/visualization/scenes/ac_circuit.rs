use crate::simulation::models::ac_circuit::{CAPACITANCE, FREQUENCY, INDUCTANCE, RESISTANCE};
use crate::simulation::params::ParameterStore;
use crate::simulation::states::NVec2;
use crate::visualization::scene::{Anchor, Color, Layer, Scene, Style};
use crate::visualization::scenes::{undefined_notice, Bounds, FrameContext, SceneBuilder};

/// Current phasor length relative to the unit voltage phasor
const CURRENT_LENGTH: f64 = 0.8;

/// Rotating phasor diagram of source voltage and loop current
#[derive(Debug, Clone, Copy, Default)]
pub struct AcCircuitScene;

impl SceneBuilder for AcCircuitScene {
    fn bounds(&self, _params: &ParameterStore) -> Bounds {
        ((-1.3, 1.3), (-1.3, 1.3))
    }

    fn equal_aspect(&self) -> bool {
        true
    }

    fn build(&self, ctx: &FrameContext<'_>) -> Scene {
        let mut scene = Scene::new();
        let m = ctx.mapper;
        let origin = m.to_pixel(NVec2::zeros());

        let axis = Style::stroke(Color::AXIS, 1.0);
        scene.line(Layer::Static, m.to_pixel(NVec2::new(-1.2, 0.0)), m.to_pixel(NVec2::new(1.2, 0.0)), axis);
        scene.line(Layer::Static, m.to_pixel(NVec2::new(0.0, -1.2)), m.to_pixel(NVec2::new(0.0, 1.2)), axis);
        scene.circle(Layer::Static, origin, m.length_to_px(1.0), Style::stroke(Color::GRID, 1.0).dashed(4.0, 4.0));

        let Some(state) = ctx.evaluation.state() else {
            undefined_notice(&mut scene, m, ctx.evaluation);
            return scene;
        };

        let wt = state.value("phasor_angle");
        let phi = state.value("phase");
        let v_tip = NVec2::new(wt.cos(), wt.sin());
        let i_tip = CURRENT_LENGTH * NVec2::new((wt - phi).cos(), (wt - phi).sin());

        for (tip, color) in [(v_tip, Color::BLUE), (i_tip, Color::RED)] {
            let p = m.to_pixel(tip);
            scene.arrow(Layer::Dynamic, origin, p, Style::stroke(color, 3.0));
            // projection onto the vertical axis is the instantaneous value
            scene.line(Layer::Dynamic, p, m.to_pixel(NVec2::new(0.0, tip.y)), Style::stroke(color, 1.0).dashed(3.0, 3.0));
        }

        let (top_left, _) = m.plot_area();
        let character = if state.value("reactance") >= 0.0 { "inductive" } else { "capacitive" };
        let lines = [
            format!(
                "R = {:.0} Ω   L = {:.2} H   C = {:.0} µF   f = {:.0} Hz",
                ctx.params.value(RESISTANCE),
                ctx.params.value(INDUCTANCE),
                ctx.params.value(CAPACITANCE),
                ctx.params.value(FREQUENCY),
            ),
            format!(
                "X_L = {:.1} Ω   X_C = {:.1} Ω   Z = {:.1} Ω",
                state.value("xl"),
                state.value("xc"),
                state.value("impedance"),
            ),
            format!("φ = {:.1}° ({})", state.value("phase_deg"), character),
        ];
        for (i, line) in lines.into_iter().enumerate() {
            scene.text(Layer::Overlay, top_left + NVec2::new(0.0, 16.0 * i as f64), line, Anchor::Start);
        }
        scene
    }
}
