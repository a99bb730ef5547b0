use crate::simulation::models::calorimetry::DURATION;
use crate::simulation::params::ParameterStore;
use crate::simulation::states::NVec2;
use crate::visualization::scene::{ramp_opacity, Anchor, Color, Layer, Scene, Style};
use crate::visualization::scenes::{undefined_notice, Bounds, FrameContext, SceneBuilder};

/// Temperature-time curves of both bodies plus their containers
#[derive(Debug, Clone, Copy, Default)]
pub struct CalorimetryScene;

impl SceneBuilder for CalorimetryScene {
    fn bounds(&self, _params: &ParameterStore) -> Bounds {
        ((0.0, DURATION), (0.0, 100.0))
    }

    fn build(&self, ctx: &FrameContext<'_>) -> Scene {
        let mut scene = Scene::new();
        let m = ctx.mapper;
        scene.grid(m, 10).axes(m, "Time (s)", "Temperature (°C)", 10);

        let Some(state) = ctx.evaluation.state() else {
            undefined_notice(&mut scene, m, ctx.evaluation);
            return scene;
        };

        let t_eq = state.value("t_eq");
        let (x0, x1) = m.x_scale().domain;
        scene.line(
            Layer::Static,
            m.to_pixel(NVec2::new(x0, t_eq)),
            m.to_pixel(NVec2::new(x1, t_eq)),
            Style::stroke(Color::GREEN, 2.0).dashed(5.0, 5.0),
        );
        scene.text(
            Layer::Overlay,
            m.to_pixel(NVec2::new(x1, t_eq)) + NVec2::new(-4.0, -6.0),
            format!("Equilibrium: {:.1}°C", t_eq),
            Anchor::End,
        );

        for (key, color) in [("t_hot", Color::RED), ("t_cold", Color::BLUE)] {
            let mut curve: Vec<NVec2> = ctx.trace.iter().map(|s| m.to_pixel(NVec2::new(s.t, s.value(key)))).collect();
            curve.push(m.to_pixel(NVec2::new(state.t, state.value(key))));
            scene.path(Layer::Dynamic, curve, false, Style::stroke(color, 3.0));
        }

        // containers in the empty top-right corner, fill opacity tracks temperature
        let (top_left, bottom_right) = m.plot_area();
        let y = top_left.y + 40.0;
        let width = bottom_right.x - top_left.x;
        for (i, (key, color, label)) in [("t_hot", Color::RED, "Hot"), ("t_cold", Color::BLUE, "Cold")].into_iter().enumerate() {
            let x = top_left.x + width * (0.6 + 0.2 * i as f64);
            let temp = state.value(key);
            let alpha = ramp_opacity(temp, 0.0, 100.0, 0.3, 0.5);
            scene.circle(Layer::Dynamic, NVec2::new(x, y), 22.0, Style::stroke(Color::SLATE, 2.0).filled(color.with_alpha(alpha)));
            scene.text(Layer::Overlay, NVec2::new(x, y + 36.0), format!("{label}: {temp:.1}°C"), Anchor::Middle);
        }

        scene.text(
            Layer::Overlay,
            NVec2::new(bottom_right.x, top_left.y - 10.0),
            format!("t = {:.1} s   Q = {:.0} cal", state.t, state.value("heat_transferred")),
            Anchor::End,
        );
        scene
    }
}
