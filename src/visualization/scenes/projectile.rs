use crate::simulation::models::projectile::{Launch, ANGLE, VELOCITY};
use crate::simulation::params::ParameterStore;
use crate::simulation::states::NVec2;
use crate::visualization::scene::{Anchor, Color, Layer, Scene, Style};
use crate::visualization::scenes::{undefined_notice, Bounds, FrameContext, SceneBuilder};

/// px per m/s for the velocity component arrows
const VELOCITY_PX: f64 = 2.0;
const BALL_RADIUS: f64 = 12.0;
const PREDICTION_SAMPLES: usize = 60;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectileScene;

impl SceneBuilder for ProjectileScene {
    fn bounds(&self, params: &ParameterStore) -> Bounds {
        match Launch::from_params(params) {
            Some(l) => ((0.0, (l.range() * 1.1).max(1.0)), (0.0, (l.max_height() * 1.25).max(1.0))),
            None => ((0.0, 1.0), (0.0, 1.0)),
        }
    }

    fn build(&self, ctx: &FrameContext<'_>) -> Scene {
        let mut scene = Scene::new();
        let m = ctx.mapper;
        scene.grid(m, 8).axes(m, "Distance (m)", "Height (m)", 8);

        let origin = m.to_pixel(NVec2::zeros());
        let (_, bottom_right) = m.plot_area();
        scene.line(Layer::Static, origin, NVec2::new(bottom_right.x, origin.y), Style::stroke(Color::hex(0x15803d), 3.0));

        let angle = ctx.params.value(ANGLE).to_radians();
        let tip = origin + 50.0 * NVec2::new(angle.cos(), -angle.sin());
        scene.arrow(Layer::Static, origin, tip, Style::stroke(Color::AMBER, 3.0));

        let Some(state) = ctx.evaluation.state() else {
            undefined_notice(&mut scene, m, ctx.evaluation);
            return scene;
        };
        let Some(launch) = Launch::from_params(ctx.params) else {
            return scene;
        };

        // predicted path, dashed, once the run has begun
        if state.t > 0.0 || !ctx.trace.is_empty() {
            let flight = launch.flight_time();
            let predicted = (0..=PREDICTION_SAMPLES)
                .map(|i| m.to_pixel(launch.position(flight * i as f64 / PREDICTION_SAMPLES as f64)))
                .collect();
            scene.path(Layer::Static, predicted, false, Style::stroke(Color::BLUE.with_alpha(0.5), 2.0).dashed(5.0, 5.0));
        }

        // fading trail: older samples are fainter
        let n = ctx.trace.len();
        let mut trail: Vec<NVec2> = ctx.trace.iter().map(|s| m.to_pixel(NVec2::new(s.value("x"), s.value("y")))).collect();
        for (i, p) in trail.iter().enumerate() {
            let alpha = (i + 1) as f64 / n.max(1) as f64;
            scene.circle(Layer::Dynamic, *p, 2.5, Style::fill(Color::BLUE).with_opacity(alpha));
        }
        let here = m.to_pixel(NVec2::new(state.value("x"), state.value("y")));
        trail.push(here);
        scene.path(Layer::Dynamic, trail, false, Style::stroke(Color::BLUE, 3.0));

        // shadow on the ground under the ball
        let shadow = NVec2::new(here.x + 5.0, origin.y + 5.0);
        scene.glow(Layer::Dynamic, shadow, 15.0, Color::BLACK, 0.3);
        scene.glow(Layer::Dynamic, here, 2.0 * BALL_RADIUS, Color::BLUE, 0.4);
        scene.circle(Layer::Dynamic, here, BALL_RADIUS, Style::fill(Color::BLUE));

        let vx = state.value("vx");
        let vy = state.value("vy");
        scene.arrow(Layer::Dynamic, here, here + NVec2::new(vx * VELOCITY_PX, 0.0), Style::stroke(Color::RED, 2.0));
        scene.arrow(Layer::Dynamic, here, here + NVec2::new(0.0, -vy * VELOCITY_PX), Style::stroke(Color::GREEN, 2.0));

        let label_at = origin + NVec2::new(55.0, -5.0);
        scene.text(Layer::Overlay, label_at, format!("θ = {:.0}°", ctx.params.value(ANGLE)), Anchor::Start);
        scene.text(Layer::Overlay, label_at + NVec2::new(0.0, 17.0), format!("v₀ = {:.0} m/s", ctx.params.value(VELOCITY)), Anchor::Start);
        scene.text(
            Layer::Overlay,
            NVec2::new(bottom_right.x, m.plot_area().0.y),
            format!(
                "t = {:.2} s   range {:.2} m   max height {:.2} m",
                state.t,
                state.value("range"),
                state.value("max_height")
            ),
            Anchor::End,
        );
        scene
    }
}
