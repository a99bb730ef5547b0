use crate::simulation::models::doppler::{Doppler, OBSERVER_OFFSET};
use crate::simulation::params::ParameterStore;
use crate::simulation::states::NVec2;
use crate::visualization::scene::{Anchor, Color, Layer, Scene, Style};
use crate::visualization::scenes::{undefined_notice, Bounds, FrameContext, SceneBuilder};

/// Fronts from a moving source, with observers ahead and behind
#[derive(Debug, Clone, Copy)]
pub struct DopplerScene {
    pub half_width: f64,
}

impl DopplerScene {
    pub fn for_model(model: &Doppler) -> Self {
        Self {
            half_width: model.half_width,
        }
    }
}

impl SceneBuilder for DopplerScene {
    fn bounds(&self, _params: &ParameterStore) -> Bounds {
        ((-self.half_width, self.half_width), (-0.5 * self.half_width, 0.5 * self.half_width))
    }

    fn equal_aspect(&self) -> bool {
        true
    }

    fn build(&self, ctx: &FrameContext<'_>) -> Scene {
        let mut scene = Scene::new();
        let m = ctx.mapper;

        let (x0, x1) = m.x_scale().domain;
        scene.line(
            Layer::Background,
            m.to_pixel(NVec2::new(x0, 0.0)),
            m.to_pixel(NVec2::new(x1, 0.0)),
            Style::stroke(Color::GRID, 1.0).dashed(6.0, 4.0),
        );

        let ahead = m.to_pixel(NVec2::new(OBSERVER_OFFSET, 0.0));
        let behind = m.to_pixel(NVec2::new(-OBSERVER_OFFSET, 0.0));
        for p in [ahead, behind] {
            scene.circle(Layer::Static, p, 8.0, Style::fill(Color::hex(0x10b981)));
        }

        let Some(state) = ctx.evaluation.state() else {
            undefined_notice(&mut scene, m, ctx.evaluation);
            return scene;
        };

        // beyond this radius a front covers the whole plot and is not drawn
        let (top_left, bottom_right) = m.plot_area();
        let visible = ((bottom_right.x - top_left.x).powi(2) + (bottom_right.y - top_left.y).powi(2)).sqrt();

        for front in &state.fronts {
            let center = m.to_pixel(front.center);
            let radius = m.length_to_px(front.radius);
            if radius <= 0.0 || radius > visible {
                continue;
            }
            let fade = 0.6 * (1.0 - radius / visible);
            scene.circle(Layer::Dynamic, center, radius, Style::stroke(Color::BLUE, 1.5).with_opacity(fade));
        }

        let source = m.to_pixel(NVec2::new(state.value("source_x"), 0.0));
        scene.glow(Layer::Dynamic, source, 20.0, Color::RED, 0.5);
        scene.circle(Layer::Dynamic, source, 10.0, Style::fill(Color::RED));
        if state.value("source_velocity") > 0.0 {
            scene.arrow(Layer::Dynamic, source, source + NVec2::new(30.0, 0.0), Style::stroke(Color::RED, 2.0));
        }

        scene.text(Layer::Overlay, ahead + NVec2::new(0.0, 26.0), format!("{:.1} Hz", state.value("observed_ahead")), Anchor::Middle);
        scene.text(Layer::Overlay, behind + NVec2::new(0.0, 26.0), format!("{:.1} Hz", state.value("observed_behind")), Anchor::Middle);
        scene.text(
            Layer::Overlay,
            top_left,
            format!(
                "λ = {:.3} m   ahead {:.3} m   behind {:.3} m",
                state.value("wavelength"),
                state.value("wavelength_ahead"),
                state.value("wavelength_behind")
            ),
            Anchor::Start,
        );
        scene
    }
}
