use crate::simulation::models::carnot::{CycleGeometry, PHASE_NAMES};
use crate::simulation::params::ParameterStore;
use crate::simulation::states::NVec2;
use crate::visualization::scene::{Anchor, Color, Layer, Scene, Style};
use crate::visualization::scenes::{undefined_notice, Bounds, FrameContext, SceneBuilder};

const PHASE_COLORS: [Color; 4] = [Color::RED, Color::AMBER, Color::BLUE, Color::VIOLET];
const SAMPLES_PER_PHASE: usize = 50;

/// Pressure-volume diagram with the working point moving around the cycle
#[derive(Debug, Clone, Copy, Default)]
pub struct CarnotScene;

impl SceneBuilder for CarnotScene {
    fn bounds(&self, params: &ParameterStore) -> Bounds {
        match CycleGeometry::from_params(params) {
            Ok(c) => ((0.0, c.max_volume() * 1.1), (0.0, c.max_pressure() * 1.2)),
            Err(_) => ((0.0, 1.0), (0.0, 1.0)),
        }
    }

    fn build(&self, ctx: &FrameContext<'_>) -> Scene {
        let mut scene = Scene::new();
        let m = ctx.mapper;
        scene.grid(m, 6).axes(m, "Volume (L)", "Pressure (kPa)", 6);

        let (Some(state), Ok(cycle)) = (ctx.evaluation.state(), CycleGeometry::from_params(ctx.params)) else {
            undefined_notice(&mut scene, m, ctx.evaluation);
            return scene;
        };

        let to_px = |phase: usize, s: f64| {
            let p = cycle.point(phase, s);
            m.to_pixel(NVec2::new(p.volume, p.pressure))
        };

        // enclosed area is the net work
        let outline: Vec<NVec2> = (0..4)
            .flat_map(|phase| (0..SAMPLES_PER_PHASE).map(move |i| (phase, i as f64 / SAMPLES_PER_PHASE as f64)))
            .map(|(phase, s)| to_px(phase, s))
            .collect();
        scene.path(Layer::Background, outline, true, Style::fill(Color::GREEN).with_opacity(0.1));

        for (phase, color) in PHASE_COLORS.iter().enumerate() {
            let curve = (0..=SAMPLES_PER_PHASE).map(|i| to_px(phase, i as f64 / SAMPLES_PER_PHASE as f64)).collect();
            scene.path(Layer::Static, curve, false, Style::stroke(*color, 3.0));

            let corner = to_px(phase, 0.0);
            scene.circle(Layer::Static, corner, 5.0, Style::fill(Color::SLATE));
            scene.text(Layer::Overlay, corner + NVec2::new(8.0, -8.0), format!("{}", phase + 1), Anchor::Start);
        }

        let phase = (state.value("phase") as usize).min(3);
        let here = m.to_pixel(NVec2::new(state.value("volume"), state.value("pressure")));
        scene.glow(Layer::Dynamic, here, 18.0, PHASE_COLORS[phase], 0.6);
        scene.circle(Layer::Dynamic, here, 8.0, Style::fill(PHASE_COLORS[phase]).with_opacity(1.0));

        let (top_left, bottom_right) = m.plot_area();
        let at = NVec2::new(bottom_right.x, top_left.y);
        scene.text(Layer::Overlay, at, format!("Phase {}: {}", phase + 1, PHASE_NAMES[phase]), Anchor::End);
        scene.text(
            Layer::Overlay,
            at + NVec2::new(0.0, 16.0),
            format!(
                "T = {:.0} K   η = {:.1}%   W = {:.0} J",
                state.value("temperature"),
                100.0 * state.value("efficiency"),
                state.value("net_work")
            ),
            Anchor::End,
        );
        scene
    }
}
