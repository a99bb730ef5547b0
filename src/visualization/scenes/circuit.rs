use crate::simulation::models::circuit::{CARRIER_RATE, RESISTANCE, SWITCH, VOLTAGE};
use crate::simulation::params::ParameterStore;
use crate::simulation::states::NVec2;
use crate::visualization::scene::{Anchor, Color, Layer, Scene, Style};
use crate::visualization::scenes::{point_along, undefined_notice, Bounds, FrameContext, SceneBuilder};

/// Layout height; layout rows grow downward like the board drawing
const LAYOUT_H: f64 = 400.0;
const CARRIERS: usize = 15;

/// Wire corners in layout units, clockwise from the battery
const LOOP: [(f64, f64); 12] = [
    (100.0, 200.0),
    (100.0, 100.0),
    (300.0, 100.0),
    (300.0, 150.0),
    (300.0, 200.0),
    (500.0, 200.0),
    (500.0, 100.0),
    (600.0, 100.0),
    (600.0, 200.0),
    (600.0, 300.0),
    (300.0, 300.0),
    (100.0, 300.0),
];

fn layout(x: f64, y: f64) -> NVec2 {
    NVec2::new(x, LAYOUT_H - y)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CircuitScene;

impl SceneBuilder for CircuitScene {
    fn bounds(&self, _params: &ParameterStore) -> Bounds {
        ((0.0, 700.0), (0.0, LAYOUT_H))
    }

    fn build(&self, ctx: &FrameContext<'_>) -> Scene {
        let mut scene = Scene::new();
        let m = ctx.mapper;
        let px = |x: f64, y: f64| m.to_pixel(layout(x, y));

        let wire: Vec<NVec2> = LOOP.iter().map(|&(x, y)| px(x, y)).collect();
        scene.path(Layer::Static, wire.clone(), true, Style::stroke(Color::SLATE, 3.0));

        // battery: long and short plates
        let plate = Style::stroke(Color::SLATE, 4.0);
        scene.line(Layer::Static, px(85.0, 245.0), px(115.0, 245.0), plate);
        scene.line(Layer::Static, px(92.0, 255.0), px(108.0, 255.0), plate);

        // resistor zigzag across the top wire
        let zigzag = (0..=8)
            .map(|i| {
                let x = 260.0 + 10.0 * i as f64;
                let y = if i == 0 || i == 8 { 100.0 } else if i % 2 == 1 { 90.0 } else { 110.0 };
                px(x, y)
            })
            .collect();
        scene.path(Layer::Static, zigzag, false, Style::stroke(Color::hex(0xb45309), 3.0));

        let closed = ctx.params.value(SWITCH) >= 0.5;
        let lever_end = if closed { px(480.0, 200.0) } else { px(475.0, 170.0) };
        scene.line(Layer::Static, px(420.0, 200.0), lever_end, Style::stroke(Color::SLATE, 4.0));
        scene.circle(Layer::Static, px(420.0, 200.0), 4.0, Style::fill(Color::SLATE));

        let bulb = px(600.0, 150.0);
        for (label, at) in [("Battery", px(70.0, 270.0)), ("Resistor", px(265.0, 80.0)), ("Switch", px(420.0, 175.0)), ("Bulb", px(575.0, 215.0))] {
            scene.text(Layer::Overlay, at, label, Anchor::Start);
        }

        let Some(state) = ctx.evaluation.state() else {
            scene.circle(Layer::Dynamic, bulb, 20.0, Style::stroke(Color::SLATE, 2.0));
            undefined_notice(&mut scene, m, ctx.evaluation);
            return scene;
        };

        let brightness = state.value("brightness");
        scene.glow(Layer::Dynamic, bulb, 40.0 + 30.0 * brightness, Color::hex(0xfde047), brightness);
        scene.circle(
            Layer::Dynamic,
            bulb,
            20.0,
            Style::stroke(Color::SLATE, 2.0).filled(Color::hex(0xfef08a).with_alpha(0.2 + 0.8 * brightness)),
        );

        if state.value("switch_closed") >= 0.5 {
            let drift = state.value("carrier_drift");
            for i in 0..CARRIERS {
                let fraction = i as f64 / CARRIERS as f64 + drift;
                if let Some(p) = point_along(&wire, fraction) {
                    scene.glow(Layer::Dynamic, p, 6.0, Color::hex(0x60a5fa), 1.0);
                    scene.circle(Layer::Dynamic, p, 3.0, Style::fill(Color::hex(0x1d4ed8)));
                }
            }
        }

        let readout = format!(
            "V = {:.0} V   R = {:.0} Ω   I = {:.1} mA   P = {:.3} W   drift {:.3} loops/s",
            ctx.params.value(VOLTAGE),
            ctx.params.value(RESISTANCE),
            state.value("current_ma"),
            state.value("power_w"),
            CARRIER_RATE * state.value("current_ma"),
        );
        scene.text(Layer::Overlay, NVec2::new(m.plot_area().0.x, m.plot_area().1.y + 20.0), readout, Anchor::Start);
        scene
    }
}
