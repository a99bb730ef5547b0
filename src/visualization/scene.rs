//! Draw-command vocabulary
//!
//! A [`Scene`] is a list of primitives in pixel space, each tagged with a
//! [`Layer`]. Scene builders produce scenes from model output; only the
//! renderer turns them into surface calls.

use crate::simulation::states::NVec2;
use crate::visualization::coords::CoordinateMapper;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64, // alpha in [0, 1]
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// 0xRRGGBB
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a: opacity(a), ..self }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const SLATE: Color = Color::hex(0x374151);
    pub const GRID: Color = Color::hex(0xe5e7eb);
    pub const AXIS: Color = Color::hex(0x6b7280);
    pub const BLUE: Color = Color::hex(0x3b82f6);
    pub const RED: Color = Color::hex(0xef4444);
    pub const GREEN: Color = Color::hex(0x22c55e);
    pub const AMBER: Color = Color::hex(0xf59e0b);
    pub const VIOLET: Color = Color::hex(0x8b5cf6);
}

/// Map a physical intensity onto an opacity
///
/// Monotonic, clamped to `[0, 1]`; NaN maps to fully transparent.
pub fn opacity(intensity: f64) -> f64 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}

/// `value` in `[lo, hi]` mapped linearly onto an opacity in `[base, base + span]`
pub fn ramp_opacity(value: f64, lo: f64, hi: f64, base: f64, span: f64) -> f64 {
    if !(hi > lo) {
        return opacity(base);
    }
    opacity(base + span * opacity((value - lo) / (hi - lo)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub width: f64,
    pub dash: Option<(f64, f64)>, // on, off lengths in px
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: None,
            fill: None,
            width: 1.0,
            dash: None,
            opacity: 1.0,
        }
    }
}

impl Style {
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            stroke: Some(color),
            width,
            ..Default::default()
        }
    }

    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Default::default()
        }
    }

    pub fn filled(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn dashed(mut self, on: f64, off: f64) -> Self {
        self.dash = Some((on, off));
        self
    }

    pub fn with_opacity(mut self, o: f64) -> Self {
        self.opacity = opacity(o);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Back-to-front draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Static,
    Dynamic,
    Overlay,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle { center: NVec2, radius: f64, style: Style },
    Arrow { from: NVec2, to: NVec2, head: f64, style: Style },
    Line { from: NVec2, to: NVec2, style: Style },
    Path { points: Vec<NVec2>, closed: bool, style: Style },
    Text { at: NVec2, content: String, size: f64, color: Color, anchor: Anchor },
    GradientGlow { center: NVec2, radius: f64, color: Color, intensity: f64 },
}

impl DrawCommand {
    /// True when every coordinate and length is finite
    pub fn is_finite(&self) -> bool {
        let pt = |p: &NVec2| p.x.is_finite() && p.y.is_finite();
        match self {
            DrawCommand::Circle { center, radius, .. } => pt(center) && radius.is_finite(),
            DrawCommand::Arrow { from, to, head, .. } => pt(from) && pt(to) && head.is_finite(),
            DrawCommand::Line { from, to, .. } => pt(from) && pt(to),
            DrawCommand::Path { points, .. } => points.iter().all(pt),
            DrawCommand::Text { at, .. } => pt(at),
            DrawCommand::GradientGlow { center, radius, intensity, .. } => {
                pt(center) && radius.is_finite() && !intensity.is_nan()
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    commands: Vec<(Layer, DrawCommand)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, layer: Layer, command: DrawCommand) -> &mut Self {
        self.commands.push((layer, command));
        self
    }

    /// Commands in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &(Layer, DrawCommand)> {
        self.commands.iter()
    }

    /// Commands back-to-front, insertion order kept within a layer
    pub fn ordered(&self) -> Vec<&(Layer, DrawCommand)> {
        let mut out: Vec<_> = self.commands.iter().collect();
        out.sort_by_key(|(layer, _)| *layer);
        out
    }

    pub fn circle(&mut self, layer: Layer, center: NVec2, radius: f64, style: Style) -> &mut Self {
        self.push(layer, DrawCommand::Circle { center, radius, style })
    }

    pub fn line(&mut self, layer: Layer, from: NVec2, to: NVec2, style: Style) -> &mut Self {
        self.push(layer, DrawCommand::Line { from, to, style })
    }

    pub fn arrow(&mut self, layer: Layer, from: NVec2, to: NVec2, style: Style) -> &mut Self {
        self.push(layer, DrawCommand::Arrow { from, to, head: 10.0, style })
    }

    pub fn path(&mut self, layer: Layer, points: Vec<NVec2>, closed: bool, style: Style) -> &mut Self {
        self.push(layer, DrawCommand::Path { points, closed, style })
    }

    pub fn text(&mut self, layer: Layer, at: NVec2, content: impl Into<String>, anchor: Anchor) -> &mut Self {
        self.push(
            layer,
            DrawCommand::Text {
                at,
                content: content.into(),
                size: 12.0,
                color: Color::SLATE,
                anchor,
            },
        )
    }

    pub fn glow(&mut self, layer: Layer, center: NVec2, radius: f64, color: Color, intensity: f64) -> &mut Self {
        self.push(layer, DrawCommand::GradientGlow { center, radius, color, intensity })
    }

    /// Gridlines at "nice" tick positions across the plot area
    pub fn grid(&mut self, mapper: &CoordinateMapper, target_ticks: usize) -> &mut Self {
        let (top_left, bottom_right) = mapper.plot_area();
        let style = Style::stroke(Color::GRID, 1.0);
        let (x0, x1) = mapper.x_scale().domain;
        let (y0, y1) = mapper.y_scale().domain;

        for x in nice_ticks(x0, x1, target_ticks).0 {
            let px = mapper.x_scale().apply(x);
            self.line(Layer::Background, NVec2::new(px, top_left.y), NVec2::new(px, bottom_right.y), style);
        }
        for y in nice_ticks(y0, y1, target_ticks).0 {
            let py = mapper.y_scale().apply(y);
            self.line(Layer::Background, NVec2::new(top_left.x, py), NVec2::new(bottom_right.x, py), style);
        }
        self
    }

    /// Bottom and left axes with tick labels and axis titles
    pub fn axes(&mut self, mapper: &CoordinateMapper, x_label: &str, y_label: &str, target_ticks: usize) -> &mut Self {
        let (top_left, bottom_right) = mapper.plot_area();
        let style = Style::stroke(Color::AXIS, 1.5);
        let origin = NVec2::new(top_left.x, bottom_right.y);

        self.line(Layer::Static, origin, NVec2::new(bottom_right.x, bottom_right.y), style);
        self.line(Layer::Static, origin, NVec2::new(top_left.x, top_left.y), style);

        let (x0, x1) = mapper.x_scale().domain;
        let (xs, x_step) = nice_ticks(x0, x1, target_ticks);
        for x in xs {
            let px = mapper.x_scale().apply(x);
            self.line(Layer::Static, NVec2::new(px, origin.y), NVec2::new(px, origin.y + 5.0), style);
            self.text(Layer::Overlay, NVec2::new(px, origin.y + 18.0), tick_label(x, x_step), Anchor::Middle);
        }

        let (y0, y1) = mapper.y_scale().domain;
        let (ys, y_step) = nice_ticks(y0, y1, target_ticks);
        for y in ys {
            let py = mapper.y_scale().apply(y);
            self.line(Layer::Static, NVec2::new(origin.x - 5.0, py), NVec2::new(origin.x, py), style);
            self.text(Layer::Overlay, NVec2::new(origin.x - 8.0, py + 4.0), tick_label(y, y_step), Anchor::End);
        }

        let mid_x = 0.5 * (top_left.x + bottom_right.x);
        self.text(Layer::Overlay, NVec2::new(mid_x, bottom_right.y + 34.0), x_label, Anchor::Middle);
        self.text(Layer::Overlay, NVec2::new(top_left.x, top_left.y - 10.0), y_label, Anchor::Start);
        self
    }
}

/// "Nice" tick values for an axis range, with the step used
pub fn nice_ticks(min: f64, max: f64, target_count: usize) -> (Vec<f64>, f64) {
    let range = max - min;
    if !(range.abs() > 1e-12) || !range.is_finite() || target_count == 0 {
        return (vec![], 1.0);
    }
    let rough_step = range / target_count as f64;
    let mag = 10f64.powf(rough_step.log10().floor());
    let normalized = rough_step / mag;
    let nice_step = if normalized < 1.5 {
        mag
    } else if normalized < 3.5 {
        mag * 2.0
    } else if normalized < 7.5 {
        mag * 5.0
    } else {
        mag * 10.0
    };

    let start = (min / nice_step).ceil() as i64;
    let end = (max / nice_step + 0.01).floor() as i64;
    let ticks = (start..=end).map(|i| i as f64 * nice_step).collect();
    (ticks, nice_step)
}

/// Tick label with as many decimals as the step needs
pub fn tick_label(v: f64, step: f64) -> String {
    if step >= 0.95 {
        format!("{:.0}", v)
    } else if step >= 0.095 {
        format!("{:.1}", v)
    } else if step >= 0.0095 {
        format!("{:.2}", v)
    } else {
        format!("{:.3}", v)
    }
}
