//! Scene renderer and drawing surfaces
//!
//! The renderer is a read-only consumer of a [`Scene`]: it clears the
//! surface, then issues every command back-to-front. Commands with
//! non-finite coordinates are skipped and counted, never issued, because
//! some 2D backends corrupt their path state on NaN input.

use crate::simulation::states::NVec2;
use crate::visualization::scene::{opacity, Anchor, Color, DrawCommand, Scene, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64, // 0 at the center, 1 at the rim
    pub color: Color,
}

/// Minimal 2D surface the engine draws into
pub trait DrawingSurface {
    fn clear(&mut self, width: f64, height: f64);
    fn circle(&mut self, center: NVec2, radius: f64, style: &Style);
    fn line(&mut self, from: NVec2, to: NVec2, style: &Style);
    fn path(&mut self, points: &[NVec2], closed: bool, style: &Style);
    fn text(&mut self, at: NVec2, content: &str, size: f64, color: Color, anchor: Anchor);
    fn radial_gradient(&mut self, center: NVec2, radius: f64, stops: &[GradientStop]);
}

/// Counts from one render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub issued: usize, // commands drawn
    pub skipped: usize, // commands dropped for non-finite geometry
}

/// Half-angle of arrow heads, rad
const HEAD_ANGLE: f64 = 0.4;

#[derive(Debug, Clone, Copy)]
pub struct SceneRenderer {
    pub width: f64,
    pub height: f64,
}

impl SceneRenderer {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn render(&self, scene: &Scene, surface: &mut dyn DrawingSurface) -> RenderStats {
        surface.clear(self.width, self.height);

        let mut stats = RenderStats::default();
        for (_, command) in scene.ordered() {
            if !command.is_finite() {
                stats.skipped += 1;
                continue;
            }
            if self.issue(command, surface) {
                stats.issued += 1;
            } else {
                stats.skipped += 1;
            }
        }

        if stats.skipped > 0 {
            tracing::trace!(skipped = stats.skipped, "render skipped commands");
        }
        stats
    }

    /// Returns false when the command degenerates to nothing
    fn issue(&self, command: &DrawCommand, surface: &mut dyn DrawingSurface) -> bool {
        match command {
            DrawCommand::Circle { center, radius, style } => {
                if *radius <= 0.0 {
                    return false;
                }
                surface.circle(*center, *radius, style);
            }
            DrawCommand::Line { from, to, style } => surface.line(*from, *to, style),
            DrawCommand::Arrow { from, to, head, style } => {
                let d = to - from;
                let len = d.norm();
                if len < 1e-9 {
                    return false;
                }
                let head = head.min(0.5 * len);
                let angle = d.y.atan2(d.x);
                let barb = |a: f64| to - head * NVec2::new(a.cos(), a.sin());

                surface.line(*from, *to, style);
                surface.line(*to, barb(angle - HEAD_ANGLE), style);
                surface.line(*to, barb(angle + HEAD_ANGLE), style);
            }
            DrawCommand::Path { points, closed, style } => {
                if points.len() < 2 {
                    return false;
                }
                surface.path(points, *closed, style);
            }
            DrawCommand::Text { at, content, size, color, anchor } => {
                surface.text(*at, content, *size, *color, *anchor);
            }
            DrawCommand::GradientGlow { center, radius, color, intensity } => {
                let alpha = opacity(*intensity);
                if *radius <= 0.0 || alpha == 0.0 {
                    return false;
                }
                let stops = [
                    GradientStop { offset: 0.0, color: color.with_alpha(alpha) },
                    GradientStop { offset: 0.5, color: color.with_alpha(0.5 * alpha) },
                    GradientStop { offset: 1.0, color: color.with_alpha(0.0) },
                ];
                surface.radial_gradient(*center, *radius, &stops);
            }
        }
        true
    }
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Circle { center: NVec2, radius: f64 },
    Line { from: NVec2, to: NVec2, dashed: bool },
    Path { points: usize, closed: bool },
    Text { at: NVec2, content: String },
    RadialGradient { center: NVec2, radius: f64, peak_alpha: f64 },
}

/// Headless surface that records the calls of the current frame
///
/// `clear` starts a new frame; totals accumulate across frames so tests
/// can check that nothing was drawn after a cancellation.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    frames: usize,
    total_draw_calls: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls since the last clear
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Number of clears, i.e. frames rendered
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Draw calls across all frames, clears excluded
    pub fn total_draw_calls(&self) -> usize {
        self.total_draw_calls
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, op: SurfaceOp) {
        self.total_draw_calls += 1;
        self.ops.push(op);
    }
}

impl DrawingSurface for RecordingSurface {
    fn clear(&mut self, _width: f64, _height: f64) {
        self.ops.clear();
        self.frames += 1;
    }

    fn circle(&mut self, center: NVec2, radius: f64, _style: &Style) {
        self.record(SurfaceOp::Circle { center, radius });
    }

    fn line(&mut self, from: NVec2, to: NVec2, style: &Style) {
        self.record(SurfaceOp::Line { from, to, dashed: style.dash.is_some() });
    }

    fn path(&mut self, points: &[NVec2], closed: bool, _style: &Style) {
        self.record(SurfaceOp::Path { points: points.len(), closed });
    }

    fn text(&mut self, at: NVec2, content: &str, _size: f64, _color: Color, _anchor: Anchor) {
        self.record(SurfaceOp::Text { at, content: content.to_string() });
    }

    fn radial_gradient(&mut self, center: NVec2, radius: f64, stops: &[GradientStop]) {
        let peak_alpha = stops.iter().map(|s| s.color.a).fold(0.0, f64::max);
        self.record(SurfaceOp::RadialGradient { center, radius, peak_alpha });
    }
}
