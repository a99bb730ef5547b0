//! Bevy 2D viewer
//!
//! The scenario lives in the app as a `Resource`. Each Bevy update ticks its
//! frame queue with the real frame delta and renders through gizmos, which
//! are immediate mode: when no simulation frame ran (paused, completed) the
//! last evaluation is redrawn instead.
//!
//! Keys: Space start/pause, R reset, Tab next parameter, arrows adjust it,
//! D restores defaults. Text is not drawn; announcements and readouts go to
//! the log.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::{WindowOccluded, WindowResolution};

use crate::simulation::clock::ClockState;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::NVec2;
use crate::visualization::renderer::{DrawingSurface, GradientStop};
use crate::visualization::scene::{Anchor, Color as SceneColor, Style};

/// Concentric rings used to approximate fills and radial gradients
const FILL_RINGS: usize = 6;

pub fn run_2d(scenario: Scenario) {
    let geometry = *scenario.component.mapper().geometry();
    tracing::info!(model = scenario.component.name(), "starting Bevy 2D viewer");

    App::new()
        .insert_resource(scenario)
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "labsim".into(),
                        resolution: WindowResolution::new(geometry.width_px as f32, geometry.height_px as f32),
                        ..default()
                    }),
                    ..default()
                })
                // tracing is already initialised by the binary
                .disable::<LogPlugin>(),
        )
        .insert_resource(ClearColor(Color::WHITE))
        .add_systems(Startup, setup_camera_system)
        .add_systems(Update, (visibility_system, input_system, frame_system).chain())
        .run();
}

fn setup_camera_system(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

/// Occluded or minimized windows pause the simulation
fn visibility_system(mut events: EventReader<WindowOccluded>, mut scenario: ResMut<Scenario>) {
    let Scenario { component, frames, .. } = &mut *scenario;
    for event in events.read() {
        component.set_visible(!event.occluded, frames);
    }
}

fn input_system(keys: Res<ButtonInput<KeyCode>>, mut scenario: ResMut<Scenario>, mut selected: Local<usize>) {
    let Scenario { component, frames, .. } = &mut *scenario;

    if keys.just_pressed(KeyCode::Space) {
        if component.clock_state() == ClockState::Running {
            component.pause(frames);
        } else {
            component.start(frames);
        }
    }
    if keys.just_pressed(KeyCode::KeyR) {
        component.reset(frames);
    }
    if keys.just_pressed(KeyCode::KeyD) {
        component.reset_parameters(frames);
    }

    let count = component.parameters().len();
    if count == 0 {
        return;
    }
    if keys.just_pressed(KeyCode::Tab) {
        *selected = (*selected + 1) % count;
        if let Some(p) = component.parameters().iter().nth(*selected) {
            tracing::info!(target: "a11y", "Selected {}", p.label);
        }
    }

    let direction = if keys.just_pressed(KeyCode::ArrowUp) || keys.just_pressed(KeyCode::ArrowRight) {
        1.0
    } else if keys.just_pressed(KeyCode::ArrowDown) || keys.just_pressed(KeyCode::ArrowLeft) {
        -1.0
    } else {
        return;
    };
    let Some((key, target)) = component
        .parameters()
        .iter()
        .nth(*selected % count)
        .map(|p| (p.key, p.value + direction * p.step))
    else {
        return;
    };
    if let Err(e) = component.set_parameter(key, target, frames) {
        tracing::warn!(error = %e, "parameter change rejected");
    }
}

fn frame_system(mut scenario: ResMut<Scenario>, time: Res<Time>, mut gizmos: Gizmos) {
    let geometry = *scenario.component.mapper().geometry();
    let mut surface = GizmoSurface::new(&mut gizmos, geometry.width_px, geometry.height_px);

    let outcomes = scenario.tick(time.delta_seconds() as f64, &mut surface);
    if !outcomes.iter().any(|o| o.rendered()) {
        scenario.component.redraw(&mut surface);
    }
}

/// Gizmo-backed surface
///
/// Scene pixels have their origin top-left with y down; the 2D camera is
/// centered with y up.
struct GizmoSurface<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
    width: f64,
    height: f64,
}

impl<'a, 'w, 's> GizmoSurface<'a, 'w, 's> {
    fn new(gizmos: &'a mut Gizmos<'w, 's>, width: f64, height: f64) -> Self {
        Self { gizmos, width, height }
    }

    fn world(&self, p: NVec2) -> Vec2 {
        Vec2::new((p.x - 0.5 * self.width) as f32, (0.5 * self.height - p.y) as f32)
    }

    fn segment(&mut self, from: NVec2, to: NVec2, color: Color, dash: Option<(f64, f64)>) {
        let Some((on, off)) = dash.filter(|(on, off)| *on > 0.0 && *off >= 0.0) else {
            let (a, b) = (self.world(from), self.world(to));
            self.gizmos.line_2d(a, b, color);
            return;
        };
        let d = to - from;
        let len = d.norm();
        if len <= 0.0 {
            return;
        }
        let dir = d / len;
        let mut s = 0.0;
        while s < len {
            let e = (s + on).min(len);
            let (a, b) = (self.world(from + dir * s), self.world(from + dir * e));
            self.gizmos.line_2d(a, b, color);
            s = e + off;
        }
    }
}

fn bevy_color(c: SceneColor, opacity: f64) -> Color {
    let alpha = (c.a * opacity).clamp(0.0, 1.0) as f32;
    Color::srgba(c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0, alpha)
}

impl DrawingSurface for GizmoSurface<'_, '_, '_> {
    fn clear(&mut self, _width: f64, _height: f64) {
        // gizmos are cleared by Bevy every frame
    }

    fn circle(&mut self, center: NVec2, radius: f64, style: &Style) {
        let c = self.world(center);
        if let Some(fill) = style.fill {
            let color = bevy_color(fill, style.opacity);
            for ring in 1..=FILL_RINGS {
                let r = radius * ring as f64 / FILL_RINGS as f64;
                self.gizmos.circle_2d(c, r as f32, color);
            }
        }
        if let Some(stroke) = style.stroke {
            self.gizmos.circle_2d(c, radius as f32, bevy_color(stroke, style.opacity));
        }
    }

    fn line(&mut self, from: NVec2, to: NVec2, style: &Style) {
        if let Some(stroke) = style.stroke {
            self.segment(from, to, bevy_color(stroke, style.opacity), style.dash);
        }
    }

    fn path(&mut self, points: &[NVec2], closed: bool, style: &Style) {
        let Some(stroke) = style.stroke.or(style.fill) else {
            return;
        };
        let color = bevy_color(stroke, style.opacity);
        for pair in points.windows(2) {
            self.segment(pair[0], pair[1], color, style.dash);
        }
        if closed {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                self.segment(*last, *first, color, style.dash);
            }
        }
    }

    fn text(&mut self, _at: NVec2, content: &str, _size: f64, _color: SceneColor, _anchor: Anchor) {
        tracing::trace!(target: "labsim::viewer", "{content}");
    }

    fn radial_gradient(&mut self, center: NVec2, radius: f64, stops: &[GradientStop]) {
        let c = self.world(center);
        for ring in 0..FILL_RINGS {
            let offset = (ring as f64 + 0.5) / FILL_RINGS as f64;
            // nearest stop at or beyond this ring
            let Some(stop) = stops.iter().find(|s| s.offset >= offset).or(stops.last()) else {
                return;
            };
            self.gizmos.circle_2d(c, (radius * offset) as f32, bevy_color(stop.color, 1.0));
        }
    }
}
