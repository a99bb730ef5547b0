//! One mounted simulation
//!
//! [`SimulationComponent`] ties together:
//! - a [`PhysicsModel`] and the [`SceneBuilder`] that draws it
//! - the [`ParameterStore`] the user edits
//! - the [`SimulationClock`] and the trace buffer it feeds
//! - a cached [`CoordinateMapper`], rebuilt when the plotted bounds move
//! - an [`Announcer`] receiving one message per user-visible change
//!
//! User operations never touch a drawing surface. Only [`SimulationComponent::on_frame`]
//! and [`SimulationComponent::redraw`] render.

use std::collections::BTreeMap;

use crate::error::{SimError, SimResult};
use crate::simulation::announcer::Announcer;
use crate::simulation::clock::{ClockState, SimulationClock, TimeStep};
use crate::simulation::frames::{FrameHandle, FrameScheduler};
use crate::simulation::model::PhysicsModel;
use crate::simulation::params::{ChangePolicy, ParamUpdate, ParameterStore};
use crate::simulation::states::{Evaluation, ModelState};
use crate::simulation::trace::TraceBuffer;
use crate::visualization::coords::{CoordinateMapper, ViewportGeometry};
use crate::visualization::renderer::{DrawingSurface, RenderStats, SceneRenderer};
use crate::visualization::scenes::{FrameContext, SceneBuilder};

/// What a frame callback did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Stale or cancelled handle, nothing evaluated or drawn
    Skipped,
    /// Drawn, next frame requested
    Rendered { t: f64, stats: RenderStats },
    /// Drawn at the horizon, clock is now `Completed`
    Completed { t: f64, stats: RenderStats },
    /// Drawn, then paused because the run exceeded its maximum runtime
    AutoPaused { t: f64, stats: RenderStats },
}

impl FrameOutcome {
    pub fn rendered(&self) -> bool {
        !matches!(self, FrameOutcome::Skipped)
    }
}

pub struct SimulationComponent {
    model: Box<dyn PhysicsModel + Send + Sync>,
    builder: Box<dyn SceneBuilder + Send + Sync>,
    params: ParameterStore,
    clock: SimulationClock,
    trace: TraceBuffer,
    viewport: ViewportGeometry, // size and margin, domain comes from the builder
    mapper: CoordinateMapper,
    renderer: SceneRenderer,
    announcer: Box<dyn Announcer + Send + Sync>,
    last: Evaluation, // most recent evaluation, drawn by redraw()
    visible: bool,
}

impl SimulationComponent {
    pub fn new(
        model: Box<dyn PhysicsModel + Send + Sync>,
        builder: Box<dyn SceneBuilder + Send + Sync>,
        step: TimeStep,
        viewport: ViewportGeometry,
        announcer: Box<dyn Announcer + Send + Sync>,
    ) -> SimResult<Self> {
        let params = ParameterStore::new(model.parameters());
        let mapper = fit_mapper(builder.as_ref(), &params, viewport)?;
        let trace = model.trace_policy().map(TraceBuffer::new).unwrap_or_else(TraceBuffer::disabled);
        let mut clock = SimulationClock::new(step);
        clock.set_horizon(model.horizon(&params));
        let last = model.evaluate(&params, 0.0);

        tracing::info!(model = model.name(), params = params.len(), "simulation mounted");
        Ok(Self {
            model,
            builder,
            params,
            clock,
            trace,
            viewport,
            mapper,
            renderer: SceneRenderer::new(viewport.width_px, viewport.height_px),
            announcer,
            last,
            visible: true,
        })
    }

    pub fn with_max_runtime(mut self, max_runtime: Option<f64>) -> Self {
        self.clock.set_max_runtime(max_runtime);
        self
    }

    /// Apply scenario overrides and make them the new defaults
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, f64>) -> SimResult<()> {
        for (key, value) in overrides {
            let update = self.params.set(key, *value)?;
            if update.value != *value {
                tracing::warn!(key = key.as_str(), requested = value, applied = update.value, "override clamped to range");
            }
        }
        self.params.commit_defaults();
        self.refresh();
        Ok(())
    }

    // ----- accessors -----

    pub fn name(&self) -> &'static str {
        self.model.name()
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.last
    }

    pub fn state(&self) -> Option<&ModelState> {
        self.last.state()
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    // ----- user operations -----

    /// Start, resume, or restart after completion
    ///
    /// Starting from Idle or Completed seeds the trace with the t = 0 state.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        let from = self.clock.state();
        if !self.clock.start(scheduler) {
            return false;
        }
        // a fresh run records its t = 0 state so trails start at the origin
        if matches!(from, ClockState::Idle | ClockState::Completed) {
            self.trace.clear();
            self.last = self.model.evaluate(&self.params, self.clock.time());
            if let Some(state) = self.last.state() {
                self.trace.record(state);
            }
        }
        let message = if from == ClockState::Paused { "Simulation resumed" } else { "Simulation started" };
        self.announcer.announce(message);
        true
    }

    pub fn pause(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if !self.clock.pause(scheduler) {
            return false;
        }
        self.announcer.announce("Simulation paused");
        true
    }

    /// Back to time zero, trace cleared, parameters kept
    pub fn reset(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.rewind(scheduler);
        self.announcer.announce("Simulation reset");
    }

    /// Jump to `t`; returns the time actually applied
    pub fn seek(&mut self, t: f64) -> f64 {
        let t = self.clock.seek(t);
        self.trace.clear();
        self.last = self.model.evaluate(&self.params, t);
        self.announcer.announce(&format!("Time set to {t:.2} seconds"));
        t
    }

    /// Set one parameter by key
    ///
    /// Rejected while running if the parameter is locked. On a real change the
    /// model's [`ChangePolicy`] decides whether the clock resets. Every accepted
    /// call announces the new value, even when clamping left it unchanged.
    pub fn set_parameter(&mut self, key: &str, value: f64, scheduler: &mut dyn FrameScheduler) -> SimResult<ParamUpdate> {
        let param = self.params.get(key).ok_or_else(|| SimError::UnknownParameter(key.to_string()))?;
        if param.locked_while_running && self.clock.is_running() {
            return Err(SimError::ParameterLocked { key: key.to_string() });
        }

        let update = self.params.set(key, value)?;
        if update.changed() {
            tracing::debug!(key, previous = update.previous, value = update.value, "parameter changed");
            if self.model.change_policy() == ChangePolicy::Reset {
                self.rewind(scheduler);
            }
            self.refresh();
        }

        if let Some(param) = self.params.get(key) {
            self.announcer.announce(&param.describe());
        }
        Ok(update)
    }

    /// Restore every default; returns true if anything changed
    pub fn reset_parameters(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        let changed = self.params.reset_to_defaults();
        if changed {
            if self.model.change_policy() == ChangePolicy::Reset {
                self.rewind(scheduler);
            }
            self.refresh();
        }
        self.announcer.announce("Parameters reset to defaults");
        changed
    }

    /// Host visibility; hiding a running simulation pauses it and it stays paused
    pub fn set_visible(&mut self, visible: bool, scheduler: &mut dyn FrameScheduler) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if !visible && self.clock.pause(scheduler) {
            tracing::info!(model = self.model.name(), t = self.clock.time(), "paused while hidden");
            self.announcer.announce("Simulation paused while hidden");
        }
    }

    /// New viewport size; the mapper and renderer follow
    pub fn resize(&mut self, width_px: f64, height_px: f64) -> SimResult<()> {
        let viewport = ViewportGeometry::new(width_px, height_px, self.viewport.margin_px);
        self.mapper = fit_mapper(self.builder.as_ref(), &self.params, viewport)?;
        self.viewport = viewport;
        self.renderer = SceneRenderer::new(width_px, height_px);
        Ok(())
    }

    // ----- frame loop -----

    /// Frame callback for `handle`
    ///
    /// Advances the clock, evaluates, records the trace and renders. Then
    /// either completes at the horizon, auto-pauses past the maximum runtime,
    /// or requests the next frame.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        wall_dt: f64,
        scheduler: &mut dyn FrameScheduler,
        surface: &mut dyn DrawingSurface,
    ) -> FrameOutcome {
        let Some(t) = self.clock.advance(handle, wall_dt) else {
            return FrameOutcome::Skipped;
        };

        let evaluation = self.model.evaluate(&self.params, t);
        if let (Some(prev), Some(next)) = (self.last.state(), evaluation.state()) {
            if let Some(message) = self.model.describe_transition(prev, next) {
                self.announcer.announce(&message);
            }
        }
        if let Some(state) = evaluation.state() {
            self.trace.record(state);
        }
        self.last = evaluation;
        let stats = self.redraw(surface);

        if self.clock.reached_horizon() {
            self.clock.complete(scheduler);
            self.announcer.announce("Simulation complete");
            return FrameOutcome::Completed { t, stats };
        }
        if self.clock.runtime_exceeded() {
            self.clock.pause(scheduler);
            tracing::info!(model = self.model.name(), t, "maximum runtime reached");
            self.announcer.announce("Simulation paused after reaching its maximum run time");
            return FrameOutcome::AutoPaused { t, stats };
        }

        self.clock.schedule(scheduler);
        FrameOutcome::Rendered { t, stats }
    }

    /// Draw the latest evaluation without advancing time
    pub fn redraw(&self, surface: &mut dyn DrawingSurface) -> RenderStats {
        let ctx = FrameContext {
            evaluation: &self.last,
            trace: &self.trace,
            params: &self.params,
            mapper: &self.mapper,
        };
        let scene = self.builder.build(&ctx);
        self.renderer.render(&scene, surface)
    }

    /// Unmount: cancel the pending frame and drop everything
    pub fn teardown(self, scheduler: &mut dyn FrameScheduler) {
        tracing::info!(model = self.model.name(), t = self.clock.time(), "simulation unmounted");
        self.clock.teardown(scheduler);
    }

    // ----- internals -----

    fn rewind(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.clock.reset(scheduler);
        self.trace.clear();
        self.last = self.model.evaluate(&self.params, 0.0);
    }

    /// Re-derive everything that depends on parameters
    fn refresh(&mut self) {
        self.clock.set_horizon(self.model.horizon(&self.params));
        match fit_mapper(self.builder.as_ref(), &self.params, self.viewport) {
            Ok(mapper) => {
                if mapper.geometry() != self.mapper.geometry() {
                    self.mapper = mapper;
                }
            }
            Err(e) => tracing::warn!(error = %e, "keeping previous coordinate mapping"),
        }
        self.last = self.model.evaluate(&self.params, self.clock.time());
    }
}

fn fit_mapper(builder: &dyn SceneBuilder, params: &ParameterStore, viewport: ViewportGeometry) -> SimResult<CoordinateMapper> {
    let (x_domain, y_domain) = builder.bounds(params);
    let mut geometry = viewport.with_domain(x_domain, y_domain);
    if builder.equal_aspect() {
        geometry = geometry.equal_aspect();
    }
    CoordinateMapper::new(geometry)
}
