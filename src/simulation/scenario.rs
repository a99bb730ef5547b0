//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - the mounted simulation (`SimulationComponent`: model, scene builder,
//!   parameters with the scenario overrides applied, clock)
//! - the host frame queue that drives it
//!
//! With the `viewer` feature the scenario is inserted into Bevy as a
//! `Resource`; headless runs drive it directly with [`Scenario::run_headless`]

use crate::configuration::config::{ModelKind, ScenarioConfig};
use crate::error::SimResult;
use crate::simulation::announcer::{Announcer, TracingAnnouncer};
use crate::simulation::clock::ClockState;
use crate::simulation::component::{FrameOutcome, SimulationComponent};
use crate::simulation::engine::Engine;
use crate::simulation::frames::FrameQueue;
use crate::simulation::model::PhysicsModel;
use crate::simulation::models::{AcCircuit, Calorimetry, CarnotCycle, DcCircuit, Doppler, Projectile, Torque};
use crate::visualization::coords::ViewportGeometry;
use crate::visualization::renderer::DrawingSurface;
use crate::visualization::scenes::{
    AcCircuitScene, CalorimetryScene, CarnotScene, CircuitScene, DopplerScene, ProjectileScene, SceneBuilder, TorqueScene,
};

pub type ModelBox = Box<dyn PhysicsModel + Send + Sync>;
pub type BuilderBox = Box<dyn SceneBuilder + Send + Sync>;

/// Model and matching scene builder for one simulation kind
pub fn build_model(engine: &Engine) -> (ModelBox, BuilderBox) {
    match engine.model {
        ModelKind::Projectile => (Box::new(Projectile), Box::new(ProjectileScene)),
        ModelKind::DcCircuit => (Box::new(DcCircuit), Box::new(CircuitScene)),
        ModelKind::AcCircuit => (Box::new(AcCircuit), Box::new(AcCircuitScene)),
        ModelKind::Carnot => (Box::new(CarnotCycle), Box::new(CarnotScene)),
        ModelKind::Doppler => {
            let model = Doppler::default().with_max_fronts(engine.max_fronts);
            let scene = DopplerScene::for_model(&model);
            (Box::new(model), Box::new(scene))
        }
        ModelKind::Calorimetry => (Box::new(Calorimetry), Box::new(CalorimetryScene)),
        ModelKind::Torque => (Box::new(Torque), Box::new(TorqueScene)),
    }
}

/// Summary of a headless run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessReport {
    pub ticks: usize, // host ticks driven
    pub frames: usize, // frame callbacks that rendered
    pub final_time: f64, // simulation seconds
    pub state: ClockState,
}

/// Runtime bundle: one mounted simulation plus the host frame queue
///
/// In Bevy terms, this is inserted as a `Resource` and then read by the
/// input and frame systems of the viewer
#[cfg_attr(feature = "viewer", derive(bevy::prelude::Resource))]
pub struct Scenario {
    pub engine: Engine,
    pub component: SimulationComponent,
    pub frames: FrameQueue,
}

impl Scenario {
    /// Announcements go to the log
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        Self::build_with_announcer(cfg, Box::new(TracingAnnouncer))
    }

    pub fn build_with_announcer(cfg: ScenarioConfig, announcer: Box<dyn Announcer + Send + Sync>) -> SimResult<Self> {
        cfg.validate()?;

        // Engine (runtime) from EngineConfig
        let engine = Engine::from_config(&cfg.engine);

        let v = cfg.viewport;
        let viewport = ViewportGeometry::new(v.width, v.height, v.margin);

        let (model, builder) = build_model(&engine);
        let mut component =
            SimulationComponent::new(model, builder, engine.time_step, viewport, announcer)?.with_max_runtime(engine.max_runtime);
        component.apply_overrides(&cfg.parameters)?;

        Ok(Self {
            engine,
            component,
            frames: FrameQueue::new(),
        })
    }

    /// One host tick: run every frame callback that is due
    pub fn tick(&mut self, wall_dt: f64, surface: &mut dyn DrawingSurface) -> Vec<FrameOutcome> {
        self.frames
            .tick()
            .into_iter()
            .map(|handle| self.component.on_frame(handle, wall_dt, &mut self.frames, surface))
            .collect()
    }

    /// Start the clock and drive up to `max_ticks` ticks of `wall_dt` seconds
    ///
    /// Stops early once nothing is scheduled (completed or auto-paused).
    pub fn run_headless(&mut self, max_ticks: usize, wall_dt: f64, surface: &mut dyn DrawingSurface) -> HeadlessReport {
        self.component.start(&mut self.frames);

        let mut ticks = 0;
        let mut frames = 0;
        while ticks < max_ticks && self.frames.pending() > 0 {
            let outcomes = self.tick(wall_dt, surface);
            frames += outcomes.iter().filter(|o| o.rendered()).count();
            ticks += 1;
        }

        let report = HeadlessReport {
            ticks,
            frames,
            final_time: self.component.time(),
            state: self.component.clock_state(),
        };
        tracing::info!(model = self.component.name(), ?report, "headless run finished");
        report
    }

    /// Unmount the simulation, cancelling its pending frame
    pub fn teardown(self) {
        let Scenario { component, mut frames, .. } = self;
        component.teardown(&mut frames);
    }
}
