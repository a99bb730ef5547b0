pub mod error;
pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use error::{SimError, SimResult};

pub use simulation::states::{Evaluation, ModelState, NVec2, Singularity, Wavefront};
pub use simulation::params::{ChangePolicy, ParamUpdate, ParameterStore, SimulationParameter};
pub use simulation::model::PhysicsModel;
pub use simulation::trace::{TraceBuffer, TracePolicy};
pub use simulation::frames::{FrameHandle, FrameQueue, FrameScheduler};
pub use simulation::clock::{ClockState, SimulationClock, TimeStep};
pub use simulation::announcer::{Announcer, MessageLog, TracingAnnouncer};
pub use simulation::component::{FrameOutcome, SimulationComponent};
pub use simulation::engine::Engine;
pub use simulation::scenario::{build_model, HeadlessReport, Scenario};

pub use configuration::config::{EngineConfig, ModelKind, ScenarioConfig, ViewportConfig};

pub use visualization::coords::{CoordinateMapper, LinearScale, ViewportGeometry};
pub use visualization::scene::{Anchor, Color, DrawCommand, Layer, Scene, Style};
pub use visualization::renderer::{DrawingSurface, RecordingSurface, RenderStats, SceneRenderer, SurfaceOp};
pub use visualization::scenes::{FrameContext, SceneBuilder};

#[cfg(feature = "viewer")]
pub use visualization::viewer2d::run_2d;

pub use benchmark::benchmark::{bench_models, bench_render};
