use std::time::Instant;

use crate::configuration::config::ModelKind;
use crate::simulation::announcer::MessageLog;
use crate::simulation::clock::TimeStep;
use crate::simulation::component::SimulationComponent;
use crate::simulation::engine::{Engine, DEFAULT_MAX_FRONTS};
use crate::simulation::frames::FrameQueue;
use crate::simulation::params::ParameterStore;
use crate::simulation::scenario::build_model;
use crate::visualization::coords::ViewportGeometry;
use crate::visualization::renderer::RecordingSurface;

/// Engine settings for one benchmark run of `kind`
fn bench_engine(kind: ModelKind) -> Engine {
    Engine {
        model: kind,
        time_step: TimeStep::Fixed(1.0 / 60.0),
        max_runtime: None,
        max_fronts: DEFAULT_MAX_FRONTS,
    }
}

/// Time `evaluate` alone for every model
/// Paste output directly into a spreadsheet to graph
pub fn bench_models() {
    let evaluations = 100_000;

    println!("model,evaluations,us_per_eval");
    for kind in ModelKind::ALL {
        let (model, _) = build_model(&bench_engine(kind));
        let params = ParameterStore::new(model.parameters());

        // Warm up
        for i in 0..1000 {
            let _ = model.evaluate(&params, i as f64 * 0.001);
        }

        let t0 = Instant::now();
        let mut defined = 0usize;
        for i in 0..evaluations {
            // stay inside every horizon so the timing covers real work
            if model.evaluate(&params, (i % 1000) as f64 * 0.001).is_defined() {
                defined += 1;
            }
        }
        let us = t0.elapsed().as_secs_f64() * 1.0e6 / evaluations as f64;

        println!("{},{},{:.4}", model.name(), defined, us);
    }
}

/// Time full frames (evaluate, trace, build scene, render) per model
pub fn bench_render() {
    let frames = 2000;

    println!("model,frames,ms_per_frame,draw_calls_per_frame");
    for kind in ModelKind::ALL {
        let engine = bench_engine(kind);
        let (model, builder) = build_model(&engine);
        let viewport = ViewportGeometry::new(800.0, 500.0, 50.0);
        let component = SimulationComponent::new(model, builder, engine.time_step, viewport, Box::new(MessageLog::new()));
        let mut component = match component {
            Ok(c) => c,
            Err(e) => {
                println!("{kind:?},error,{e}");
                continue;
            }
        };

        let mut queue = FrameQueue::new();
        let mut surface = RecordingSurface::new();
        component.start(&mut queue);

        let t0 = Instant::now();
        let mut rendered = 0usize;
        while rendered < frames {
            let due = queue.tick();
            if due.is_empty() {
                // completed at its horizon: restart and keep going
                if !component.start(&mut queue) {
                    break;
                }
                continue;
            }
            for handle in due {
                if component.on_frame(handle, 1.0 / 60.0, &mut queue, &mut surface).rendered() {
                    rendered += 1;
                }
            }
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / rendered.max(1) as f64;
        let calls = surface.total_draw_calls() as f64 / surface.frames().max(1) as f64;

        println!("{},{},{:.4},{:.1}", component.name(), rendered, ms, calls);
        component.teardown(&mut queue);
    }
}
