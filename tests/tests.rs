use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use approx::assert_relative_eq;

use labsim::simulation::models::carnot::{CycleGeometry, CYCLE_PERIOD};
use labsim::simulation::models::{equilibrium_temperature, Doppler, Impedance, Launch};
use labsim::visualization::scene::{nice_ticks, opacity, ramp_opacity};
use labsim::{
    build_model, ClockState, Color, CoordinateMapper, DrawCommand, DrawingSurface, Engine, Evaluation, FrameOutcome,
    FrameQueue, FrameScheduler, Layer, MessageLog, ModelKind, ModelState, ParameterStore, RecordingSurface, Scenario,
    ScenarioConfig, Scene, SceneRenderer, SimError, SimulationComponent, SimulationParameter, Singularity, Style,
    SurfaceOp, TimeStep, TraceBuffer, TracePolicy, ViewportGeometry,
};
use labsim::{NVec2, PhysicsModel};

/// Engine settings for a test run of `kind`
pub fn test_engine(kind: ModelKind, step: TimeStep) -> Engine {
    Engine {
        model: kind,
        time_step: step,
        max_runtime: None,
        max_fronts: 10,
    }
}

/// Mount a simulation with a shared message log and a fresh frame queue
pub fn mount(kind: ModelKind, step: TimeStep) -> (SimulationComponent, FrameQueue, MessageLog) {
    let engine = test_engine(kind, step);
    let (model, builder) = build_model(&engine);
    let log = MessageLog::new();
    let viewport = ViewportGeometry::new(800.0, 500.0, 50.0);
    let component = SimulationComponent::new(model, builder, step, viewport, Box::new(log.clone()))
        .expect("default parameters always mount");
    (component, FrameQueue::new(), log)
}

/// Default parameter store of `kind`
pub fn default_params(kind: ModelKind) -> ParameterStore {
    let (model, _) = build_model(&test_engine(kind, TimeStep::default()));
    ParameterStore::new(model.parameters())
}

/// Drive every due frame once, returning the outcomes
pub fn tick(component: &mut SimulationComponent, queue: &mut FrameQueue, wall_dt: f64, surface: &mut RecordingSurface) -> Vec<FrameOutcome> {
    queue
        .tick()
        .into_iter()
        .map(|h| component.on_frame(h, wall_dt, queue, surface))
        .collect()
}

// ==================================================================================
// Physics model tests
// ==================================================================================

#[test]
fn every_model_is_deterministic() {
    for kind in ModelKind::ALL {
        let (model, _) = build_model(&test_engine(kind, TimeStep::default()));
        let params = ParameterStore::new(model.parameters());
        for t in [0.0, 0.013, 0.5, 2.75] {
            assert_eq!(model.evaluate(&params, t), model.evaluate(&params, t), "{kind:?} at t = {t}");
        }
    }
}

#[test]
fn every_model_is_defined_at_defaults() {
    for kind in ModelKind::ALL {
        let (model, _) = build_model(&test_engine(kind, TimeStep::default()));
        let params = ParameterStore::new(model.parameters());
        let eval = model.evaluate(&params, 0.25);
        assert!(eval.is_defined(), "{kind:?} undefined at defaults: {eval:?}");
        assert!(eval.state().is_some_and(ModelState::is_finite));
    }
}

#[test]
fn projectile_reference_launch() {
    let launch = Launch::new(45.0, 25.0, 9.8).expect("positive gravity");

    assert_relative_eq!(launch.range(), 63.78, epsilon = 0.01);
    assert_relative_eq!(launch.max_height(), 15.94, epsilon = 0.01);
    assert_relative_eq!(launch.flight_time(), 3.61, epsilon = 0.01);

    // apex at half the flight time
    let apex = launch.position(0.5 * launch.flight_time());
    assert_relative_eq!(apex.y, launch.max_height(), epsilon = 1e-9);
    assert_relative_eq!(launch.velocity(0.5 * launch.flight_time()).y, 0.0, epsilon = 1e-9);
}

#[test]
fn projectile_never_goes_below_ground() {
    let launch = Launch::new(60.0, 30.0, 9.8).expect("positive gravity");
    for i in 0..=100 {
        let t = launch.flight_time() * 1.5 * i as f64 / 100.0;
        assert!(launch.position(t).y >= 0.0);
    }
    assert!(Launch::new(45.0, 25.0, 0.0).is_none());
}

#[test]
fn calorimetry_equal_masses_meet_halfway() {
    assert_relative_eq!(equilibrium_temperature(100.0, 80.0, 100.0, 20.0).unwrap_or(f64::NAN), 50.0);
    assert!(equilibrium_temperature(0.0, 80.0, 0.0, 20.0).is_none());
}

#[test]
fn calorimetry_conserves_heat() {
    let mut params = default_params(ModelKind::Calorimetry);
    let (model, _) = build_model(&test_engine(ModelKind::Calorimetry, TimeStep::default()));

    for (t1, m1, t2, m2) in [(80.0, 100.0, 20.0, 100.0), (95.0, 50.0, 5.0, 200.0), (30.0, 170.0, 40.0, 60.0)] {
        params.set("t_hot", t1).unwrap();
        params.set("m_hot", m1).unwrap();
        params.set("t_cold", t2).unwrap();
        params.set("m_cold", m2).unwrap();

        for t in [0.0, 0.7, 3.0, 10.0] {
            let eval = model.evaluate(&params, t);
            let state = eval.state().expect("defined");
            let t_eq = state.value("t_eq");

            // heat lost by the hot body equals heat gained by the cold one
            assert_relative_eq!(m1 * (t1 - t_eq), m2 * (t_eq - t2), epsilon = 1e-9);
            let lost = m1 * (t1 - state.value("t_hot"));
            let gained = m2 * (state.value("t_cold") - t2);
            assert_relative_eq!(lost, gained, epsilon = 1e-9);
        }
    }
}

#[test]
fn doppler_reference_frequencies() {
    let (ahead, behind) = Doppler::observed(500.0, 340.0, 0.3 * 340.0).expect("subsonic");
    assert_relative_eq!(ahead, 714.3, epsilon = 0.05);
    assert_relative_eq!(behind, 384.6, epsilon = 0.05);
}

#[test]
fn doppler_supersonic_source_is_undefined() {
    let result = Doppler::observed(500.0, 340.0, 340.0);
    assert!(matches!(result, Err(Singularity::SupersonicSource { .. })));
    assert!(Doppler::observed(500.0, 340.0, 400.0).is_err());
}

#[test]
fn doppler_keeps_only_recent_fronts() {
    let model = Doppler::default().with_max_fronts(4);
    let engine = test_engine(ModelKind::Doppler, TimeStep::default());
    let params = default_params(engine.model);

    let eval = model.evaluate(&params, 0.1);
    let state = eval.state().expect("defined");

    assert_eq!(state.fronts.len(), 4);
    assert_relative_eq!(state.value("fronts_emitted"), 51.0);
    // oldest first, so radii shrink along the list
    assert!(state.fronts.windows(2).all(|w| w[0].radius > w[1].radius));
    assert!(state.fronts.iter().all(|f| f.radius >= 0.0));
}

#[test]
fn carnot_efficiency_and_phases() {
    let cycle = CycleGeometry::new(600.0, 300.0).expect("valid reservoirs");
    assert_relative_eq!(cycle.efficiency(), 0.5);
    assert_relative_eq!(cycle.net_work(), 8.314 * 300.0 * 3f64.ln(), epsilon = 1e-9);

    // adiabats meet the isotherms at every corner
    for phase in 0..4 {
        let end = cycle.point(phase, 1.0);
        let next = cycle.point((phase + 1) % 4, 0.0);
        assert_relative_eq!(end.volume, next.volume, epsilon = 1e-9);
        assert_relative_eq!(end.pressure, next.pressure, epsilon = 1e-6);
    }

    let mut params = default_params(ModelKind::Carnot);
    let (model, _) = build_model(&test_engine(ModelKind::Carnot, TimeStep::default()));
    let phase = |p: &ParameterStore, t: f64| model.evaluate(p, t).state().map(|s| s.value("phase"));
    assert_eq!(phase(&params, 0.1 * CYCLE_PERIOD), Some(0.0));
    assert_eq!(phase(&params, 0.3 * CYCLE_PERIOD), Some(1.0));
    assert_eq!(phase(&params, 0.6 * CYCLE_PERIOD), Some(2.0));
    assert_eq!(phase(&params, 1.9 * CYCLE_PERIOD), Some(3.0));

    params.set("t_cold", 400.0).unwrap();
    params.set("t_hot", 400.0).unwrap();
    assert!(matches!(model.evaluate(&params, 1.0), Evaluation::Undefined { .. }));
}

#[test]
fn dc_circuit_switch_controls_current() {
    let mut params = default_params(ModelKind::DcCircuit);
    let (model, _) = build_model(&test_engine(ModelKind::DcCircuit, TimeStep::default()));

    let open = model.evaluate(&params, 1.0);
    assert_relative_eq!(open.state().expect("defined").value("current_ma"), 0.0);

    params.set("switch", 1.0).unwrap();
    let closed = model.evaluate(&params, 1.0);
    let state = closed.state().expect("defined");
    assert_relative_eq!(state.value("current_ma"), 90.0, epsilon = 1e-9);
    assert_relative_eq!(state.value("power_w"), 0.81, epsilon = 1e-9);
    assert_relative_eq!(state.value("brightness"), 0.9, epsilon = 1e-9);
    assert!((0.0..1.0).contains(&state.value("carrier_drift")));
}

#[test]
fn ac_impedance_never_below_resistance() {
    let imp = Impedance::new(50.0, 0.1, 100.0, 50.0).expect("valid circuit");
    assert_relative_eq!(imp.xl, imp.omega * 0.1, epsilon = 1e-12);
    assert_relative_eq!(imp.xc, 1.0 / (imp.omega * 100e-6), epsilon = 1e-12);
    assert!(imp.z >= 50.0);
    assert!(imp.phi.abs() < std::f64::consts::FRAC_PI_2);

    assert!(Impedance::new(50.0, 0.1, 0.0, 50.0).is_err());
}

#[test]
fn torque_follows_angle() {
    let mut params = default_params(ModelKind::Torque);
    let (model, _) = build_model(&test_engine(ModelKind::Torque, TimeStep::default()));

    let at = |p: &ParameterStore| model.evaluate(p, 0.0).state().map(|s| s.value("torque")).unwrap_or(f64::NAN);
    assert_relative_eq!(at(&params), 15.0, epsilon = 1e-9);

    params.set("angle", 30.0).unwrap();
    assert_relative_eq!(at(&params), 7.5, epsilon = 1e-9);

    params.set("angle", 180.0).unwrap();
    let state = model.evaluate(&params, 2.0);
    assert_relative_eq!(state.state().expect("defined").value("rotation"), 0.0);
}

// ==================================================================================
// Parameter store tests
// ==================================================================================

#[test]
fn parameter_clamps_and_snaps() {
    let mut params = default_params(ModelKind::Projectile);

    assert_relative_eq!(params.set("angle", 95.0).unwrap().value, 90.0);
    assert_relative_eq!(params.set("angle", -3.0).unwrap().value, 0.0);
    assert_relative_eq!(params.set("velocity", 12.6).unwrap().value, 13.0);
    assert_relative_eq!(params.set("gravity", 9.84).unwrap().value, 9.8);

    for p in params.iter() {
        assert!(p.min <= p.value && p.value <= p.max);
    }
}

#[test]
fn parameter_step_snap_is_anchored_at_min() {
    let p = SimulationParameter::new("lever_arm", "Lever arm", "meters", 0.3, 0.1, 0.8, 0.05);
    assert_relative_eq!(p.snap(0.33), 0.35);
    assert_relative_eq!(p.snap(0.81), 0.8);
    assert_eq!(p.decimals(), 2);
}

#[test]
fn parameter_rejects_unknown_and_non_finite() {
    let mut params = default_params(ModelKind::Projectile);
    assert_eq!(params.set("mass", 1.0), Err(SimError::UnknownParameter("mass".into())));
    assert!(matches!(params.set("angle", f64::NAN), Err(SimError::NonFiniteInput { .. })));
    assert_relative_eq!(params.value("angle"), 45.0);
    assert!(params.value("mass").is_nan());
}

#[test]
fn parameter_reset_restores_defaults() {
    let mut params = default_params(ModelKind::Torque);
    params.set("force", 120.0).unwrap();
    assert!(params.reset_to_defaults());
    assert_relative_eq!(params.value("force"), 50.0);
    assert!(!params.reset_to_defaults());
}

#[test]
fn set_parameter_announces_new_value() {
    let (mut sim, mut queue, log) = mount(ModelKind::Projectile, TimeStep::default());
    sim.set_parameter("angle", 30.0, &mut queue).unwrap();
    assert_eq!(log.last().as_deref(), Some("Launch angle set to 30 degrees"));

    sim.set_parameter("velocity", 12.6, &mut queue).unwrap();
    assert_eq!(log.last().as_deref(), Some("Initial velocity set to 13 m/s"));
    assert_eq!(log.len(), 2);
}

#[test]
fn locked_parameter_rejected_while_running() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Projectile, TimeStep::default());
    sim.start(&mut queue);

    let err = sim.set_parameter("angle", 30.0, &mut queue);
    assert_eq!(err, Err(SimError::ParameterLocked { key: "angle".into() }));
    assert_relative_eq!(sim.parameters().value("angle"), 45.0);
    assert_eq!(sim.clock_state(), ClockState::Running);

    sim.teardown(&mut queue);
}

#[test]
fn reset_policy_rewinds_clock() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Projectile, TimeStep::Fixed(0.1));
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);
    tick(&mut sim, &mut queue, 0.016, &mut surface);
    tick(&mut sim, &mut queue, 0.016, &mut surface);
    sim.pause(&mut queue);
    assert!(sim.time() > 0.0);

    sim.set_parameter("angle", 60.0, &mut queue).unwrap();
    assert_eq!(sim.clock_state(), ClockState::Idle);
    assert_eq!(sim.time(), 0.0);
    assert!(sim.trace().is_empty());
}

#[test]
fn continue_policy_keeps_running() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Torque, TimeStep::Fixed(0.1));
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);
    tick(&mut sim, &mut queue, 0.016, &mut surface);

    let before = sim.time();
    sim.set_parameter("force", 100.0, &mut queue).unwrap();
    assert_eq!(sim.clock_state(), ClockState::Running);
    assert_eq!(sim.time(), before);
    assert_relative_eq!(sim.state().expect("defined").value("torque"), 30.0, epsilon = 1e-9);

    // the next frame still arrives
    assert_eq!(tick(&mut sim, &mut queue, 0.016, &mut surface).len(), 1);
    sim.teardown(&mut queue);
}

#[test]
fn lever_arm_change_rescales_plot() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Torque, TimeStep::default());
    assert_relative_eq!(sim.mapper().y_scale().domain.1, 0.6, epsilon = 1e-9);

    sim.set_parameter("lever_arm", 0.6, &mut queue).unwrap();
    assert_relative_eq!(sim.mapper().y_scale().domain.1, 1.2, epsilon = 1e-9);
}

// ==================================================================================
// Clock and lifecycle tests
// ==================================================================================

#[test]
fn time_step_delta_never_negative() {
    let wall = TimeStep::WallClock { max_dt: 0.1 };
    assert_relative_eq!(wall.delta(0.016), 0.016);
    assert_relative_eq!(wall.delta(5.0), 0.1);
    assert_eq!(wall.delta(-1.0), 0.0);
    assert_eq!(wall.delta(f64::NAN), 0.0);
    assert_relative_eq!(TimeStep::Fixed(0.02).delta(99.0), 0.02);
}

#[test]
fn clock_time_is_monotonic_and_resets_to_zero() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Calorimetry, TimeStep::default());
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);

    let mut last = sim.time();
    for wall_dt in [0.016, -0.5, f64::NAN, 3.0, 0.0, 0.033] {
        tick(&mut sim, &mut queue, wall_dt, &mut surface);
        assert!(sim.time() >= last);
        last = sim.time();
    }
    assert!(last > 0.0);

    sim.reset(&mut queue);
    assert_eq!(sim.time(), 0.0);
    assert_eq!(sim.clock_state(), ClockState::Idle);
    assert!(sim.trace().is_empty());
}

#[test]
fn pause_freezes_and_resume_continues() {
    let (mut sim, mut queue, log) = mount(ModelKind::Torque, TimeStep::Fixed(0.1));
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);
    for _ in 0..3 {
        tick(&mut sim, &mut queue, 0.016, &mut surface);
    }
    assert!(sim.pause(&mut queue));
    assert!(!sim.pause(&mut queue));
    let frozen = sim.time();
    assert_relative_eq!(frozen, 0.3, epsilon = 1e-9);

    assert!(tick(&mut sim, &mut queue, 0.016, &mut surface).is_empty());
    assert_eq!(sim.time(), frozen);

    sim.start(&mut queue);
    tick(&mut sim, &mut queue, 0.016, &mut surface);
    assert_relative_eq!(sim.time(), 0.4, epsilon = 1e-9);
    assert_eq!(log.messages(), vec!["Simulation started", "Simulation paused", "Simulation resumed"]);

    sim.teardown(&mut queue);
}

#[test]
fn projectile_run_completes_on_landing() {
    let (mut sim, mut queue, log) = mount(ModelKind::Projectile, TimeStep::Fixed(0.05));
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);

    let mut outcomes = Vec::new();
    for _ in 0..200 {
        outcomes.extend(tick(&mut sim, &mut queue, 0.016, &mut surface));
    }

    assert!(matches!(outcomes.last(), Some(FrameOutcome::Completed { .. })));
    assert_eq!(sim.clock_state(), ClockState::Completed);
    assert_eq!(queue.pending(), 0);

    let state = sim.state().expect("defined");
    assert_relative_eq!(sim.time(), 3.6078, epsilon = 1e-3);
    assert_relative_eq!(state.value("x"), 63.78, epsilon = 0.01);
    assert_relative_eq!(state.value("y"), 0.0, epsilon = 1e-9);
    assert_eq!(log.last().as_deref(), Some("Simulation complete"));

    // trail stays within its cap
    assert!(sim.trace().len() <= sim.trace().capacity());
    assert!(!sim.trace().is_empty());

    // starting again from Completed restarts at zero with a fresh trail
    assert!(sim.start(&mut queue));
    assert_eq!(sim.time(), 0.0);
    assert_eq!(sim.trace().len(), 1);
    assert_eq!(sim.trace().latest().map(|s| s.t), Some(0.0));
    sim.teardown(&mut queue);
}

#[test]
fn seek_clamps_to_horizon_and_pauses() {
    let (mut sim, _queue, _log) = mount(ModelKind::Projectile, TimeStep::default());

    let t = sim.seek(1.0);
    assert_relative_eq!(t, 1.0);
    assert_eq!(sim.clock_state(), ClockState::Paused);
    let vx = 25.0 * 45f64.to_radians().cos();
    assert_relative_eq!(sim.state().expect("defined").value("x"), vx, epsilon = 1e-9);

    let t = sim.seek(100.0);
    assert_relative_eq!(t, 3.6078, epsilon = 1e-3);
    assert_eq!(sim.seek(-4.0), 0.0);
}

#[test]
fn max_runtime_auto_pauses() {
    let (sim, mut queue, log) = mount(ModelKind::Torque, TimeStep::default());
    let mut sim = sim.with_max_runtime(Some(0.5));
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);

    let mut outcomes = Vec::new();
    for _ in 0..10 {
        outcomes.extend(tick(&mut sim, &mut queue, 0.2, &mut surface));
    }

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[2], FrameOutcome::AutoPaused { .. }));
    assert_eq!(sim.clock_state(), ClockState::Paused);
    assert_eq!(queue.pending(), 0);
    assert!(log.last().is_some_and(|m| m.contains("maximum run time")));
}

#[test]
fn hidden_simulation_pauses_and_stays_paused() {
    let (mut sim, mut queue, log) = mount(ModelKind::DcCircuit, TimeStep::default());
    sim.start(&mut queue);

    sim.set_visible(false, &mut queue);
    assert_eq!(sim.clock_state(), ClockState::Paused);
    assert_eq!(queue.pending(), 0);
    assert_eq!(log.last().as_deref(), Some("Simulation paused while hidden"));

    sim.set_visible(true, &mut queue);
    assert!(sim.is_visible());
    assert_eq!(sim.clock_state(), ClockState::Paused);
}

#[test]
fn calorimetry_curves_start_at_initial_temperatures() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Calorimetry, TimeStep::default());
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);

    let mut outcomes = Vec::new();
    for _ in 0..700 {
        outcomes.extend(tick(&mut sim, &mut queue, 1.0 / 60.0, &mut surface));
    }
    assert!(matches!(outcomes.last(), Some(FrameOutcome::Completed { .. })));

    let first = sim.trace().iter().next().expect("trace recorded");
    assert_eq!(first.t, 0.0);
    assert_relative_eq!(first.value("t_hot"), 80.0, epsilon = 1e-9);
    assert_relative_eq!(first.value("t_cold"), 20.0, epsilon = 1e-9);
    assert!(sim.trace().len() <= sim.trace().capacity());
}

#[test]
fn carnot_phase_change_is_announced() {
    let (mut sim, mut queue, log) = mount(ModelKind::Carnot, TimeStep::Fixed(0.3 * CYCLE_PERIOD));
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);
    tick(&mut sim, &mut queue, 0.016, &mut surface);

    assert_eq!(log.messages(), vec!["Simulation started", "Phase 2: Adiabatic Expansion"]);
    sim.teardown(&mut queue);
}

// ==================================================================================
// Cancellation tests
// ==================================================================================

#[test]
fn stale_handle_draws_nothing() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Torque, TimeStep::default());
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);

    let handle = queue.tick()[0];
    assert!(sim.on_frame(handle, 0.016, &mut queue, &mut surface).rendered());
    let calls = surface.total_draw_calls();

    assert_eq!(sim.on_frame(handle, 0.016, &mut queue, &mut surface), FrameOutcome::Skipped);
    assert_eq!(surface.total_draw_calls(), calls);
    sim.teardown(&mut queue);
}

#[test]
fn no_draw_calls_after_reset() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Doppler, TimeStep::Fixed(0.0002));
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);
    tick(&mut sim, &mut queue, 0.016, &mut surface);
    assert_eq!(surface.frames(), 1);

    sim.reset(&mut queue);
    let calls = surface.total_draw_calls();
    for _ in 0..5 {
        assert!(tick(&mut sim, &mut queue, 0.016, &mut surface).is_empty());
    }
    assert_eq!(surface.total_draw_calls(), calls);
    assert_eq!(surface.frames(), 1);
    assert_eq!(queue.cancelled(), 1);
}

#[test]
fn no_frames_after_teardown() {
    let (mut sim, mut queue, _log) = mount(ModelKind::AcCircuit, TimeStep::Fixed(0.0002));
    let mut surface = RecordingSurface::new();
    sim.start(&mut queue);
    tick(&mut sim, &mut queue, 0.016, &mut surface);
    assert_eq!(queue.pending(), 1);

    sim.teardown(&mut queue);
    assert_eq!(queue.pending(), 0);
    assert!(queue.tick().is_empty());
}

#[test]
fn queue_runs_new_requests_next_tick() {
    let mut queue = FrameQueue::new();
    let a = queue.request_frame();
    let b = queue.request_frame();
    queue.cancel_frame(a);
    assert_eq!(queue.tick(), vec![b]);

    let c = queue.request_frame();
    assert!(queue.is_pending(c));
    assert_ne!(b, c);
}

// ==================================================================================
// Trace buffer tests
// ==================================================================================

#[test]
fn trace_never_exceeds_capacity() {
    let mut trace = TraceBuffer::new(TracePolicy::new(5, 0.0));
    for i in 0..20 {
        trace.record(&ModelState::at(i as f64));
        assert!(trace.len() <= 5);
    }
    assert_eq!(trace.len(), 5);
    assert_eq!(trace.iter().next().map(|s| s.t), Some(15.0));
    assert_eq!(trace.latest().map(|s| s.t), Some(19.0));
}

#[test]
fn trace_respects_spacing() {
    let mut trace = TraceBuffer::new(TracePolicy::new(50, 0.2));
    assert!(trace.record(&ModelState::at(0.0)));
    assert!(!trace.record(&ModelState::at(0.1)));
    assert!(trace.record(&ModelState::at(0.25)));
    assert_eq!(trace.len(), 2);

    let mut off = TraceBuffer::disabled();
    assert!(!off.record(&ModelState::at(1.0)));
}

// ==================================================================================
// Coordinate mapping tests
// ==================================================================================

#[test]
fn mapping_round_trip() {
    let geometry = ViewportGeometry::new(800.0, 500.0, 50.0).with_domain((0.0, 70.0), (0.0, 20.0));
    let mapper = CoordinateMapper::new(geometry).expect("valid geometry");

    for p in [NVec2::new(12.5, 7.3), NVec2::new(0.0, 0.0), NVec2::new(70.0, 20.0), NVec2::new(33.3, 0.01)] {
        let back = mapper.to_physical(mapper.to_pixel(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
    }

    // pixel -> physical -> pixel inside the plot area
    for px in [NVec2::new(50.0, 450.0), NVec2::new(400.0, 250.0), NVec2::new(750.0, 50.0), NVec2::new(123.4, 321.0)] {
        let back = mapper.to_pixel(mapper.to_physical(px));
        assert_relative_eq!(back.x, px.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, px.y, epsilon = 1e-9);
    }

    // y grows upward in physical space
    assert_eq!(mapper.to_pixel(NVec2::new(0.0, 0.0)), NVec2::new(50.0, 450.0));
    assert_eq!(mapper.to_pixel(NVec2::new(70.0, 20.0)), NVec2::new(750.0, 50.0));
    assert!(mapper.to_pixel(NVec2::new(0.0, 10.0)).y < mapper.to_pixel(NVec2::new(0.0, 5.0)).y);

    let clamped = mapper.to_pixel_clamped(NVec2::new(-10.0, 99.0));
    assert_eq!(clamped, NVec2::new(50.0, 50.0));
}

#[test]
fn mapping_rejects_degenerate_input() {
    let flat = ViewportGeometry::new(800.0, 500.0, 50.0).with_domain((1.0, 1.0), (0.0, 1.0));
    assert!(matches!(CoordinateMapper::new(flat), Err(SimError::DegenerateDomain { axis: "x", .. })));

    let inverted = ViewportGeometry::new(800.0, 500.0, 50.0).with_domain((0.0, 1.0), (2.0, -2.0));
    assert!(matches!(CoordinateMapper::new(inverted), Err(SimError::DegenerateDomain { axis: "y", .. })));

    let tiny = ViewportGeometry::new(80.0, 500.0, 50.0);
    assert!(matches!(CoordinateMapper::new(tiny), Err(SimError::InvalidViewport { .. })));
}

#[test]
fn equal_aspect_keeps_units_square() {
    let geometry = ViewportGeometry::new(800.0, 500.0, 50.0)
        .with_domain((-1.0, 1.0), (-1.0, 1.0))
        .equal_aspect();
    let mapper = CoordinateMapper::new(geometry).expect("valid geometry");
    assert_relative_eq!(mapper.x_scale().factor(), mapper.y_scale().factor(), epsilon = 1e-9);
}

// ==================================================================================
// Rendering tests
// ==================================================================================

#[test]
fn renderer_skips_non_finite_commands() {
    let mut scene = Scene::new();
    scene.circle(Layer::Dynamic, NVec2::new(f64::NAN, 10.0), 5.0, Style::fill(Color::RED));
    scene.line(Layer::Static, NVec2::new(0.0, 0.0), NVec2::new(10.0, 10.0), Style::stroke(Color::SLATE, 1.0));
    scene.glow(Layer::Dynamic, NVec2::new(5.0, 5.0), f64::INFINITY, Color::BLUE, 0.5);

    let mut surface = RecordingSurface::new();
    let stats = SceneRenderer::new(100.0, 100.0).render(&scene, &mut surface);

    assert_eq!(stats.issued, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(surface.ops().len(), 1);
}

#[test]
fn renderer_orders_layers_back_to_front() {
    let mut scene = Scene::new();
    scene.text(Layer::Overlay, NVec2::new(1.0, 1.0), "label", labsim::Anchor::Start);
    scene.circle(Layer::Dynamic, NVec2::new(2.0, 2.0), 3.0, Style::fill(Color::BLUE));
    scene.circle(Layer::Background, NVec2::new(4.0, 4.0), 3.0, Style::fill(Color::GRID));

    let mut surface = RecordingSurface::new();
    SceneRenderer::new(100.0, 100.0).render(&scene, &mut surface);

    let ops = surface.ops();
    assert!(matches!(ops[0], SurfaceOp::Circle { center, .. } if center == NVec2::new(4.0, 4.0)));
    assert!(matches!(ops[1], SurfaceOp::Circle { center, .. } if center == NVec2::new(2.0, 2.0)));
    assert!(matches!(ops[2], SurfaceOp::Text { .. }));
}

#[test]
fn arrow_is_shaft_plus_two_barbs() {
    let mut scene = Scene::new();
    scene.arrow(Layer::Dynamic, NVec2::new(0.0, 0.0), NVec2::new(50.0, 0.0), Style::stroke(Color::RED, 2.0));
    scene.arrow(Layer::Dynamic, NVec2::new(5.0, 5.0), NVec2::new(5.0, 5.0), Style::stroke(Color::RED, 2.0));

    let mut surface = RecordingSurface::new();
    let stats = SceneRenderer::new(100.0, 100.0).render(&scene, &mut surface);

    assert_eq!(surface.ops().len(), 3);
    assert!(surface.ops().iter().all(|op| matches!(op, SurfaceOp::Line { .. })));
    assert_eq!(stats.skipped, 1);
}

#[test]
fn opacity_is_clamped_and_monotonic() {
    assert_eq!(opacity(f64::NAN), 0.0);
    assert_eq!(opacity(-1.0), 0.0);
    assert_eq!(opacity(2.0), 1.0);

    let samples: Vec<f64> = (0..=20).map(|i| ramp_opacity(i as f64 * 5.0, 0.0, 100.0, 0.3, 0.5)).collect();
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    assert_relative_eq!(samples[0], 0.3);
    assert_relative_eq!(samples[20], 0.8);
}

#[test]
fn nice_ticks_cover_the_range() {
    let (ticks, step) = nice_ticks(0.0, 70.0, 8);
    assert_relative_eq!(step, 10.0);
    assert_eq!(ticks.len(), 8);
    assert!(nice_ticks(1.0, 1.0, 8).0.is_empty());
}

#[test]
fn undefined_state_draws_only_a_notice() {
    let (mut sim, mut queue, _log) = mount(ModelKind::Carnot, TimeStep::default());
    sim.set_parameter("t_cold", 400.0, &mut queue).unwrap();
    sim.set_parameter("t_hot", 400.0, &mut queue).unwrap();
    assert!(!sim.evaluation().is_defined());

    let mut surface = RecordingSurface::new();
    let stats = sim.redraw(&mut surface);
    assert_eq!(stats.skipped, 0);
    assert!(surface.texts().iter().any(|t| t.starts_with("Undefined")));
    assert!(!surface.ops().iter().any(|op| matches!(op, SurfaceOp::RadialGradient { .. })));
}

#[test]
fn every_scene_renders_finite_geometry() {
    for kind in ModelKind::ALL {
        let (mut sim, mut queue, _log) = mount(kind, TimeStep::Fixed(0.01));
        let mut surface = RecordingSurface::new();
        sim.set_parameter("switch", 1.0, &mut queue).ok();
        sim.start(&mut queue);
        for _ in 0..5 {
            for outcome in tick(&mut sim, &mut queue, 0.016, &mut surface) {
                if let FrameOutcome::Rendered { stats, .. } = outcome {
                    assert!(stats.issued > 0, "{kind:?} drew nothing");
                }
            }
        }
        assert!(surface.frames() > 0, "{kind:?} never rendered");
        sim.teardown(&mut queue);
    }
}

#[test]
fn recording_surface_counts_frames() {
    let mut surface = RecordingSurface::new();
    surface.clear(10.0, 10.0);
    surface.circle(NVec2::new(1.0, 1.0), 1.0, &Style::default());
    surface.clear(10.0, 10.0);
    assert_eq!(surface.frames(), 2);
    assert_eq!(surface.total_draw_calls(), 1);
    assert!(surface.ops().is_empty());
}

#[test]
fn draw_command_finiteness() {
    let ok = DrawCommand::Line {
        from: NVec2::new(0.0, 0.0),
        to: NVec2::new(1.0, 1.0),
        style: Style::default(),
    };
    let bad = DrawCommand::Path {
        points: vec![NVec2::new(0.0, 0.0), NVec2::new(f64::NAN, 1.0)],
        closed: false,
        style: Style::default(),
    };
    assert!(ok.is_finite());
    assert!(!bad.is_finite());
}

// ==================================================================================
// Configuration tests
// ==================================================================================

#[test]
fn scenario_yaml_parses() {
    let text = r#"
engine:
  model: doppler
  time_step: !fixed 0.0002
  max_fronts: 6
viewport:
  width: 640
  height: 320
  margin: 20
parameters:
  source_speed: 0.5
"#;
    let cfg = ScenarioConfig::from_yaml_str(text).expect("valid scenario");
    assert_eq!(cfg.engine.model, ModelKind::Doppler);
    assert_eq!(cfg.engine.time_step, TimeStep::Fixed(0.0002));
    assert_eq!(cfg.engine.max_runtime, Some(300.0));
    assert_eq!(cfg.engine.max_fronts, Some(6));
    assert_eq!(cfg.parameters.get("source_speed"), Some(&0.5));

    let scenario = Scenario::build_scenario(cfg).expect("builds");
    assert_eq!(scenario.engine.max_fronts, 6);
    assert_relative_eq!(scenario.component.parameters().value("source_speed"), 0.5);
    // overrides become the defaults
    assert_relative_eq!(scenario.component.parameters().get("source_speed").map(|p| p.default).unwrap_or(f64::NAN), 0.5);
}

#[test]
fn scenario_yaml_documented_format_parses() {
    let text = r#"
engine:
  model: projectile       # projectile | dc_circuit | ac_circuit | carnot | doppler | calorimetry | torque
  time_step: !wall_clock  # or `!fixed 0.0002` for a constant step
    max_dt: 0.1           # clamp on a single frame's wall delta
  max_runtime: 300.0      # auto-pause after this many wall seconds, null = never

viewport:
  width: 800
  height: 500
  margin: 50

parameters:
  angle: 45
  velocity: 25
"#;
    let cfg = ScenarioConfig::from_yaml_str(text).expect("documented scenario parses");
    assert_eq!(cfg.engine.model, ModelKind::Projectile);
    assert_eq!(cfg.engine.time_step, TimeStep::WallClock { max_dt: 0.1 });
    assert_eq!(cfg.engine.max_runtime, Some(300.0));
    assert_eq!(cfg.parameters.get("angle"), Some(&45.0));
}

#[test]
fn scenario_yaml_defaults() {
    let cfg = ScenarioConfig::from_yaml_str("engine:\n  model: torque\n").expect("valid scenario");
    assert_eq!(cfg.engine.time_step, TimeStep::WallClock { max_dt: 0.1 });
    assert_eq!(cfg.viewport.width, 800.0);
    assert!(cfg.parameters.is_empty());
}

#[test]
fn scenario_yaml_rejects_bad_settings() {
    let zero_step = "engine:\n  model: torque\n  time_step: !fixed 0.0\n";
    assert!(matches!(ScenarioConfig::from_yaml_str(zero_step), Err(SimError::InvalidConfig(_))));

    let unknown_model = "engine:\n  model: pendulum\n";
    assert!(matches!(ScenarioConfig::from_yaml_str(unknown_model), Err(SimError::InvalidConfig(_))));

    let tiny = "engine:\n  model: torque\nviewport:\n  width: 60\n  height: 60\n  margin: 40\n";
    assert!(matches!(ScenarioConfig::from_yaml_str(tiny), Err(SimError::InvalidViewport { .. })));

    let mut cfg = ScenarioConfig::from_yaml_str("engine:\n  model: torque\n").expect("valid scenario");
    cfg.parameters = BTreeMap::from([("mass".to_string(), 2.0)]);
    assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::UnknownParameter(_))));
}

#[test]
fn bundled_scenarios_run_headless() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let mut seen = 0;
    for kind_file in ["projectile", "dc_circuit", "ac_circuit", "carnot", "doppler", "calorimetry", "torque"] {
        let path = dir.join(format!("{kind_file}.yaml"));
        let file = File::open(&path).expect("bundled scenario exists");
        let cfg = ScenarioConfig::from_reader(file).expect("bundled scenario parses");

        let log = MessageLog::new();
        let mut scenario = Scenario::build_with_announcer(cfg, Box::new(log.clone())).expect("bundled scenario builds");
        let mut surface = RecordingSurface::new();
        let report = scenario.run_headless(30, 1.0 / 60.0, &mut surface);

        assert!(report.frames > 0, "{kind_file} rendered nothing");
        assert!(report.final_time > 0.0);
        assert_eq!(log.messages().first().map(String::as_str), Some("Simulation started"));
        scenario.teardown();
        seen += 1;
    }
    assert_eq!(seen, 7);
}
