//! Simulation clock: owns simulation time and frame scheduling
//!
//! State machine:
//! - `Idle -> Running` on `start`
//! - `Running -> Paused` on `pause`, `Paused -> Running` resumes at the stored time
//! - any state `-> Idle` on `reset`, time back to zero
//! - `Running -> Completed` once time reaches the model horizon
//! - `Completed -> Running` on `start` restarts from zero
//!
//! The clock holds at most one pending [`FrameHandle`]. Pausing, resetting
//! or tearing down cancels it through the host scheduler before returning,
//! so a stale frame never runs.

use serde::Deserialize;

use crate::simulation::frames::{FrameHandle, FrameScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// How far simulation time moves per frame
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TimeStep {
    /// Constant simulation step, independent of frame timing
    Fixed(f64),
    /// Follow the wall clock, each delta clamped to `[0, max_dt]`
    WallClock { max_dt: f64 },
}

impl TimeStep {
    pub fn delta(&self, wall_dt: f64) -> f64 {
        let dt = match *self {
            TimeStep::Fixed(dt) => dt,
            TimeStep::WallClock { max_dt } => {
                if wall_dt.is_finite() {
                    wall_dt.min(max_dt)
                } else {
                    0.0
                }
            }
        };
        // time must never run backwards
        if dt.is_finite() { dt.max(0.0) } else { 0.0 }
    }
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep::WallClock { max_dt: 0.1 }
    }
}

#[derive(Debug)]
pub struct SimulationClock {
    state: ClockState,
    time: f64, // simulation seconds
    step: TimeStep,
    horizon: Option<f64>, // model termination time
    pending: Option<FrameHandle>, // the one outstanding frame callback
    max_runtime: Option<f64>, // wall seconds of continuous running before auto-pause
    running_for: f64, // wall seconds since the last start
}

impl SimulationClock {
    pub fn new(step: TimeStep) -> Self {
        Self {
            state: ClockState::Idle,
            time: 0.0,
            step,
            horizon: None,
            pending: None,
            max_runtime: None,
            running_for: 0.0,
        }
    }

    /// Wall seconds of continuous running before auto-pause; `None` disables
    pub fn set_max_runtime(&mut self, max_runtime: Option<f64>) {
        self.max_runtime = max_runtime.filter(|m| m.is_finite() && *m > 0.0);
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step(&self) -> TimeStep {
        self.step
    }

    pub fn horizon(&self) -> Option<f64> {
        self.horizon
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Update the termination time, e.g. after a parameter change
    pub fn set_horizon(&mut self, horizon: Option<f64>) {
        self.horizon = horizon.filter(|h| h.is_finite()).map(|h| h.max(0.0));
    }

    pub fn reached_horizon(&self) -> bool {
        self.horizon.map_or(false, |h| self.time >= h)
    }

    /// Start or resume; returns false if already running
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        match self.state {
            ClockState::Running => return false,
            ClockState::Completed => self.time = 0.0,
            ClockState::Idle | ClockState::Paused => {}
        }
        tracing::debug!(from = ?self.state, t = self.time, "clock start");
        self.state = ClockState::Running;
        self.running_for = 0.0;
        self.schedule(scheduler);
        true
    }

    /// Freeze time; returns false if not running
    pub fn pause(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        self.cancel_pending(scheduler);
        self.state = ClockState::Paused;
        tracing::debug!(t = self.time, "clock paused");
        true
    }

    /// Back to `Idle` at time zero from any state
    pub fn reset(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.cancel_pending(scheduler);
        self.state = ClockState::Idle;
        self.time = 0.0;
        self.running_for = 0.0;
        tracing::debug!("clock reset");
    }

    /// Jump to `t`, clamped to `[0, horizon]`
    ///
    /// Seeking from `Idle` or `Completed` leaves the clock `Paused` at the new
    /// time; a running clock keeps running from there.
    pub fn seek(&mut self, t: f64) -> f64 {
        let mut t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        if let Some(h) = self.horizon {
            t = t.min(h);
        }
        self.time = t;
        if matches!(self.state, ClockState::Idle | ClockState::Completed) {
            self.state = ClockState::Paused;
        }
        tracing::debug!(t, state = ?self.state, "clock seek");
        t
    }

    /// Consume the frame `handle` and advance time
    ///
    /// Returns `None` when the handle is not the pending one or the clock is
    /// not running; nothing should be evaluated or drawn in that case.
    pub fn advance(&mut self, handle: FrameHandle, wall_dt: f64) -> Option<f64> {
        if self.pending != Some(handle) || self.state != ClockState::Running {
            tracing::trace!(handle = handle.id(), "ignoring frame that is not pending");
            return None;
        }
        self.pending = None;

        if wall_dt.is_finite() {
            self.running_for += wall_dt.max(0.0);
        }

        let mut t = self.time + self.step.delta(wall_dt);
        if let Some(h) = self.horizon {
            t = t.min(h.max(self.time));
        }
        self.time = t;
        Some(self.time)
    }

    /// True once the running time exceeds the configured maximum
    pub fn runtime_exceeded(&self) -> bool {
        self.state == ClockState::Running && self.max_runtime.map_or(false, |m| self.running_for >= m)
    }

    /// Terminal transition, no more frames are scheduled
    pub fn complete(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.cancel_pending(scheduler);
        self.state = ClockState::Completed;
        tracing::debug!(t = self.time, "clock completed");
    }

    /// Request the next frame while running
    pub fn schedule(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state != ClockState::Running || self.pending.is_some() {
            return;
        }
        self.pending = Some(scheduler.request_frame());
    }

    /// Cancel the outstanding frame and drop the clock
    pub fn teardown(mut self, scheduler: &mut dyn FrameScheduler) {
        self.cancel_pending(scheduler);
    }

    fn cancel_pending(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        if let Some(handle) = self.pending {
            tracing::warn!(handle = handle.id(), "clock dropped with a pending frame; use teardown()");
        }
    }
}
