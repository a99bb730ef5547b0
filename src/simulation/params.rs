//! User-adjustable simulation parameters
//!
//! `SimulationParameter` mirrors one slider: range, step and whether it is
//! disabled while the clock runs. `ParameterStore` owns the set for one
//! mounted simulation and enforces `min <= value <= max` on every write.

use crate::error::{SimError, SimResult};

/// What a parameter change does to a running clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangePolicy {
    /// Keep time and state, replot with the new value
    Continue,
    /// Changing mid-flight is meaningless, reset the clock
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameter {
    pub key: &'static str, // lookup key used by models
    pub label: &'static str, // human-readable name for announcements
    pub unit: &'static str, // unit suffix, may be empty
    pub value: f64, // current value
    pub default: f64, // value restored by reset_to_defaults
    pub min: f64, // lower slider bound
    pub max: f64, // upper slider bound
    pub step: f64, // slider granularity
    pub locked_while_running: bool, // slider disabled while running
}

impl SimulationParameter {
    pub fn new(key: &'static str, label: &'static str, unit: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            key,
            label,
            unit,
            value: default,
            default,
            min,
            max,
            step,
            locked_while_running: false,
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked_while_running = true;
        self
    }

    /// Clamp into range, snap to the step grid anchored at `min`, clamp again
    pub fn snap(&self, raw: f64) -> f64 {
        let clamped = raw.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = round_to(self.min + steps * self.step, self.decimals());
        snapped.clamp(self.min, self.max)
    }

    /// Number of decimals the step carries (0.05 -> 2, 10 -> 0)
    pub fn decimals(&self) -> usize {
        let mut scaled = self.step.abs();
        let mut d = 0;
        while d < 6 && (scaled - scaled.round()).abs() > 1e-9 {
            scaled *= 10.0;
            d += 1;
        }
        d
    }

    /// "Launch angle set to 30 degrees"
    pub fn describe(&self) -> String {
        let value = format!("{:.*}", self.decimals(), self.value);
        if self.unit.is_empty() {
            format!("{} set to {}", self.label, value)
        } else {
            format!("{} set to {} {}", self.label, value, self.unit)
        }
    }
}

fn round_to(v: f64, decimals: usize) -> f64 {
    let p = 10f64.powi(decimals as i32);
    (v * p).round() / p
}

/// Result of a successful [`ParameterStore::set`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParamUpdate {
    pub key: &'static str,
    pub previous: f64,
    pub value: f64,
}

impl ParamUpdate {
    pub fn changed(&self) -> bool {
        self.previous != self.value
    }
}

/// Ordered parameter set for one simulation
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: Vec<SimulationParameter>,
}

impl ParameterStore {
    pub fn new(params: Vec<SimulationParameter>) -> Self {
        let params = params
            .into_iter()
            .map(|mut p| {
                p.default = p.snap(p.default);
                p.value = p.snap(p.value);
                p
            })
            .collect();
        Self { params }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationParameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&SimulationParameter> {
        self.params.iter().find(|p| p.key == key)
    }

    /// Current value, NaN for an unknown key so that models surface it as undefined
    pub fn value(&self, key: &str) -> f64 {
        self.get(key).map(|p| p.value).unwrap_or(f64::NAN)
    }

    /// Clamp, snap and store a new value
    pub fn set(&mut self, key: &str, raw: f64) -> SimResult<ParamUpdate> {
        let param = self
            .params
            .iter_mut()
            .find(|p| p.key == key)
            .ok_or_else(|| SimError::UnknownParameter(key.to_string()))?;

        if !raw.is_finite() {
            return Err(SimError::NonFiniteInput { key: key.to_string() });
        }

        let previous = param.value;
        param.value = param.snap(raw);

        Ok(ParamUpdate {
            key: param.key,
            previous,
            value: param.value,
        })
    }

    /// Restore every default, returns true if anything changed
    pub fn reset_to_defaults(&mut self) -> bool {
        let mut changed = false;
        for p in self.params.iter_mut() {
            if p.value != p.default {
                p.value = p.default;
                changed = true;
            }
        }
        changed
    }

    /// Make the current values the new defaults (scenario overrides at mount)
    pub fn commit_defaults(&mut self) {
        for p in self.params.iter_mut() {
            p.default = p.value;
        }
    }
}
