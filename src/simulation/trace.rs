//! Bounded history of past model states
//!
//! Trails and echoes are drawn from this buffer; physics never reads it.
//! Capacity is fixed at construction and the oldest sample is evicted
//! before a new one is pushed, so the buffer never grows past its cap.

use std::collections::VecDeque;

use crate::simulation::states::ModelState;

/// How much history a model wants and how densely to sample it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePolicy {
    pub capacity: usize, // max samples kept
    pub spacing: f64, // min simulation time between samples, 0 = every frame
}

impl TracePolicy {
    pub fn new(capacity: usize, spacing: f64) -> Self {
        Self { capacity, spacing }
    }
}

#[derive(Debug, Clone)]
pub struct TraceBuffer {
    policy: TracePolicy,
    samples: VecDeque<ModelState>,
}

impl TraceBuffer {
    pub fn new(policy: TracePolicy) -> Self {
        Self {
            policy,
            samples: VecDeque::with_capacity(policy.capacity),
        }
    }

    /// A buffer that never records anything
    pub fn disabled() -> Self {
        Self::new(TracePolicy::new(0, 0.0))
    }

    pub fn policy(&self) -> TracePolicy {
        self.policy
    }

    pub fn capacity(&self) -> usize {
        self.policy.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Record a sample if the spacing allows it, returns true if stored
    pub fn record(&mut self, state: &ModelState) -> bool {
        if self.policy.capacity == 0 {
            return false;
        }
        if let Some(last) = self.samples.back() {
            if state.t - last.t < self.policy.spacing {
                return false;
            }
        }
        if self.samples.len() == self.policy.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(state.clone());
        true
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &ModelState> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&ModelState> {
        self.samples.back()
    }
}
