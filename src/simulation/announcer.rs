//! Accessibility announcements
//!
//! Every user-observable state change (started, paused, reset, parameter
//! changed) produces one short message. Delivery is fire-and-forget and
//! must never block the frame loop.

use std::sync::{Arc, Mutex};

pub trait Announcer {
    fn announce(&mut self, message: &str);
}

/// Forwards announcements to the log under the `a11y` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnnouncer;

impl Announcer for TracingAnnouncer {
    fn announce(&mut self, message: &str) {
        tracing::info!(target: "a11y", "{message}");
    }
}

/// Shared, cloneable message buffer
///
/// Clones see the same messages, so a host can keep one handle while the
/// component owns another.
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(m) => m.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<String> {
        self.messages().pop()
    }

    pub fn len(&self) -> usize {
        self.messages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut m) = self.messages.lock() {
            m.clear();
        }
    }
}

impl Announcer for MessageLog {
    fn announce(&mut self, message: &str) {
        // a poisoned buffer drops the message rather than stalling the frame
        if let Ok(mut m) = self.messages.lock() {
            m.push(message.to_string());
        }
    }
}
