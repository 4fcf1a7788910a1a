//! Pausable deadlines on the host's monotonic clock
//!
//! The host owns the real timers (animation frames, `setTimeout`); the
//! simulation only records when something is due and asks to be woken.

use serde::{Deserialize, Serialize};

/// A single pending deadline that can be frozen while the session is paused
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Deadline {
    /// Fires once the clock reaches this time (ms)
    At(f64),
    /// Frozen with this much time left (ms)
    Frozen(f64),
}

impl Deadline {
    pub fn after(now: f64, delay_ms: f64) -> Self {
        Deadline::At(now + delay_ms)
    }

    pub fn is_due(&self, now: f64) -> bool {
        matches!(*self, Deadline::At(at) if now >= at)
    }

    /// Time the host should wake us, if running
    pub fn due_at(&self) -> Option<f64> {
        match *self {
            Deadline::At(at) => Some(at),
            Deadline::Frozen(_) => None,
        }
    }

    pub fn freeze(&mut self, now: f64) {
        if let Deadline::At(at) = *self {
            *self = Deadline::Frozen((at - now).max(0.0));
        }
    }

    pub fn thaw(&mut self, now: f64) {
        if let Deadline::Frozen(remaining) = *self {
            *self = Deadline::At(now + remaining);
        }
    }
}
