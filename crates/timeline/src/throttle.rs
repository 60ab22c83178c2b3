//! Leading-edge execution throttle
//!
//! Bounds recomputation storms when provider notifications arrive in a
//! burst: at most one execution per window, with a call arriving
//! mid-window deferred to fire once at the window boundary. Takes the
//! current `Instant` as a parameter so tests need no sleeps.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last_fired: Option<Instant>,
    pending: bool,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
            pending: false,
        }
    }

    /// Request an execution. Returns `true` when the caller should run
    /// now (leading edge); a call inside the window is recorded as
    /// pending instead.
    pub fn acquire(&mut self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) if now.duration_since(last) < self.window => {
                self.pending = true;
                false
            }
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }

    /// Fire a deferred call once the window boundary has passed.
    /// Returns `true` when the caller should run the pending execution.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }
        let boundary_passed = self
            .last_fired
            .is_none_or(|last| now.duration_since(last) >= self.window);
        if boundary_passed {
            self.pending = false;
            self.last_fired = Some(now);
            return true;
        }
        false
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }
}
