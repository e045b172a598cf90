// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancellable one-shot deadlines driven by the caller's clock.
//!
//! The core never reads a clock. Operations that need a delay arm a [`Timer`]
//! at `now + delay`, the embedder wakes up at [`Timer::deadline`], and the
//! owning driver calls [`Timer::fire`] from its `poll`. Whatever a timer
//! guards must still be re-checked when it fires.

/// Milliseconds on the embedder's monotonic clock.
pub type Millis = u64;

/// A single cancellable deadline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Millis>,
}

impl Timer {
    /// Creates a disarmed timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arms the timer at `at`, replacing any pending deadline.
    pub fn arm(&mut self, at: Millis) {
        self.deadline = Some(at);
    }

    /// Arms the timer at `at` only if nothing is pending.
    pub fn arm_if_idle(&mut self, at: Millis) {
        if self.deadline.is_none() {
            self.deadline = Some(at);
        }
    }

    /// Drops the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` while a deadline is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns the pending deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    /// Consumes the deadline if it has expired at `now`.
    ///
    /// Returns `true` exactly once per arming.
    pub fn fire(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(at) if at <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of two optional deadlines.
#[must_use]
pub fn earliest(a: Option<Millis>, b: Option<Millis>) -> Option<Millis> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_deadline() {
        let mut t = Timer::new();
        t.arm(100);
        assert!(!t.fire(99));
        assert!(t.fire(100));
        assert!(!t.fire(200));
        assert!(!t.is_armed());
    }

    #[test]
    fn cancel_prevents_fire() {
        let mut t = Timer::new();
        t.arm(10);
        t.cancel();
        assert!(!t.fire(1_000));
    }

    #[test]
    fn arm_if_idle_keeps_earlier_deadline() {
        let mut t = Timer::new();
        t.arm_if_idle(50);
        t.arm_if_idle(80);
        assert_eq!(t.deadline(), Some(50));
        t.arm(80);
        assert_eq!(t.deadline(), Some(80));
    }

    #[test]
    fn earliest_picks_minimum() {
        assert_eq!(earliest(Some(5), Some(3)), Some(3));
        assert_eq!(earliest(None, Some(3)), Some(3));
        assert_eq!(earliest(Some(5), None), Some(5));
        assert_eq!(earliest(None, None), None);
    }
}
