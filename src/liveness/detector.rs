//! Adaptive-timeout heartbeat detector.
//!
//! # States
//! - Unknown: fewer than two strictly increasing heartbeats seen, always down
//! - Live: now < last heartbeat + timeout
//! - Stale: now >= last heartbeat + timeout
//!
//! # Transitions
//! ```text
//! update(t) with t > last:  timeout = (t - last) * 1.5
//! update(t) with t <= last: timeout unchanged
//! always:                   last = t, verdict recomputed against now
//! ```

use chrono::{DateTime, TimeDelta, Utc};

/// Up/down state of a single group, driven by its heartbeat timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessDetector {
    last_heartbeat: Option<DateTime<Utc>>,
    timeout: TimeDelta,
    up: bool,
}

impl LivenessDetector {
    /// Create a detector seeded with the first observed heartbeat.
    ///
    /// Creation is not a transition: the verdict starts as down and nothing
    /// is reported for it.
    pub fn new(heartbeat: Option<DateTime<Utc>>) -> Self {
        Self {
            last_heartbeat: heartbeat,
            timeout: TimeDelta::zero(),
            up: false,
        }
    }

    /// Ingest a heartbeat and re-evaluate against the current wall clock.
    ///
    /// Returns true if the verdict flipped.
    pub fn update(&mut self, heartbeat: Option<DateTime<Utc>>) -> bool {
        self.update_at(heartbeat, Utc::now())
    }

    /// Ingest a heartbeat and re-evaluate the verdict at `now`.
    ///
    /// Late, duplicate and out-of-order heartbeats are accepted; they replace
    /// the last heartbeat but leave the timeout alone.
    pub fn update_at(&mut self, heartbeat: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let was_up = self.up;

        if let (Some(new), Some(last)) = (heartbeat, self.last_heartbeat) {
            if new > last {
                let delta = new - last;
                self.timeout = delta + delta / 2;
            }
        }

        self.last_heartbeat = heartbeat;
        self.up = self.is_up_at(now);
        was_up != self.up
    }

    /// Verdict at the current wall clock.
    pub fn is_up(&self) -> bool {
        self.is_up_at(Utc::now())
    }

    /// Verdict at `now`: live only inside the grace window after the last heartbeat.
    pub fn is_up_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline().is_some_and(|deadline| now < deadline)
    }

    /// End of the current grace window, if a cadence has been inferred.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        if self.timeout.is_zero() {
            return None;
        }
        self.last_heartbeat?.checked_add_signed(self.timeout)
    }

    pub fn last_heartbeat(&self) -> Option<DateTime<Utc>> {
        self.last_heartbeat
    }

    pub fn timeout(&self) -> TimeDelta {
        self.timeout
    }

    /// Verdict recorded by the most recent update.
    pub fn verdict(&self) -> bool {
        self.up
    }
}
