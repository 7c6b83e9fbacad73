//! Light update throttler.
//!
//! Coalesces bursts of incoming emotion events into at most one light update
//! per `min_interval_ms`. The caller owns the throttler and the timer; this
//! type only decides how long to wait.

use serde::{Deserialize, Serialize};

/// Default spacing between light updates.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 800;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateThrottler {
    min_interval_ms: u64,
    last_update_ms: Option<i64>,
    pending: bool,
}

impl UpdateThrottler {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_update_ms: None,
            pending: false,
        }
    }

    /// Ask for an update slot.
    ///
    /// Returns `None` when an update is already scheduled, otherwise marks
    /// one pending and returns how many milliseconds to wait before running
    /// it.
    pub fn request(&mut self, now_ms: i64) -> Option<u64> {
        if self.pending {
            return None;
        }
        self.pending = true;
        Some(self.delay_from(now_ms))
    }

    /// Record that the scheduled update ran at `now_ms`.
    pub fn complete(&mut self, now_ms: i64) {
        self.pending = false;
        self.last_update_ms = Some(now_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_update_ms(&self) -> Option<i64> {
        self.last_update_ms
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    fn delay_from(&self, now_ms: i64) -> u64 {
        let Some(last) = self.last_update_ms else {
            return 0;
        };
        let elapsed = now_ms.saturating_sub(last).max(0) as u64;
        self.min_interval_ms.saturating_sub(elapsed)
    }
}

impl Default for UpdateThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL_MS)
    }
}
