use std::time::Duration;

/// One observation of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStep {
    pub remaining: u32,
    /// Set on exactly one step: the first one that reaches zero.
    pub expired: bool,
}

/// Drift-free countdown arithmetic.
///
/// Remaining time is derived from the elapsed time since start on every
/// observation, so late or skipped ticks never accumulate error. The value
/// never increases and expiry is reported once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    limit_secs: u32,
    remaining: u32,
    expired: bool,
    stopped: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(limit_secs: u32) -> Self {
        Self {
            limit_secs,
            remaining: limit_secs,
            expired: false,
            stopped: false,
        }
    }

    #[must_use]
    pub fn limit_secs(&self) -> u32 {
        self.limit_secs
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// True until the countdown expires or is stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.expired && !self.stopped
    }

    /// Observe the countdown at `elapsed` since start.
    ///
    /// Returns `None` once expired or stopped.
    pub fn observe(&mut self, elapsed: Duration) -> Option<CountdownStep> {
        if !self.is_running() {
            return None;
        }
        let elapsed_secs = u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX);
        let remaining = self.limit_secs.saturating_sub(elapsed_secs).min(self.remaining);
        self.remaining = remaining;
        if remaining == 0 {
            self.expired = true;
        }
        Some(CountdownStep {
            remaining,
            expired: self.expired,
        })
    }

    /// Stop observing. Idempotent.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Remaining seconds at or below which the clock is shown as urgent.
///
/// A tenth of the limit, kept between 10 and 60 seconds.
#[must_use]
pub fn low_time_threshold(limit_secs: u32) -> u32 {
    (limit_secs / 10).clamp(10, 60)
}
