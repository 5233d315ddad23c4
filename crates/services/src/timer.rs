use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use lms_core::session::{Countdown, SessionEvent};

const TICK: Duration = Duration::from_secs(1);

/// Signal produced by a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    Tick { remaining: u32 },
    /// Sent once, when the countdown reaches zero.
    Expired,
}

impl From<TimerSignal> for SessionEvent {
    fn from(signal: TimerSignal) -> Self {
        match signal {
            TimerSignal::Tick { remaining } => SessionEvent::TimerTicked { remaining },
            TimerSignal::Expired => SessionEvent::TimerExpired,
        }
    }
}

/// Background countdown task.
///
/// Remaining time is recomputed from the start instant on every tick, so a
/// delayed tick shows the true value instead of accumulating drift.
#[derive(Debug, Default)]
pub struct SessionTimer {
    handle: Option<JoinHandle<()>>,
}

impl SessionTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `limit_secs`, replacing any running countdown.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, limit_secs: u32, signals: UnboundedSender<TimerSignal>) {
        self.stop();
        let started = Instant::now();
        self.handle = Some(tokio::spawn(async move {
            let mut countdown = Countdown::new(limit_secs);
            let mut ticks = interval_at(started + TICK, TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let Some(step) = countdown.observe(started.elapsed()) else {
                    break;
                };
                if signals.send(TimerSignal::Tick { remaining: step.remaining }).is_err() {
                    break;
                }
                if step.expired {
                    let _ = signals.send(TimerSignal::Expired);
                    break;
                }
            }
            debug!(limit_secs, "countdown finished");
        }));
    }

    /// Stop the countdown. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
