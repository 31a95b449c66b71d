//! Countdown timer that forces a session to complete.
//!
//! The timer ticks once per second against a fixed deadline and calls its
//! `on_time_up` callback exactly once when the deadline passes. Cancelling
//! (or dropping) the timer stops the tick task, so the callback can never
//! reach a session that has already been torn down.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const TICK: Duration = Duration::from_secs(1);

/// Presentation hint for the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeThreshold {
    /// More than half the time is left.
    Normal,
    /// At most half the time is left.
    Warning,
    /// At most a quarter of the time is left.
    Danger,
}

impl TimeThreshold {
    pub fn for_remaining(remaining: Duration, total: Duration) -> Self {
        if total.is_zero() {
            return TimeThreshold::Danger;
        }
        // Compare remaining/total against 1/4 and 1/2 without floats.
        let remaining = remaining.as_millis();
        let total = total.as_millis();
        if remaining * 4 <= total {
            TimeThreshold::Danger
        } else if remaining * 2 <= total {
            TimeThreshold::Warning
        } else {
            TimeThreshold::Normal
        }
    }
}

/// A running countdown. Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct Timer {
    total: Duration,
    deadline: Instant,
    remaining_rx: watch::Receiver<Duration>,
    fired_rx: watch::Receiver<bool>,
    task: Option<JoinHandle<()>>,
}

impl Timer {
    /// Start a countdown of `time_limit_minutes`.
    pub fn start<F>(time_limit_minutes: u32, on_time_up: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::with_duration(
            Duration::from_secs(u64::from(time_limit_minutes) * 60),
            on_time_up,
        )
    }

    /// Start a countdown of an arbitrary duration.
    pub fn with_duration<F>(total: Duration, on_time_up: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let start = Instant::now();
        let deadline = start + total;
        let (remaining_tx, remaining_rx) = watch::channel(total);
        let (fired_tx, fired_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(start + TICK, TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if !total.is_zero() {
                    ticker.tick().await;
                }
                let remaining = deadline.saturating_duration_since(Instant::now());
                let _ = remaining_tx.send(remaining);
                if remaining.is_zero() {
                    break;
                }
            }

            tracing::debug!("timer expired after {}s", total.as_secs());
            let _ = fired_tx.send(true);
            on_time_up();
        });

        Self {
            total,
            deadline,
            remaining_rx,
            fired_rx,
            task: Some(task),
        }
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Duration {
        if self.task.is_none() {
            return *self.remaining_rx.borrow();
        }
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn threshold(&self) -> TimeThreshold {
        TimeThreshold::for_remaining(self.remaining(), self.total)
    }

    /// Receiver updated with the remaining time on every tick.
    pub fn subscribe(&self) -> watch::Receiver<Duration> {
        self.remaining_rx.clone()
    }

    /// Whether `on_time_up` has been called.
    pub fn has_fired(&self) -> bool {
        *self.fired_rx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop ticking. The callback will not run if it has not already.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("timer cancelled");
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Render a duration as `mm:ss`, rounding partial seconds up.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
