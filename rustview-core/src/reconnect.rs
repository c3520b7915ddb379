//! Reconnect polling timer
//!
//! Retries the initial connection at a fixed period until the controller
//! becomes active or the attempt reports a fatal error. At most one timer is
//! outstanding per controller; starting an already-running poll is a no-op,
//! and the poll self-cancels as soon as the controller is active.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Default retry period
pub const RECONNECT_PERIOD: Duration = Duration::from_millis(500);

/// Periodic reconnect timer handle
#[derive(Debug)]
pub struct ReconnectPoll {
    interval: Option<Interval>,
    period: Duration,
}

impl Default for ReconnectPoll {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectPoll {
    /// Creates a stopped poll with the default period
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: None,
            period: RECONNECT_PERIOD,
        }
    }

    /// Creates a stopped poll with a custom period
    #[must_use]
    pub const fn with_period(period: Duration) -> Self {
        Self {
            interval: None,
            period,
        }
    }

    /// Arms the timer; a no-op while already running
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }
        // First tick fires one full period from now, not immediately.
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    /// Cancels the timer and clears the handle
    pub fn stop(&mut self) {
        self.interval = None;
    }

    /// Returns whether the timer is armed
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Waits for the next tick; pends forever while the timer is stopped so
    /// it is always safe to select on
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}
