//! Upstream-silence watchdog.

use std::time::Duration;

use tokio::time::Instant;

/// Tracks time since the last processed fragment.
///
/// The pipeline races [`Watchdog::expired`] against the next upstream line;
/// whichever resolves first decides whether a fragment or a keepalive is
/// emitted.
#[derive(Debug, Clone)]
pub struct Watchdog {
    interval: Duration,
    last_reset: Instant,
}

impl Watchdog {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_reset: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.last_reset = Instant::now();
    }

    pub fn deadline(&self) -> Instant {
        self.last_reset + self.interval
    }

    pub fn is_due(&self) -> bool {
        Instant::now() >= self.deadline()
    }

    /// Resolves once the interval has elapsed since the last reset.
    pub async fn expired(&self) {
        tokio::time::sleep_until(self.deadline()).await;
    }
}
