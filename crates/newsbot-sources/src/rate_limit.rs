//! Minimum spacing between outbound source calls.
//!
//! The limiter is a plain value owned by the [`crate::Aggregator`]; sources
//! are fetched sequentially from one task, so no locking is involved.

use std::time::Duration;

use tokio::time::Instant;

/// Enforces at least `min_interval` between consecutive [`RateLimiter::throttle`]
/// returns. Uses the tokio clock so tests can run with paused time.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until `min_interval` has elapsed since the previous call returned.
    ///
    /// The first call in the limiter's lifetime returns immediately.
    pub async fn throttle(&mut self) {
        if let Some(last) = self.last_call {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    wait_ms = (ready_at - Instant::now()).as_millis(),
                    "rate limiter: pacing next source call"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}
