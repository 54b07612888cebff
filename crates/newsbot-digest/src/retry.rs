//! Retry with exponential back-off and jitter for webhook delivery.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Other 4xx responses are
//! returned immediately; resending the same payload will not fix them.

use std::future::Future;
use std::time::Duration;

use crate::error::DeliveryError;

const MAX_DELAY_MS: u64 = 60_000;

/// Result of a retried operation plus how many retries it took.
#[derive(Debug)]
pub(crate) struct Retried<T> {
    pub value: T,
    pub retries: u32,
}

/// Delay before retry number `attempt` (1-based), before jitter.
///
/// `base × 2^(attempt-1)`, capped at 60 s. A server `Retry-After` hint
/// raises the delay to at least the hinted value, still under the cap.
pub(crate) fn backoff_delay_ms(
    backoff_base_ms: u64,
    attempt: u32,
    retry_after: Option<Duration>,
) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let hinted = retry_after.map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    computed.max(hinted).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Retry | Sleep before it                  |
/// |-------|----------------------------------|
/// | 1     | 1 000 ms × 2⁰ ± 25 % jitter     |
/// | 2     | 1 000 ms × 2¹ ± 25 % jitter     |
/// | 3     | 1 000 ms × 2² ± 25 % jitter     |
///
/// Jitter is applied to the exponential part only, so a `Retry-After` hint
/// is never undercut.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<Retried<T>, DeliveryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DeliveryError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    retries: attempt,
                })
            }
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let retry_after = match &err {
                    DeliveryError::RateLimited { retry_after } => *retry_after,
                    _ => None,
                };
                let base = backoff_delay_ms(backoff_base_ms, attempt, None);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (base as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let floor = backoff_delay_ms(0, attempt, retry_after);
                let delay_ms = jittered.max(floor).min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "webhook delivery failed, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
