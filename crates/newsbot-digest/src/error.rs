use std::time::Duration;

use thiserror::Error;

/// Errors returned by the webhook delivery sink.
///
/// The webhook URL embeds its token, so no variant ever carries the URL.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered 429.
    #[error("webhook rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// Any other non-2xx status.
    #[error("webhook returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("invalid webhook URL: {reason}")]
    InvalidWebhookUrl { reason: String },
}

impl DeliveryError {
    /// Transient failures are worth another attempt; everything else is not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            Self::RateLimited { .. } => true,
            Self::UnexpectedStatus { status } => (500..600).contains(status),
            Self::InvalidWebhookUrl { .. } => false,
        }
    }
}
