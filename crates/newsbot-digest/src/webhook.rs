//! Webhook delivery sink: chunking, JSON POST, and retry.

use std::time::Duration;

use newsbot_core::AppConfig;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::chunk::{split_message, DEFAULT_MAX_MESSAGE_CHARS};
use crate::error::DeliveryError;
use crate::retry::retry_with_backoff;
use crate::summarize::Digest;

/// Tunables for [`DeliverySink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliverySettings {
    pub max_message_chars: usize,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

impl DeliverySettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_message_chars: config.max_message_chars,
            max_retries: config.delivery_max_retries,
            backoff_base_ms: config.delivery_backoff_base_ms,
        }
    }
}

/// What a successful delivery took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Messages posted.
    pub chunks: usize,
    /// Retries summed over all chunks.
    pub retries: u32,
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    allowed_mentions: AllowedMentions,
}

/// An empty `parse` list keeps digest text from pinging anyone.
#[derive(Debug, Serialize)]
struct AllowedMentions {
    parse: [&'static str; 0],
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: Option<f64>,
}

/// Posts digests to a Discord-compatible webhook.
pub struct DeliverySink {
    client: Client,
    webhook_url: Url,
    settings: DeliverySettings,
}

impl std::fmt::Debug for DeliverySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliverySink")
            .field("webhook_url", &"[redacted]")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl DeliverySink {
    /// Creates a sink posting to `webhook_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::InvalidWebhookUrl`] if the URL does not parse
    /// or is not http(s). The URL itself is left out of the error.
    pub fn new(
        client: Client,
        webhook_url: &str,
        settings: DeliverySettings,
    ) -> Result<Self, DeliveryError> {
        let webhook_url = Url::parse(webhook_url).map_err(|e| DeliveryError::InvalidWebhookUrl {
            reason: e.to_string(),
        })?;
        if !matches!(webhook_url.scheme(), "http" | "https") {
            return Err(DeliveryError::InvalidWebhookUrl {
                reason: format!("unsupported scheme {:?}", webhook_url.scheme()),
            });
        }
        Ok(Self {
            client,
            webhook_url,
            settings,
        })
    }

    #[must_use]
    pub fn settings(&self) -> DeliverySettings {
        self.settings
    }

    /// Delivers `digest`, split into as many messages as the size limit needs.
    ///
    /// Chunks go out in order. If one exhausts its retries the remaining
    /// chunks are not sent.
    ///
    /// # Errors
    ///
    /// Returns the last [`DeliveryError`] of the chunk that could not be
    /// delivered.
    pub async fn deliver(&self, digest: &Digest) -> Result<DeliveryReport, DeliveryError> {
        let chunks = split_message(digest.as_str(), self.settings.max_message_chars);
        let total = chunks.len();
        let mut retries = 0u32;

        for (index, chunk) in chunks.iter().enumerate() {
            let outcome = retry_with_backoff(
                self.settings.max_retries,
                self.settings.backoff_base_ms,
                || self.post_chunk(chunk),
            )
            .await;

            match outcome {
                Ok(done) => retries += done.retries,
                Err(err) => {
                    tracing::error!(
                        chunk = index + 1,
                        total,
                        delivered = index,
                        error = %err,
                        "digest delivery failed"
                    );
                    return Err(err);
                }
            }
        }

        tracing::info!(chunks = total, retries, "digest delivered");
        Ok(DeliveryReport {
            chunks: total,
            retries,
        })
    }

    async fn post_chunk(&self, content: &str) -> Result<(), DeliveryError> {
        let payload = WebhookPayload {
            content,
            allowed_mentions: AllowedMentions { parse: [] },
        };
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DeliveryError::RateLimited {
                retry_after: retry_after_hint(response).await,
            });
        }
        Err(DeliveryError::UnexpectedStatus {
            status: status.as_u16(),
        })
    }
}

/// Reads the server's back-off hint in seconds, from the `Retry-After`
/// header or failing that a JSON body `retry_after` field.
async fn retry_after_hint(response: Response) -> Option<Duration> {
    let from_header = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok());
    let secs = match from_header {
        Some(secs) => Some(secs),
        None => response
            .json::<RateLimitBody>()
            .await
            .ok()
            .and_then(|b| b.retry_after),
    }?;
    Duration::try_from_secs_f64(secs).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_disables_mentions() {
        let payload = WebhookPayload {
            content: "hi @everyone",
            allowed_mentions: AllowedMentions { parse: [] },
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"content": "hi @everyone", "allowed_mentions": {"parse": []}})
        );
    }

    #[test]
    fn rejects_unparseable_and_non_http_urls() {
        assert!(matches!(
            DeliverySink::new(Client::new(), "not a url", DeliverySettings::default()),
            Err(DeliveryError::InvalidWebhookUrl { .. })
        ));
        assert!(matches!(
            DeliverySink::new(Client::new(), "ftp://example.com/hook", DeliverySettings::default()),
            Err(DeliveryError::InvalidWebhookUrl { .. })
        ));
    }

    #[test]
    fn debug_hides_webhook_token() {
        let sink = DeliverySink::new(
            Client::new(),
            "https://discord.com/api/webhooks/123/secret-token",
            DeliverySettings::default(),
        )
        .unwrap();
        assert!(!format!("{sink:?}").contains("secret-token"));
    }
}
