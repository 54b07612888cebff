use std::path::PathBuf;
use std::time::Duration;

/// Credentials for the four authenticated sources. `None` means the source
/// will report `missing-credential` every cycle.
#[derive(Clone, Default)]
pub struct SourceCredentials {
    pub cryptopanic_api_key: Option<String>,
    pub fred_api_key: Option<String>,
    pub lunarcrush_api_key: Option<String>,
    pub twitter_bearer_token: Option<String>,
}

impl SourceCredentials {
    /// Number of credentials that are present.
    #[must_use]
    pub fn configured_count(&self) -> usize {
        [
            &self.cryptopanic_api_key,
            &self.fred_api_key,
            &self.lunarcrush_api_key,
            &self.twitter_bearer_token,
        ]
        .iter()
        .filter(|c| c.is_some())
        .count()
    }
}

impl std::fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("SourceCredentials")
            .field("cryptopanic_api_key", &redact(&self.cryptopanic_api_key))
            .field("fred_api_key", &redact(&self.fred_api_key))
            .field("lunarcrush_api_key", &redact(&self.lunarcrush_api_key))
            .field("twitter_bearer_token", &redact(&self.twitter_bearer_token))
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub webhook_url: String,
    pub credentials: SourceCredentials,
    pub fred_series_id: String,
    pub rss_feed_url: String,
    pub log_level: String,
    /// Append-only log file; `None` logs to the console only.
    pub log_file: Option<PathBuf>,
    pub interval_secs: u64,
    pub rate_limit_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub delivery_max_retries: u32,
    pub delivery_backoff_base_ms: u64,
    pub max_message_chars: usize,
}

impl AppConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_interval_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("webhook_url", &"[redacted]")
            .field("credentials", &self.credentials)
            .field("fred_series_id", &self.fred_series_id)
            .field("rss_feed_url", &self.rss_feed_url)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("interval_secs", &self.interval_secs)
            .field("rate_limit_interval_ms", &self.rate_limit_interval_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("delivery_max_retries", &self.delivery_max_retries)
            .field("delivery_backoff_base_ms", &self.delivery_backoff_base_ms)
            .field("max_message_chars", &self.max_message_chars)
            .finish()
    }
}
