use std::path::PathBuf;

use crate::app_config::{AppConfig, SourceCredentials};
use crate::ConfigError;

pub const DEFAULT_RSS_FEED_URL: &str = "https://www.aljazeera.net/rss/RssFeeds?Url=home";
pub const DEFAULT_FRED_SERIES_ID: &str = "UNRATE";

/// Upper bound on any single outbound call; a hung call blocks the whole cycle.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Blank values are treated exactly like unset ones, so `FRED_API_KEY=` in a
/// `.env` file disables that source rather than sending an empty key.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let require = |var: &str| -> Result<String, ConfigError> {
        optional(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let webhook_url = require("DISCORD_WEBHOOK_URL")?;

    let credentials = SourceCredentials {
        cryptopanic_api_key: optional("CRYPTOPANIC_API_KEY"),
        fred_api_key: optional("FRED_API_KEY"),
        lunarcrush_api_key: optional("LUNARCRUSH_API_KEY"),
        twitter_bearer_token: optional("TWITTER_API_KEY"),
    };
    if credentials.configured_count() == 0 {
        return Err(ConfigError::NoUsableSources);
    }

    let fred_series_id = or_default("NEWSBOT_FRED_SERIES_ID", DEFAULT_FRED_SERIES_ID);
    let rss_feed_url = or_default("NEWSBOT_RSS_FEED_URL", DEFAULT_RSS_FEED_URL);
    let log_level = or_default("NEWSBOT_LOG_LEVEL", "info");

    // Present-but-blank disables the file sink; unset falls back to the default file.
    let log_file = match lookup("NEWSBOT_LOG_FILE") {
        Ok(v) if v.trim().is_empty() => None,
        Ok(v) => Some(PathBuf::from(v.trim())),
        Err(_) => Some(PathBuf::from("newsbot.log")),
    };

    let interval_secs = parse_u64("NEWSBOT_INTERVAL_SECS", "14400")?;
    if interval_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NEWSBOT_INTERVAL_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let rate_limit_interval_ms = parse_u64("NEWSBOT_RATE_LIMIT_MS", "1000")?;

    let request_timeout_secs = parse_u64("NEWSBOT_REQUEST_TIMEOUT_SECS", "30")?;
    if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&request_timeout_secs) {
        return Err(ConfigError::InvalidEnvVar {
            var: "NEWSBOT_REQUEST_TIMEOUT_SECS".to_string(),
            reason: format!("must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"),
        });
    }

    let user_agent = or_default("NEWSBOT_USER_AGENT", "newsbot/0.1 (digest)");
    let delivery_max_retries = parse_u32("NEWSBOT_DELIVERY_MAX_RETRIES", "3")?;
    let delivery_backoff_base_ms = parse_u64("NEWSBOT_DELIVERY_BACKOFF_MS", "1000")?;

    let max_message_chars = parse_usize("NEWSBOT_MAX_MESSAGE_CHARS", "2000")?;
    if max_message_chars == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NEWSBOT_MAX_MESSAGE_CHARS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        webhook_url,
        credentials,
        fred_series_id,
        rss_feed_url,
        log_level,
        log_file,
        interval_secs,
        rate_limit_interval_ms,
        request_timeout_secs,
        user_agent,
        delivery_max_retries,
        delivery_backoff_base_ms,
        max_message_chars,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
