//! Logging setup: stdout plus an optional append-only log file.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use newsbot_core::AppConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// `RUST_LOG` wins over the configured level when set.
fn env_filter(default_level: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("invalid log level {default_level:?}"))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if the log file cannot be opened for appending, the level does
/// not parse, or a subscriber is already installed.
pub fn init(config: &AppConfig) -> anyhow::Result<()> {
    let stdout_layer = fmt::layer().with_filter(env_filter(&config.log_level)?);

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(env_filter(&config.log_level)?),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

/// Minimal stderr logging for failures that happen before the config exists.
pub fn init_fallback() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new("info"))
        .try_init();
}
