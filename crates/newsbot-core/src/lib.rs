//! Shared configuration and domain types for newsbot.

pub mod app_config;
pub mod config;
pub mod text;
pub mod types;

pub use app_config::{AppConfig, SourceCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use text::truncate_chars;
pub use types::{FailureReason, FetchFailure, FetchOutcome, Language, SourceKind, SourceRecord};

use thiserror::Error;

/// Fatal startup errors. Nothing else is allowed to terminate the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("no source credentials configured; set at least one API key")]
    NoUsableSources,

    #[error(
        "worst-case cycle of {worst_case_secs}s does not fit in the {interval_secs}s schedule interval"
    )]
    CycleOverrun {
        worst_case_secs: u64,
        interval_secs: u64,
    },
}
