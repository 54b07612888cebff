use newsbot_core::{FailureReason, SourceKind};
use thiserror::Error;

/// Errors raised inside a source client. They never leave the client: each
/// one is downgraded to a [`newsbot_core::FetchFailure`] before the
/// aggregator sees it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{kind} source has no credential (set {var})")]
    MissingCredential {
        kind: SourceKind,
        var: &'static str,
    },

    /// Network, TLS, or timeout failure. The request URL is stripped before
    /// wrapping because several APIs take their key as a query parameter.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {endpoint} (retry after {retry_after_secs:?}s)")]
    RateLimited {
        endpoint: String,
        retry_after_secs: Option<u64>,
    },

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// HTTP 200 with nothing usable in the body.
    #[error("empty response from {context}")]
    EmptyResponse { context: String },

    /// HTTP 200 with an error flag in the body.
    #[error("{context} reported an error: {message}")]
    ApiError { context: String, message: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl SourceError {
    /// Coarse category rendered in the digest's unavailable notice.
    #[must_use]
    pub fn reason(&self) -> FailureReason {
        match self {
            SourceError::MissingCredential { .. } => FailureReason::MissingCredential,
            SourceError::Http(e) if e.is_decode() => FailureReason::MalformedResponse,
            SourceError::Http(e) => match e.status() {
                Some(s) if s.as_u16() == 429 => FailureReason::RateLimited,
                Some(_) => FailureReason::RemoteError,
                None => FailureReason::NetworkError,
            },
            SourceError::InvalidBaseUrl { .. } => FailureReason::NetworkError,
            SourceError::RateLimited { .. } => FailureReason::RateLimited,
            SourceError::UnexpectedStatus { .. } => FailureReason::RemoteError,
            SourceError::Deserialize { .. }
            | SourceError::Xml(_)
            | SourceError::EmptyResponse { .. }
            | SourceError::ApiError { .. } => FailureReason::MalformedResponse,
        }
    }
}

/// Errors raised while assembling the aggregator.
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("source kind {0} configured more than once")]
    DuplicateSource(SourceKind),
}
