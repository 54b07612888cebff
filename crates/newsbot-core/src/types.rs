//! Domain types shared by the source clients, the summarizer, and the runner.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// One of the five fixed data origins.
///
/// Declaration order is the fetch order and the digest display order; the
/// derived `Ord` is relied on by the aggregator's `BTreeMap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    News,
    EconomicIndicator,
    Sentiment,
    Posts,
    Feed,
}

impl SourceKind {
    /// Every kind, in fetch/display order.
    pub const ALL: [SourceKind; 5] = [
        SourceKind::News,
        SourceKind::EconomicIndicator,
        SourceKind::Sentiment,
        SourceKind::Posts,
        SourceKind::Feed,
    ];

    /// Stable machine name used in log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::News => "news",
            SourceKind::EconomicIndicator => "economic_indicator",
            SourceKind::Sentiment => "sentiment",
            SourceKind::Posts => "posts",
            SourceKind::Feed => "rss",
        }
    }

    /// Section heading shown in the digest.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::News => "CryptoPanic News",
            SourceKind::EconomicIndicator => "FRED Economic Data",
            SourceKind::Sentiment => "LunarCrush Sentiment",
            SourceKind::Posts => "Recent Crypto Posts",
            SourceKind::Feed => "الأخبار العربية (Arabic News)",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language of a text-bearing record. Text is carried verbatim, never translated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Arabic,
    Other(String),
}

impl Language {
    /// Parse an ISO 639-1 code as reported by the upstream API.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Language::English,
            "ar" => Language::Arabic,
            other => Language::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
            Language::Other(code) => code,
        }
    }
}

/// One normalized unit of data from a single source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRecord {
    News {
        headline: String,
        url: Option<String>,
        published_at: Option<DateTime<Utc>>,
    },
    Indicator {
        name: String,
        value: String,
        date: NaiveDate,
    },
    Sentiment {
        asset: String,
        score: f64,
    },
    Post {
        text: String,
        author: Option<String>,
        language: Language,
    },
    FeedItem {
        headline: String,
        summary: String,
        language: Language,
    },
}

impl SourceRecord {
    /// The source kind that produces this variant.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceRecord::News { .. } => SourceKind::News,
            SourceRecord::Indicator { .. } => SourceKind::EconomicIndicator,
            SourceRecord::Sentiment { .. } => SourceKind::Sentiment,
            SourceRecord::Post { .. } => SourceKind::Posts,
            SourceRecord::FeedItem { .. } => SourceKind::Feed,
        }
    }
}

/// Coarse failure category shown to operators in the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    MissingCredential,
    NetworkError,
    RateLimited,
    MalformedResponse,
    /// The remote answered with a non-success status other than 429.
    RemoteError,
}

impl FailureReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::MissingCredential => "missing-credential",
            FailureReason::NetworkError => "network-error",
            FailureReason::RateLimited => "rate-limited",
            FailureReason::MalformedResponse => "malformed-response",
            FailureReason::RemoteError => "remote-error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a source produced no records this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub reason: FailureReason,
    /// Human-readable detail for the log; not rendered in the digest.
    pub detail: String,
}

impl FetchFailure {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Result of one source invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(Vec<SourceRecord>),
    Failure(FetchFailure),
}

impl FetchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// The failure reason, if this outcome is a failure.
    #[must_use]
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(f) => Some(f.reason),
        }
    }
}
