//! Source clients, rate limiting, and aggregation for newsbot.
//!
//! Five independent sources (CryptoPanic, FRED, LunarCrush, X recent search,
//! and an RSS feed) are fetched one after another each cycle. Every failure
//! is downgraded to a [`newsbot_core::FetchOutcome::Failure`] inside its
//! client, so a cycle always yields one outcome per configured source.

pub mod aggregator;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod sources;

pub use aggregator::{Aggregator, CycleOutcomes};
pub use error::{AggregatorError, SourceError};
pub use http::build_http_client;
pub use rate_limit::RateLimiter;
pub use sources::{
    clients_from_config, CryptoPanicClient, FredClient, LunarCrushClient, RssFeedClient,
    SourceClient, TwitterClient,
};
