//! Source client abstractions and the five concrete clients.

mod cryptopanic;
mod fred;
mod lunarcrush;
mod rss;
mod twitter;

pub use cryptopanic::CryptoPanicClient;
pub use fred::FredClient;
pub use lunarcrush::LunarCrushClient;
pub use rss::RssFeedClient;
pub use twitter::TwitterClient;

use async_trait::async_trait;
use newsbot_core::{AppConfig, FetchFailure, FetchOutcome, Language, SourceKind, SourceRecord};

use crate::error::SourceError;
use crate::http::build_http_client;

/// Uniform contract for every data source.
///
/// Implementations must not panic or propagate errors: every failure is
/// returned as [`FetchOutcome::Failure`]. Each call makes at most one
/// outbound HTTP request, and none when a credential is missing.
#[async_trait]
pub trait SourceClient: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self) -> FetchOutcome;
}

/// Downgrades a client-internal result into the value handed to the aggregator.
pub(crate) fn into_outcome(result: Result<Vec<SourceRecord>, SourceError>) -> FetchOutcome {
    match result {
        Ok(records) => FetchOutcome::Success(records),
        Err(e) => FetchOutcome::Failure(FetchFailure::new(e.reason(), e.to_string())),
    }
}

/// Builds all five clients from configuration, in fetch order.
///
/// Clients whose credential is absent are still built; they report
/// `missing-credential` every cycle so the digest shows the gap.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the HTTP client cannot be constructed or
/// [`SourceError::InvalidBaseUrl`] if the configured feed URL does not parse.
pub fn clients_from_config(config: &AppConfig) -> Result<Vec<Box<dyn SourceClient>>, SourceError> {
    let http = build_http_client(config.request_timeout(), &config.user_agent)?;
    let creds = &config.credentials;

    Ok(vec![
        Box::new(CryptoPanicClient::new(
            http.clone(),
            creds.cryptopanic_api_key.clone(),
        )?),
        Box::new(FredClient::new(
            http.clone(),
            creds.fred_api_key.clone(),
            &config.fred_series_id,
        )?),
        Box::new(LunarCrushClient::new(
            http.clone(),
            creds.lunarcrush_api_key.clone(),
        )?),
        Box::new(TwitterClient::new(
            http.clone(),
            creds.twitter_bearer_token.clone(),
        )?),
        Box::new(RssFeedClient::new(
            http,
            &config.rss_feed_url,
            Language::Arabic,
        )?),
    ])
}
