//! LunarCrush social sentiment lookup.

use async_trait::async_trait;
use newsbot_core::{FetchOutcome, SourceKind, SourceRecord};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{into_outcome, SourceClient};
use crate::error::SourceError;
use crate::http::{endpoint_url, get_json, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://lunarcrush.com/";
const COINS_PATH: &str = "api4/public/coins/list/v1";
const COIN_LIMIT: &str = "10";

#[derive(Debug, Deserialize)]
struct CoinsResponse {
    #[serde(default)]
    data: Vec<Coin>,
}

#[derive(Debug, Deserialize)]
struct Coin {
    symbol: Option<String>,
    /// Percentage of positive posts, 0-100.
    sentiment: Option<f64>,
}

/// Client for per-asset sentiment of the top coins by market cap.
pub struct LunarCrushClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl LunarCrushClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] only if the built-in URL is broken.
    pub fn new(client: Client, api_key: Option<String>) -> Result<Self, SourceError> {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        api_key: Option<String>,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            api_key,
        })
    }

    async fn fetch_records(&self) -> Result<Vec<SourceRecord>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::MissingCredential {
                kind: SourceKind::Sentiment,
                var: "LUNARCRUSH_API_KEY",
            });
        };

        let mut url = endpoint_url(&self.base_url, COINS_PATH)?;
        url.query_pairs_mut()
            .append_pair("sort", "sentiment")
            .append_pair("limit", COIN_LIMIT);

        let body: CoinsResponse = get_json(
            self.client.get(url).bearer_auth(api_key),
            "lunarcrush coins",
        )
        .await?;
        parse_coins(body)
    }
}

fn parse_coins(body: CoinsResponse) -> Result<Vec<SourceRecord>, SourceError> {
    let records: Vec<SourceRecord> = body
        .data
        .into_iter()
        .filter_map(|coin| match (coin.symbol, coin.sentiment) {
            (Some(symbol), Some(score)) if !symbol.trim().is_empty() && score.is_finite() => {
                Some(SourceRecord::Sentiment {
                    asset: symbol.trim().to_uppercase(),
                    score,
                })
            }
            _ => None,
        })
        .collect();

    if records.is_empty() {
        return Err(SourceError::EmptyResponse {
            context: "lunarcrush coins".to_owned(),
        });
    }
    Ok(records)
}

#[async_trait]
impl SourceClient for LunarCrushClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Sentiment
    }

    async fn fetch(&self) -> FetchOutcome {
        into_outcome(self.fetch_records().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_coins_with_symbol_and_score() {
        let body: CoinsResponse = serde_json::from_str(
            r#"{"data": [
                {"symbol": "btc", "name": "Bitcoin", "sentiment": 81.0},
                {"symbol": "ETH", "sentiment": null},
                {"name": "Nameless", "sentiment": 50}
            ]}"#,
        )
        .unwrap();
        let records = parse_coins(body).unwrap();
        assert_eq!(
            records,
            vec![SourceRecord::Sentiment {
                asset: "BTC".to_owned(),
                score: 81.0,
            }]
        );
    }

    #[test]
    fn no_usable_coins_is_empty_response() {
        let body: CoinsResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(matches!(
            parse_coins(body),
            Err(SourceError::EmptyResponse { .. })
        ));
    }
}
