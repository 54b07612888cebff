//! FRED economic time-series point lookup.

use async_trait::async_trait;
use chrono::NaiveDate;
use newsbot_core::{FetchOutcome, SourceKind, SourceRecord};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{into_outcome, SourceClient};
use crate::error::SourceError;
use crate::http::{endpoint_url, get_json, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/";
const OBSERVATIONS_PATH: &str = "fred/series/observations";

/// Recent observations requested per call. FRED reports missing points as
/// `"."`, so a few are fetched to find the latest real value.
const OBSERVATION_WINDOW: &str = "5";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Human label and unit suffix for well-known series; unknown ids render as-is.
fn series_label(series_id: &str) -> (String, &'static str) {
    match series_id {
        "UNRATE" => ("Unemployment Rate".to_owned(), "%"),
        "FEDFUNDS" => ("Federal Funds Rate".to_owned(), "%"),
        "DGS10" => ("10-Year Treasury Yield".to_owned(), "%"),
        "CPIAUCSL" => ("Consumer Price Index".to_owned(), ""),
        other => (other.to_owned(), ""),
    }
}

/// Client for the latest observation of one FRED series.
pub struct FredClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    series_id: String,
}

impl FredClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] only if the built-in URL is broken.
    pub fn new(
        client: Client,
        api_key: Option<String>,
        series_id: &str,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(client, api_key, series_id, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        api_key: Option<String>,
        series_id: &str,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            api_key,
            series_id: series_id.to_owned(),
        })
    }

    async fn fetch_records(&self) -> Result<Vec<SourceRecord>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::MissingCredential {
                kind: SourceKind::EconomicIndicator,
                var: "FRED_API_KEY",
            });
        };

        let mut url = endpoint_url(&self.base_url, OBSERVATIONS_PATH)?;
        url.query_pairs_mut()
            .append_pair("series_id", &self.series_id)
            .append_pair("api_key", api_key)
            .append_pair("file_type", "json")
            .append_pair("sort_order", "desc")
            .append_pair("limit", OBSERVATION_WINDOW);

        let body: ObservationsResponse =
            get_json(self.client.get(url), "fred observations").await?;
        latest_observation(&self.series_id, body).map(|record| vec![record])
    }
}

/// Picks the newest observation carrying a value. Expects newest-first order.
fn latest_observation(
    series_id: &str,
    body: ObservationsResponse,
) -> Result<SourceRecord, SourceError> {
    if let Some(message) = body.error_message {
        return Err(SourceError::ApiError {
            context: "fred".to_owned(),
            message,
        });
    }

    let (name, unit) = series_label(series_id);
    body.observations
        .into_iter()
        .filter(|obs| obs.value.trim() != ".")
        .find_map(|obs| {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").ok()?;
            Some(SourceRecord::Indicator {
                name: name.clone(),
                value: format!("{}{unit}", obs.value.trim()),
                date,
            })
        })
        .ok_or_else(|| SourceError::EmptyResponse {
            context: format!("fred series {series_id}"),
        })
}

#[async_trait]
impl SourceClient for FredClient {
    fn kind(&self) -> SourceKind {
        SourceKind::EconomicIndicator
    }

    async fn fetch(&self) -> FetchOutcome {
        into_outcome(self.fetch_records().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ObservationsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn skips_missing_points_and_labels_known_series() {
        let body = parse(
            r#"{"observations": [
                {"date": "2026-10-01", "value": "."},
                {"date": "2026-09-01", "value": "4.1"}
            ]}"#,
        );
        let record = latest_observation("UNRATE", body).unwrap();
        assert_eq!(
            record,
            SourceRecord::Indicator {
                name: "Unemployment Rate".to_owned(),
                value: "4.1%".to_owned(),
                date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            }
        );
    }

    #[test]
    fn unknown_series_uses_its_id() {
        let body = parse(r#"{"observations": [{"date": "2026-01-01", "value": "123.4"}]}"#);
        match latest_observation("GDP", body).unwrap() {
            SourceRecord::Indicator { name, value, .. } => {
                assert_eq!(name, "GDP");
                assert_eq!(value, "123.4");
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn only_missing_points_is_empty_response() {
        let body = parse(r#"{"observations": [{"date": "2026-10-01", "value": "."}]}"#);
        assert!(matches!(
            latest_observation("UNRATE", body),
            Err(SourceError::EmptyResponse { .. })
        ));
    }

    #[test]
    fn error_message_in_body_is_api_error() {
        let body = parse(r#"{"error_code": 400, "error_message": "Bad Request.  The series does not exist."}"#);
        assert!(matches!(
            latest_observation("NOPE", body),
            Err(SourceError::ApiError { .. })
        ));
    }
}
