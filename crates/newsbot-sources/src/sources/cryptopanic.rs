//! CryptoPanic news listing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newsbot_core::{FetchOutcome, SourceKind, SourceRecord};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{into_outcome, SourceClient};
use crate::error::SourceError;
use crate::http::{endpoint_url, get_json, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://cryptopanic.com/";
const POSTS_PATH: &str = "api/developer/v2/posts/";
const MAX_RECORDS: usize = 20;

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<Post>,
    /// Present on application-level errors (bad token, plan limits).
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    url: Option<String>,
    original_url: Option<String>,
    published_at: Option<String>,
}

/// Client for the CryptoPanic posts endpoint (first page only).
pub struct CryptoPanicClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl CryptoPanicClient {
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
                kind: SourceKind::News,
                var: "CRYPTOPANIC_API_KEY",
            });
        };

        let mut url = endpoint_url(&self.base_url, POSTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("auth_token", api_key)
            .append_pair("public", "true");

        let body: PostsResponse = get_json(self.client.get(url), "cryptopanic posts").await?;
        parse_posts(body)
    }
}

fn parse_posts(body: PostsResponse) -> Result<Vec<SourceRecord>, SourceError> {
    let records: Vec<SourceRecord> = body
        .results
        .into_iter()
        .filter_map(|post| {
            let headline = post.title.map(|t| t.trim().to_owned())?;
            if headline.is_empty() {
                return None;
            }
            let published_at = post
                .published_at
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|dt| dt.with_timezone(&Utc));
            Some(SourceRecord::News {
                headline,
                url: post.url.or(post.original_url),
                published_at,
            })
        })
        .take(MAX_RECORDS)
        .collect();

    if records.is_empty() {
        return Err(match body.info {
            Some(message) => SourceError::ApiError {
                context: "cryptopanic".to_owned(),
                message,
            },
            None => SourceError::EmptyResponse {
                context: "cryptopanic posts".to_owned(),
            },
        });
    }
    Ok(records)
}

#[async_trait]
impl SourceClient for CryptoPanicClient {
    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    async fn fetch(&self) -> FetchOutcome {
        into_outcome(self.fetch_records().await)
    }
}
