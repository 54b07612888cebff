//! X/Twitter recent search for English and Arabic crypto posts.
//!
//! One request covers both languages; the summarizer splits them back out
//! by the `lang` field the API reports for each post.

use std::collections::HashMap;

use async_trait::async_trait;
use newsbot_core::{FetchOutcome, Language, SourceKind, SourceRecord};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{into_outcome, SourceClient};
use crate::error::SourceError;
use crate::http::{endpoint_url, get_json, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com/";
const SEARCH_PATH: &str = "2/tweets/search/recent";

/// English posts outnumber Arabic ones by a wide margin; a larger page makes
/// it likely that one request returns both.
const MAX_RESULTS: &str = "50";

const SEARCH_QUERY: &str =
    "(crypto OR bitcoin OR عملة OR بيتكوين OR كريبتو) (lang:en OR lang:ar) -is:retweet";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    includes: Option<Includes>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    text: String,
    lang: Option<String>,
    author_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    username: String,
}

/// Client for the v2 recent-search endpoint using an app bearer token.
pub struct TwitterClient {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl TwitterClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] only if the built-in URL is broken.
    pub fn new(client: Client, bearer_token: Option<String>) -> Result<Self, SourceError> {
        Self::with_base_url(client, bearer_token, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        bearer_token: Option<String>,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            bearer_token,
        })
    }

    async fn fetch_records(&self) -> Result<Vec<SourceRecord>, SourceError> {
        let Some(token) = self.bearer_token.as_deref() else {
            return Err(SourceError::MissingCredential {
                kind: SourceKind::Posts,
                var: "TWITTER_API_KEY",
            });
        };

        let mut url = endpoint_url(&self.base_url, SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("query", SEARCH_QUERY)
            .append_pair("max_results", MAX_RESULTS)
            .append_pair("tweet.fields", "lang,author_id")
            .append_pair("expansions", "author_id")
            .append_pair("user.fields", "username");

        let body: SearchResponse =
            get_json(self.client.get(url).bearer_auth(token), "twitter search").await?;
        parse_search(body)
    }
}

fn parse_search(body: SearchResponse) -> Result<Vec<SourceRecord>, SourceError> {
    let usernames: HashMap<String, String> = body
        .includes
        .map(|inc| inc.users)
        .unwrap_or_default()
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let records: Vec<SourceRecord> = body
        .data
        .into_iter()
        .filter(|tweet| !tweet.text.trim().is_empty())
        .map(|tweet| SourceRecord::Post {
            author: tweet
                .author_id
                .as_ref()
                .and_then(|id| usernames.get(id))
                .cloned(),
            language: tweet
                .lang
                .as_deref()
                .map_or(Language::Other("und".to_owned()), Language::from_code),
            text: tweet.text.split_whitespace().collect::<Vec<_>>().join(" "),
        })
        .collect();

    if records.is_empty() {
        return Err(SourceError::EmptyResponse {
            context: "twitter search".to_owned(),
        });
    }
    Ok(records)
}

#[async_trait]
impl SourceClient for TwitterClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Posts
    }

    async fn fetch(&self) -> FetchOutcome {
        into_outcome(self.fetch_records().await)
    }
}
