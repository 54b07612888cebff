//! Shared HTTP plumbing for the source clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::SourceError;

/// Builds the `reqwest::Client` shared by every source client.
///
/// Every request inherits `timeout`; a hung call would otherwise stall the
/// whole cycle.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the client cannot be constructed.
pub fn build_http_client(timeout: Duration, user_agent: &str) -> Result<Client, SourceError> {
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses a base URL, normalising it to end with exactly one slash so that
/// [`Url::join`] appends to the path instead of replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, SourceError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SourceError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Joins `path` onto a normalised base URL.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, SourceError> {
    base.join(path).map_err(|e| SourceError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Sends the request and maps non-2xx statuses to typed errors.
///
/// Errors carry only the URL path; query strings may hold credentials.
pub(crate) async fn send_checked(request: RequestBuilder) -> Result<Response, SourceError> {
    let response = request.send().await.map_err(|e| e.without_url())?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let endpoint = response.url().path().to_owned();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return Err(SourceError::RateLimited {
            endpoint,
            retry_after_secs,
        });
    }

    Err(SourceError::UnexpectedStatus {
        status: status.as_u16(),
        endpoint,
    })
}

/// Sends the request, checks the status, and deserializes the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    context: &str,
) -> Result<T, SourceError> {
    let body = get_text(request).await?;
    serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Sends the request, checks the status, and returns the body as text.
pub(crate) async fn get_text(request: RequestBuilder) -> Result<String, SourceError> {
    let response = send_checked(request).await?;
    let body = response.text().await.map_err(|e| e.without_url())?;
    Ok(body)
}
