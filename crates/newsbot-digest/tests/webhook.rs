//! Integration tests for webhook delivery using wiremock HTTP mocks.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use newsbot_core::{FetchOutcome, SourceKind, SourceRecord};
use newsbot_digest::{summarize, DeliveryError, DeliverySettings, DeliverySink, Digest};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOOK_PATH: &str = "/api/webhooks/123/token";

fn settings(max_message_chars: usize) -> DeliverySettings {
    DeliverySettings {
        max_message_chars,
        max_retries: 3,
        backoff_base_ms: 0,
    }
}

fn sink(server: &MockServer, settings: DeliverySettings) -> DeliverySink {
    DeliverySink::new(
        reqwest::Client::new(),
        &format!("{}{HOOK_PATH}", server.uri()),
        settings,
    )
    .expect("mock server URL is valid")
}

fn small_digest() -> Digest {
    let mut outcomes = BTreeMap::new();
    outcomes.insert(
        SourceKind::Sentiment,
        FetchOutcome::Success(vec![SourceRecord::Sentiment {
            asset: "BTC".to_owned(),
            score: 71.0,
        }]),
    );
    summarize(&outcomes, Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap())
}

fn large_digest() -> Digest {
    let news = (0..5)
        .map(|i| SourceRecord::News {
            headline: format!("{i} {}", "long headline text ".repeat(30)),
            url: None,
            published_at: None,
        })
        .collect();
    let mut outcomes = BTreeMap::new();
    outcomes.insert(SourceKind::News, FetchOutcome::Success(news));
    summarize(&outcomes, Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap())
}

#[tokio::test]
async fn posts_digest_as_json_content() {
    let server = MockServer::start().await;
    let digest = small_digest();
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .and(body_partial_json(serde_json::json!({
            "content": digest.as_str(),
            "allowed_mentions": {"parse": []}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let report = sink(&server, settings(2_000)).deliver(&digest).await.unwrap();
    assert_eq!(report.chunks, 1);
    assert_eq!(report.retries, 0);
}

#[tokio::test]
async fn oversized_digest_is_sent_in_ordered_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let digest = large_digest();
    assert!(digest.char_len() > 2_000);
    let report = sink(&server, settings(2_000)).deliver(&digest).await.unwrap();
    assert!(report.chunks >= 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), report.chunks);
    let contents: Vec<String> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["content"].as_str().unwrap().to_owned()
        })
        .collect();
    assert!(contents.iter().all(|c| c.chars().count() <= 2_000));
    assert_eq!(contents.concat(), digest.as_str());
}

#[tokio::test]
async fn server_error_then_success_counts_one_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let report = sink(&server, settings(2_000))
        .deliver(&small_digest())
        .await
        .unwrap();
    assert_eq!(report.chunks, 1);
    assert_eq!(report.retries, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = sink(&server, settings(2_000))
        .deliver(&small_digest())
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::UnexpectedStatus { status: 404 }));
}

#[tokio::test]
async fn persistent_failure_gives_up_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let err = sink(&server, settings(2_000))
        .deliver(&small_digest())
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::UnexpectedStatus { status: 503 }));
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(serde_json::json!({"message": "slow down", "retry_after": 0.01})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let report = sink(&server, settings(2_000))
        .deliver(&small_digest())
        .await
        .unwrap();
    assert_eq!(report.retries, 1);
}

#[tokio::test]
async fn failed_chunk_stops_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let result = sink(&server, settings(2_000)).deliver(&large_digest()).await;
    assert!(result.is_err());
}
