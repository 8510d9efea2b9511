//! Gemini client tests against a local fake provider.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_gemini_chat_api::core::completion::{CompletionError, GeminiClient};
use tokio_gemini_chat_api::core::config::CompletionConfig;
use tokio_gemini_chat_api::core::traits::CompletionClient;
use tokio_test::{assert_err, assert_ok};

#[derive(Debug, Clone)]
struct SeenRequest {
    action: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    reply: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn generate_content(
    State(fake): State<FakeGemini>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    fake.seen.lock().unwrap().push(SeenRequest {
        action,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body,
    });
    (fake.status, fake.reply.clone())
}

/// Starts a fake provider and returns a client pointed at it.
async fn fake_gemini(
    status: StatusCode,
    reply: impl Into<String>,
) -> (GeminiClient, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let fake = FakeGemini {
        status,
        reply: reply.into(),
        seen: seen.clone(),
    };

    let app = Router::new()
        .route("/v1beta/models/:action", post(generate_content))
        .with_state(fake);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = GeminiClient::new(CompletionConfig {
        api_key: "test-key".into(),
        model: "gemini-test".into(),
        base_url: format!("http://{addr}/v1beta"),
        max_output_tokens: 123,
        temperature: 0.25,
    });

    (client, seen)
}

fn candidates(texts: &[&str]) -> String {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": texts.iter().map(|t| json!({ "text": t })).collect::<Vec<_>>()
            },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_complete_returns_first_candidate_text() {
    let (client, _) = fake_gemini(StatusCode::OK, candidates(&["4"])).await;

    let answer = assert_ok!(client.complete("2+2?").await);

    assert_eq!(answer, "4");
}

#[tokio::test]
async fn test_complete_sends_prompt_and_fixed_generation_config() {
    let (client, seen) = fake_gemini(StatusCode::OK, candidates(&["hi"])).await;

    assert_ok!(client.complete("hello").await);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.action, "gemini-test:generateContent");
    assert_eq!(request.api_key.as_deref(), Some("test-key"));
    assert_eq!(request.body["contents"][0]["parts"][0]["text"], "hello");
    assert_eq!(request.body["generationConfig"]["maxOutputTokens"], 123);
    assert_eq!(request.body["generationConfig"]["temperature"], 0.25);
}

#[tokio::test]
async fn test_blank_prompt_makes_no_request() {
    let (client, seen) = fake_gemini(StatusCode::OK, candidates(&["unused"])).await;

    let error = assert_err!(client.complete("  ").await);

    assert!(matches!(error, CompletionError::InvalidInput));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let (client, _) = fake_gemini(
        StatusCode::FORBIDDEN,
        json!({ "error": { "code": 403, "message": "API key not valid" } }).to_string(),
    )
    .await;

    let error = assert_err!(client.complete("hello").await);

    match error {
        CompletionError::UpstreamError { status, body } => {
            assert_eq!(status.as_u16(), 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_response_without_candidates_is_upstream_error() {
    let (client, _) = fake_gemini(StatusCode::OK, json!({ "candidates": [] }).to_string()).await;

    let error = assert_err!(client.complete("hello").await);

    assert!(matches!(error, CompletionError::UpstreamError { .. }));
}

#[tokio::test]
async fn test_undecodable_response_is_network_failure() {
    let (client, _) = fake_gemini(StatusCode::OK, "not json").await;

    let error = assert_err!(client.complete("hello").await);

    assert!(matches!(error, CompletionError::NetworkFailure(_)));
}

#[tokio::test]
async fn test_unreachable_provider_is_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GeminiClient::new(CompletionConfig {
        base_url: format!("http://{addr}/v1beta"),
        ..CompletionConfig::default()
    });

    let error = assert_err!(client.complete("hello").await);

    assert!(matches!(error, CompletionError::NetworkFailure(_)));
}
