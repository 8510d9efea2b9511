//! Unit tests for the session header extractor

use axum::extract::FromRequestParts;
use axum::body::to_bytes;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value;
use tokio_gemini_chat_api::api::ExtractSession;
use tokio_gemini_chat_api::api::error::ApiError;
use uuid::Uuid;

/// Renders a rejection the way a handler would.
async fn rejection_body(error: ApiError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_extract_session_valid_uuid() {
    let session_id = Uuid::new_v4();
    let req = Request::builder()
        .header("X-Session-ID", session_id.to_string())
        .body(())
        .unwrap();

    let (mut parts, _) = req.into_parts();
    let result = ExtractSession::from_request_parts(&mut parts, &()).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().0, session_id);
}

#[tokio::test]
async fn test_extract_session_header_is_case_insensitive() {
    let session_id = Uuid::new_v4();
    let req = Request::builder()
        .header("x-session-id", session_id.to_string())
        .body(())
        .unwrap();

    let (mut parts, _) = req.into_parts();
    let result = ExtractSession::from_request_parts(&mut parts, &()).await;

    assert_eq!(result.unwrap().0, session_id);
}

#[tokio::test]
async fn test_extract_session_missing_header() {
    let req = Request::builder().body(()).unwrap();

    let (mut parts, _) = req.into_parts();
    let result = ExtractSession::from_request_parts(&mut parts, &()).await;

    let (status, json) = rejection_body(result.unwrap_err()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "`X-Session-ID` header is missing");
}

#[tokio::test]
async fn test_extract_session_invalid_uuid() {
    let req = Request::builder()
        .header("X-Session-ID", "not-a-uuid")
        .body(())
        .unwrap();

    let (mut parts, _) = req.into_parts();
    let result = ExtractSession::from_request_parts(&mut parts, &()).await;

    let (status, json) = rejection_body(result.unwrap_err()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "invalid session id");
}

#[tokio::test]
async fn test_extract_session_invalid_utf8() {
    use axum::http::HeaderValue;

    let mut req = Request::builder().body(()).unwrap();
    req.headers_mut().insert(
        "X-Session-ID",
        HeaderValue::from_bytes(&[0xFF, 0xFE]).unwrap(),
    );

    let (mut parts, _) = req.into_parts();
    let result = ExtractSession::from_request_parts(&mut parts, &()).await;

    let (status, json) = rejection_body(result.unwrap_err()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "invalid session id");
}
