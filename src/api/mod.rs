use crate::api::error::ApiError;
use async_trait::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use uuid::Uuid;

pub mod chats;
pub mod error;
pub mod events;
pub mod schemas;
pub mod turns;

const X_SESSION_ID: &str = "X-Session-ID";

/// Every API route, ready for `with_provider`.
pub fn router() -> Router {
    Router::new()
        .nest("/api/chats", chats::router())
        .nest("/api/turns", turns::router())
        .route("/api/session", get(turns::session_transcript))
        .route("/api/events", get(events::subscribe))
        .route("/chat", post(turns::chat))
}

/// The page-load session a request belongs to.
#[derive(Debug)]
pub struct ExtractSession(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ApiError> {
        let invalid = || ApiError::Validation("invalid session id".into());

        if let Some(session_id) = parts.headers.get(X_SESSION_ID) {
            let session_id = session_id.to_str().map_err(|_| invalid())?;
            let session_id = Uuid::from_str(session_id).map_err(|_| invalid())?;
            Ok(ExtractSession(session_id))
        } else {
            Err(ApiError::Validation(
                "`X-Session-ID` header is missing".into(),
            ))
        }
    }
}

/// `Json` whose rejection is an [`ApiError`].
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// `Path` whose rejection is an [`ApiError`].
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    T: Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}
