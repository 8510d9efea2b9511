//! Chat history endpoints

use crate::api::{ApiJson, ApiPath};
use crate::api::error::{ApiError, ApiResult};
use crate::api::schemas::{self, ClearedChats, CreateChat, StatusMessage};
use crate::core::traits::ChatService;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use di_axum::Inject;
use log::error;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_chats).post(create_chat).delete(clear_chats),
        )
        .route("/:id", delete(delete_chat))
}

async fn list_chats(
    Inject(chat_service): Inject<dyn ChatService>,
) -> ApiResult<Json<Vec<schemas::Message>>> {
    let messages = chat_service.list_history().await.map_err(|e| {
        error!("failed to list chats: {e}");
        ApiError::Internal("Error fetching chats".into())
    })?;

    Ok(Json(
        messages.into_iter().map(schemas::Message::from).collect(),
    ))
}

async fn create_chat(
    Inject(chat_service): Inject<dyn ChatService>,
    ApiJson(chat): ApiJson<CreateChat>,
) -> ApiResult<(StatusCode, Json<schemas::Message>)> {
    let message = chat_service
        .record_message(chat.kind.into(), chat.content)
        .await
        .map_err(|_| ApiError::Internal("Error saving chat".into()))?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

async fn delete_chat(
    Inject(chat_service): Inject<dyn ChatService>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<StatusMessage>> {
    chat_service.delete_message(id).await?;
    Ok(Json(StatusMessage::new("Chat deleted")))
}

async fn clear_chats(
    Inject(chat_service): Inject<dyn ChatService>,
) -> ApiResult<Json<ClearedChats>> {
    let deleted = chat_service.clear_history().await?;
    Ok(Json(ClearedChats {
        message: "All chats deleted".into(),
        deleted,
    }))
}
