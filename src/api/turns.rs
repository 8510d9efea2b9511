//! Chat turn endpoints

use crate::api::{ApiJson, ExtractSession};
use crate::api::error::ApiResult;
use crate::api::schemas::{
    ChatReply, ChatReplyError, ChatRequest, SessionMessage, SessionTranscript, SubmitTurn,
    TurnResult,
};
use crate::core::completion::CompletionError;
use crate::core::session::SessionStore;
use crate::core::traits::{CompletionClient, TurnOrchestrator};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;
use log::{error, info};

pub fn router() -> Router {
    Router::new().route("/", post(submit_turn))
}

async fn submit_turn(
    Inject(orchestrator): Inject<dyn TurnOrchestrator>,
    ExtractSession(session_id): ExtractSession,
    ApiJson(turn): ApiJson<SubmitTurn>,
) -> ApiResult<Json<TurnResult>> {
    let turn = orchestrator.submit_turn(session_id, turn.text).await?;
    info!(
        "turn {} for session {session_id} ended {:?}",
        turn.turn_id,
        turn.state()
    );
    Ok(Json(turn.into()))
}

pub(crate) async fn session_transcript(
    Inject(sessions): Inject<SessionStore>,
    ExtractSession(session_id): ExtractSession,
) -> Json<SessionTranscript> {
    Json(SessionTranscript {
        session_id,
        messages: sessions
            .snapshot(session_id)
            .into_iter()
            .map(SessionMessage::from)
            .collect(),
    })
}

/// Direct completion, nothing persisted. Failures are reported, not masked.
pub(crate) async fn chat(
    Inject(completion): Inject<dyn CompletionClient>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ChatReplyError>)> {
    match completion.complete(&request.message).await {
        Ok(reply) => Ok(Json(ChatReply { reply })),
        Err(CompletionError::InvalidInput) => Err((
            StatusCode::BAD_REQUEST,
            Json(ChatReplyError {
                error: "Message cannot be empty".into(),
            }),
        )),
        Err(e) => {
            error!("completion error: {e}");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ChatReplyError {
                    error: "Failed to get response from completion provider".into(),
                }),
            ))
        }
    }
}
