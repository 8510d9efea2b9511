//! DI "Interfaces"

use crate::core::completion::CompletionError;
use crate::core::orchestrator::{Turn, TurnError};
use crate::infrastructure::entities;
use crate::infrastructure::entities::MessageKind;
use crate::infrastructure::traits::StoreError;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Lists every persisted message, oldest first.
    async fn list_history(&self) -> Result<Vec<entities::Message>, StoreError>;

    /// Deletes one message and drops it from every session view.
    ///
    /// Returns `StoreError::NotFound` if no message has this id.
    async fn delete_message(&self, id: Uuid) -> Result<(), StoreError>;

    /// Deletes every message, returning how many were removed.
    async fn clear_history(&self) -> Result<u64, StoreError>;

    /// Persists a single message of any kind.
    async fn record_message(
        &self,
        kind: MessageKind,
        content: String,
    ) -> Result<entities::Message, StoreError>;

    /// Persists the question of a turn.
    async fn record_question(&self, content: String) -> Result<entities::Message, StoreError> {
        self.record_message(MessageKind::Question, content).await
    }

    /// Persists the answer of a turn.
    async fn record_answer(&self, content: String) -> Result<entities::Message, StoreError> {
        self.record_message(MessageKind::Answer, content).await
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generates text for `prompt` in a single, non-streaming call.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[async_trait]
pub trait TurnOrchestrator: Send + Sync {
    /// Runs one question/answer turn for the given session.
    ///
    /// Only blank input is an error. Store and completion failures degrade
    /// into an unpersisted entry or the fallback answer.
    async fn submit_turn(&self, session_id: Uuid, text: String) -> Result<Turn, TurnError>;
}
