//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities;
use crate::infrastructure::entities::MessageKind;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chat {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The single `chats` collection.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// All messages, oldest first.
    async fn list_all(&self) -> Result<Vec<entities::Message>, StoreError>;

    /// Appends a message; the store assigns its id and timestamp.
    async fn insert(
        &self,
        kind: MessageKind,
        content: String,
    ) -> Result<entities::Message, StoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;

    /// Returns the number of deleted messages.
    async fn delete_all(&self) -> Result<u64, StoreError>;
}
