//! DB Repository abstractions

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Message, MessageKind};
use crate::infrastructure::traits::{ChatRepository, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::error;
use uuid::Uuid;

#[injectable(ChatRepository)]
pub struct DbChatRepository {
    connection: Ref<DatabaseConnection>,
}

fn log_failure(e: sqlx::Error) -> StoreError {
    error!("{e}");
    StoreError::Database(e)
}

#[async_trait]
impl ChatRepository for DbChatRepository {
    async fn list_all(&self) -> Result<Vec<Message>, StoreError> {
        sqlx::query_as(
            "SELECT id, kind, content, created_at FROM chats ORDER BY created_at ASC, seq ASC",
        )
        .fetch_all(&**self.connection)
        .await
        .map_err(log_failure)
    }

    async fn insert(&self, kind: MessageKind, content: String) -> Result<Message, StoreError> {
        sqlx::query_as(
            "INSERT INTO chats (id, kind, content, created_at) VALUES (?, ?, ?, ?) RETURNING id, kind, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&**self.connection)
        .await
        .map_err(log_failure)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id)
            .execute(&**self.connection)
            .await
            .map_err(log_failure)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        sqlx::query("DELETE FROM chats")
            .execute(&**self.connection)
            .await
            .map(|result| result.rows_affected())
            .map_err(log_failure)
    }
}
