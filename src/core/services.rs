//! Implementations for the service the app needs.
//!

use crate::core::events::{ChatEvent, EventBus};
use crate::core::session::SessionStore;
use crate::core::traits::ChatService;
use crate::infrastructure::entities::{Message, MessageKind};
use crate::infrastructure::traits::{ChatRepository, StoreError};
use async_trait::async_trait;
use di::{Ref, injectable};
use log::info;
use uuid::Uuid;

#[injectable(ChatService)]
pub struct MyChatService {
    repo: Ref<dyn ChatRepository>,
    sessions: Ref<SessionStore>,
    events: Ref<EventBus>,
}

#[async_trait]
impl ChatService for MyChatService {
    async fn list_history(&self) -> Result<Vec<Message>, StoreError> {
        let messages = self.repo.list_all().await?;
        self.events.publish(ChatEvent::HistoryLoaded {
            count: messages.len(),
        });
        Ok(messages)
    }

    async fn delete_message(&self, id: Uuid) -> Result<(), StoreError> {
        self.repo.delete_by_id(id).await?;
        self.sessions.forget_message(id);
        self.events.publish(ChatEvent::MessageDeleted { id });
        Ok(())
    }

    async fn clear_history(&self) -> Result<u64, StoreError> {
        let count = self.repo.delete_all().await?;
        self.sessions.forget_persisted();
        self.events.publish(ChatEvent::HistoryCleared { count });
        info!("cleared {count} chats");
        Ok(count)
    }

    async fn record_message(
        &self,
        kind: MessageKind,
        content: String,
    ) -> Result<Message, StoreError> {
        self.repo.insert(kind, content).await
    }
}
