//! Presentation-facing events.

use crate::core::session::SessionEntry;
use di::{inject, injectable};
use log::debug;
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum ChatEvent {
    TurnSubmitted {
        turn_id: Uuid,
        session_id: Uuid,
        question: SessionEntry,
    },
    TurnCompleted {
        turn_id: Uuid,
        session_id: Uuid,
        question: SessionEntry,
        answer: SessionEntry,
    },
    HistoryLoaded {
        count: usize,
    },
    MessageDeleted {
        id: Uuid,
    },
    HistoryCleared {
        count: u64,
    },
}

impl ChatEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::TurnSubmitted { .. } => "turn_submitted",
            ChatEvent::TurnCompleted { .. } => "turn_completed",
            ChatEvent::HistoryLoaded { .. } => "history_loaded",
            ChatEvent::MessageDeleted { .. } => "message_deleted",
            ChatEvent::HistoryCleared { .. } => "history_cleared",
        }
    }
}

pub struct EventBus {
    sender: broadcast::Sender<ChatEvent>,
}

#[injectable]
impl EventBus {
    #[inject]
    pub fn create() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }
}

impl EventBus {
    pub fn publish(&self, event: ChatEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            debug!("no subscribers for {name}");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::create();
        let mut receiver = bus.subscribe();

        bus.publish(ChatEvent::HistoryCleared { count: 3 });

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.name(), "history_cleared");
        assert!(matches!(event, ChatEvent::HistoryCleared { count: 3 }));
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let bus = EventBus::create();
        bus.publish(ChatEvent::HistoryLoaded { count: 0 });
    }
}
