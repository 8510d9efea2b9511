//! Request and response bodies.

use crate::core::events::ChatEvent;
use crate::core::orchestrator::{Turn, TurnState};
use crate::core::session::SessionEntry;
use crate::infrastructure::entities;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Question,
    Answer,
}

impl From<entities::MessageKind> for MessageKind {
    fn from(kind: entities::MessageKind) -> Self {
        match kind {
            entities::MessageKind::Question => MessageKind::Question,
            entities::MessageKind::Answer => MessageKind::Answer,
        }
    }
}

impl From<MessageKind> for entities::MessageKind {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Question => entities::MessageKind::Question,
            MessageKind::Answer => entities::MessageKind::Answer,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct Message {
    pub id: Uuid,
    pub kind: MessageKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<entities::Message> for Message {
    fn from(message: entities::Message) -> Self {
        Message {
            id: message.id,
            kind: message.kind.into(),
            content: message.content,
            created_at: message.created_at,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateChat {
    pub kind: MessageKind,
    pub content: String,
}

#[derive(Serialize, Debug)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ClearedChats {
    pub message: String,
    pub deleted: u64,
}

#[derive(Serialize, Debug, Clone)]
pub struct SessionMessage {
    pub key: Uuid,
    pub kind: MessageKind,
    pub content: String,
    pub message_id: Option<Uuid>,
}

impl From<SessionEntry> for SessionMessage {
    fn from(entry: SessionEntry) -> Self {
        SessionMessage {
            key: entry.key,
            kind: entry.kind.into(),
            content: entry.content,
            message_id: entry.message_id,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SubmitTurn {
    pub text: String,
}

#[derive(Serialize, Debug)]
pub struct TurnResult {
    pub turn_id: Uuid,
    pub question: SessionMessage,
    pub answer: SessionMessage,
    /// Every state the turn passed through, ending in `done`.
    pub states: Vec<TurnState>,
}

impl From<Turn> for TurnResult {
    fn from(turn: Turn) -> Self {
        TurnResult {
            turn_id: turn.turn_id,
            question: turn.question.into(),
            answer: turn.answer.into(),
            states: turn.states,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct SessionTranscript {
    pub session_id: Uuid,
    pub messages: Vec<SessionMessage>,
}

#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Serialize, Debug)]
pub struct ChatReplyError {
    pub error: String,
}

/// Payload of one server-sent event; the event name carries the variant.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum EventPayload {
    TurnSubmitted {
        turn_id: Uuid,
        session_id: Uuid,
        question: SessionMessage,
    },
    TurnCompleted {
        turn_id: Uuid,
        session_id: Uuid,
        question: SessionMessage,
        answer: SessionMessage,
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

impl From<ChatEvent> for EventPayload {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::TurnSubmitted {
                turn_id,
                session_id,
                question,
            } => EventPayload::TurnSubmitted {
                turn_id,
                session_id,
                question: question.into(),
            },
            ChatEvent::TurnCompleted {
                turn_id,
                session_id,
                question,
                answer,
            } => EventPayload::TurnCompleted {
                turn_id,
                session_id,
                question: question.into(),
                answer: answer.into(),
            },
            ChatEvent::HistoryLoaded { count } => EventPayload::HistoryLoaded { count },
            ChatEvent::MessageDeleted { id } => EventPayload::MessageDeleted { id },
            ChatEvent::HistoryCleared { count } => EventPayload::HistoryCleared { count },
        }
    }
}
