//! Chat turn orchestration.
//!
//! One turn persists the question, asks the completion provider, and persists
//! the answer, in that order. Only blank input fails a turn: store failures
//! leave an unpersisted entry in the session view, and completion failures are
//! answered with [`FALLBACK_ANSWER`].

use crate::core::events::{ChatEvent, EventBus};
use crate::core::session::{SessionEntry, SessionStore};
use crate::core::traits::{ChatService, CompletionClient, TurnOrchestrator};
use crate::infrastructure::entities::MessageKind;
use async_trait::async_trait;
use di::{Ref, injectable};
use log::{debug, error, warn};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Answer content used whenever the completion call fails.
pub const FALLBACK_ANSWER: &str = "⚠️ Sorry, something went wrong!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("Message cannot be empty")]
    EmptyInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    Submitting,
    AwaitingCompletion,
    Persisting,
    Done,
    Failed,
}

impl TurnState {
    pub fn can_advance_to(self, next: TurnState) -> bool {
        use TurnState::*;

        matches!(
            (self, next),
            (Idle, Submitting)
                | (Submitting, AwaitingCompletion)
                | (AwaitingCompletion, Persisting)
                | (Persisting, Done)
                | (Submitting, Failed)
                | (AwaitingCompletion, Failed)
        )
    }

}

/// States a turn went through, starting at `Idle`.
#[derive(Debug)]
struct TurnProgress {
    turn_id: Uuid,
    states: Vec<TurnState>,
}

impl TurnProgress {
    fn start(turn_id: Uuid) -> Self {
        Self {
            turn_id,
            states: vec![TurnState::Idle],
        }
    }

    fn current(&self) -> TurnState {
        *self.states.last().unwrap_or(&TurnState::Idle)
    }

    fn advance(&mut self, next: TurnState) {
        let current = self.current();
        debug_assert!(
            current.can_advance_to(next),
            "illegal turn transition {current:?} -> {next:?}"
        );
        debug!("turn {}: {current:?} -> {next:?}", self.turn_id);
        self.states.push(next);
    }
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub turn_id: Uuid,
    pub question: SessionEntry,
    pub answer: SessionEntry,
    pub states: Vec<TurnState>,
}

impl Turn {
    pub fn state(&self) -> TurnState {
        *self.states.last().unwrap_or(&TurnState::Idle)
    }
}

#[injectable(TurnOrchestrator)]
pub struct ChatTurnOrchestrator {
    chats: Ref<dyn ChatService>,
    completion: Ref<dyn CompletionClient>,
    sessions: Ref<SessionStore>,
    events: Ref<EventBus>,
}

impl ChatTurnOrchestrator {
    /// Best-effort insert; the entry stays in the view either way.
    async fn persist(&self, session_id: Uuid, mut entry: SessionEntry) -> SessionEntry {
        let recorded = match entry.kind {
            MessageKind::Question => self.chats.record_question(entry.content.clone()).await,
            MessageKind::Answer => self.chats.record_answer(entry.content.clone()).await,
        };
        match recorded {
            Ok(message) => {
                self.sessions
                    .mark_persisted(session_id, entry.key, message.id);
                entry.message_id = Some(message.id);
            }
            Err(e) => error!("failed to save {:?}: {e}", entry.kind),
        }
        entry
    }
}

#[async_trait]
impl TurnOrchestrator for ChatTurnOrchestrator {
    async fn submit_turn(&self, session_id: Uuid, text: String) -> Result<Turn, TurnError> {
        if text.trim().is_empty() {
            return Err(TurnError::EmptyInput);
        }

        let turn_id = Uuid::new_v4();
        let mut progress = TurnProgress::start(turn_id);

        progress.advance(TurnState::Submitting);
        let question = self
            .sessions
            .push(session_id, MessageKind::Question, &text);
        self.events.publish(ChatEvent::TurnSubmitted {
            turn_id,
            session_id,
            question: question.clone(),
        });
        let question = self.persist(session_id, question).await;

        progress.advance(TurnState::AwaitingCompletion);
        let answer_content = match self.completion.complete(&text).await {
            Ok(text) => text,
            Err(e) => {
                warn!("completion failed for turn {turn_id}: {e}");
                FALLBACK_ANSWER.to_owned()
            }
        };

        progress.advance(TurnState::Persisting);
        let answer = self
            .sessions
            .push(session_id, MessageKind::Answer, &answer_content);
        let answer = self.persist(session_id, answer).await;

        progress.advance(TurnState::Done);
        self.events.publish(ChatEvent::TurnCompleted {
            turn_id,
            session_id,
            question: question.clone(),
            answer: answer.clone(),
        });

        Ok(Turn {
            turn_id,
            question,
            answer,
            states: progress.states,
        })
    }
}
