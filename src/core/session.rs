//! In-memory session views.
//!
//! A session view is the transcript one page load shows in its chat view. It
//! is distinct from the persisted history: entries appear before (and even
//! without) their store insert succeeding.

use crate::infrastructure::entities::MessageKind;
use di::{inject, injectable};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

const MAX_SESSIONS: usize = 1024;
const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    /// Local key, stable for the lifetime of the view.
    pub key: Uuid,
    pub kind: MessageKind,
    pub content: String,
    /// Set once the store accepted the message.
    pub message_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct SessionView {
    entries: Vec<SessionEntry>,
    last_touched: Instant,
    last_tick: u64,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            last_touched: Instant::now(),
            last_tick: 0,
        }
    }
}

impl SessionView {
    pub fn push(&mut self, kind: MessageKind, content: &str) -> SessionEntry {
        let entry = SessionEntry {
            key: Uuid::new_v4(),
            kind,
            content: content.to_owned(),
            message_id: None,
        };
        self.entries.push(entry.clone());
        entry
    }

    pub fn mark_persisted(&mut self, key: Uuid, message_id: Uuid) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.message_id = Some(message_id);
        }
    }

    pub fn remove_message(&mut self, message_id: Uuid) {
        self.entries.retain(|e| e.message_id != Some(message_id));
    }

    pub fn remove_persisted(&mut self) {
        self.entries.retain(|e| e.message_id.is_none());
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
struct Sessions {
    views: HashMap<Uuid, SessionView>,
    // Orders views by last use; an `Instant` can tie on coarse clocks.
    clock: u64,
}

impl Sessions {
    fn touch(&mut self, session_id: Uuid) -> Option<&mut SessionView> {
        self.clock += 1;
        let tick = self.clock;
        let view = self.views.get_mut(&session_id)?;
        view.last_touched = Instant::now();
        view.last_tick = tick;
        Some(view)
    }
}

/// Owner of every session view, keyed by the client's session id.
///
/// Views idle for longer than the timeout are dropped, and once the store is
/// full, opening a new view evicts the least recently used one. Views left
/// empty by a delete or a clear are dropped as well.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<Sessions>,
    capacity: usize,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(MAX_SESSIONS, SESSION_IDLE_TIMEOUT)
    }
}

#[injectable]
impl SessionStore {
    #[inject]
    pub fn create() -> Self {
        Self::default()
    }
}

impl SessionStore {
    pub fn with_limits(capacity: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::default(),
            capacity: capacity.max(1),
            idle_timeout,
        }
    }

    // The lock is never held across an await point.
    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, session_id: Uuid, kind: MessageKind, content: &str) -> SessionEntry {
        let mut sessions = self.lock();
        let idle_timeout = self.idle_timeout;
        sessions
            .views
            .retain(|_, view| view.last_touched.elapsed() < idle_timeout);

        if !sessions.views.contains_key(&session_id) && sessions.views.len() >= self.capacity {
            let oldest = sessions
                .views
                .iter()
                .min_by_key(|(_, view)| view.last_tick)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                debug!("evicting session view {oldest}");
                sessions.views.remove(&oldest);
            }
        }

        sessions.clock += 1;
        let tick = sessions.clock;
        let view = sessions.views.entry(session_id).or_default();
        view.last_touched = Instant::now();
        view.last_tick = tick;
        view.push(kind, content)
    }

    pub fn mark_persisted(&self, session_id: Uuid, key: Uuid, message_id: Uuid) {
        if let Some(view) = self.lock().views.get_mut(&session_id) {
            view.mark_persisted(key, message_id);
        }
    }

    pub fn snapshot(&self, session_id: Uuid) -> Vec<SessionEntry> {
        self.lock()
            .touch(session_id)
            .map(|view| view.entries().to_vec())
            .unwrap_or_default()
    }

    /// Drops a deleted message from every view.
    pub fn forget_message(&self, message_id: Uuid) {
        self.lock().views.retain(|_, view| {
            view.remove_message(message_id);
            !view.is_empty()
        });
    }

    /// Drops every persisted entry from every view.
    pub fn forget_persisted(&self) {
        self.lock().views.retain(|_, view| {
            view.remove_persisted();
            !view.is_empty()
        });
    }

    pub fn session_count(&self) -> usize {
        self.lock().views.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order_and_is_unpersisted() {
        let mut view = SessionView::default();
        view.push(MessageKind::Question, "2+2?");
        view.push(MessageKind::Answer, "4");

        let kinds: Vec<_> = view.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![MessageKind::Question, MessageKind::Answer]);
        assert!(view.entries().iter().all(|e| e.message_id.is_none()));
    }

    #[test]
    fn test_remove_message_only_touches_matching_entry() {
        let mut view = SessionView::default();
        let question = view.push(MessageKind::Question, "hello");
        let answer = view.push(MessageKind::Answer, "hi");
        let question_id = Uuid::new_v4();
        view.mark_persisted(question.key, question_id);
        view.mark_persisted(answer.key, Uuid::new_v4());

        view.remove_message(question_id);

        assert_eq!(view.entries().len(), 1);
        assert_eq!(view.entries()[0].key, answer.key);
    }

    #[test]
    fn test_forget_persisted_keeps_unsaved_entries() {
        let store = SessionStore::default();
        let session = Uuid::new_v4();
        let saved = store.push(session, MessageKind::Question, "saved");
        store.push(session, MessageKind::Answer, "unsaved");
        store.mark_persisted(session, saved.key, Uuid::new_v4());

        store.forget_persisted();

        let entries = store.snapshot(session);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "unsaved");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::default();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        store.push(first, MessageKind::Question, "one");

        assert_eq!(store.snapshot(first).len(), 1);
        assert!(store.snapshot(second).is_empty());
    }

    #[test]
    fn test_forget_persisted_drops_emptied_sessions() {
        let store = SessionStore::default();
        for _ in 0..100 {
            let session = Uuid::new_v4();
            let entry = store.push(session, MessageKind::Question, "saved");
            store.mark_persisted(session, entry.key, Uuid::new_v4());
        }
        let unsaved = Uuid::new_v4();
        store.push(unsaved, MessageKind::Question, "unsaved");

        store.forget_persisted();

        assert_eq!(store.session_count(), 1);
        assert_eq!(store.snapshot(unsaved).len(), 1);
    }

    #[test]
    fn test_forget_message_drops_emptied_session() {
        let store = SessionStore::default();
        let session = Uuid::new_v4();
        let other = Uuid::new_v4();
        let entry = store.push(session, MessageKind::Question, "only");
        let message_id = Uuid::new_v4();
        store.mark_persisted(session, entry.key, message_id);
        store.push(other, MessageKind::Question, "kept");

        store.forget_message(message_id);

        assert_eq!(store.session_count(), 1);
        assert!(store.snapshot(session).is_empty());
    }

    #[test]
    fn test_full_store_evicts_least_recently_used() {
        let store = SessionStore::with_limits(2, SESSION_IDLE_TIMEOUT);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let third = Uuid::new_v4();
        store.push(first, MessageKind::Question, "one");
        store.push(second, MessageKind::Question, "two");
        // reading the first view makes the second one the oldest
        store.snapshot(first);

        store.push(third, MessageKind::Question, "three");

        assert_eq!(store.session_count(), 2);
        assert_eq!(store.snapshot(first).len(), 1);
        assert!(store.snapshot(second).is_empty());
        assert_eq!(store.snapshot(third).len(), 1);
    }

    #[test]
    fn test_idle_sessions_expire_on_push() {
        let store = SessionStore::with_limits(MAX_SESSIONS, Duration::ZERO);
        let stale = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        store.push(stale, MessageKind::Question, "old");

        store.push(fresh, MessageKind::Question, "new");

        assert_eq!(store.session_count(), 1);
        assert!(store.snapshot(stale).is_empty());
    }

    #[test]
    fn test_existing_session_is_not_evicted_when_full() {
        let store = SessionStore::with_limits(1, SESSION_IDLE_TIMEOUT);
        let session = Uuid::new_v4();
        store.push(session, MessageKind::Question, "2+2?");
        store.push(session, MessageKind::Answer, "4");

        assert_eq!(store.snapshot(session).len(), 2);
    }
}
