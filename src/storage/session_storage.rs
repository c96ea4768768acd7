use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::models::Dialogue;
use crate::types::SessionId;

/// Shared handle to one session's dialogue; the async mutex serializes its owners.
pub type SessionSlot = Arc<Mutex<Dialogue>>;

/// Explicit map of every known session to its dialogue.
pub struct SessionStorage {
    sessions: DashMap<SessionId, SessionSlot>
}

impl SessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new()
        }
    }

    /// Returns the session's slot, inserting a fresh terminated dialogue on first contact.
    pub fn checkout(&self, session_id: SessionId) -> SessionSlot {
        self.sessions.entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(Dialogue::new())))
            .clone()
    }

    /// Removes the session once its dialogue has terminated and nobody else holds the slot.
    ///
    /// Returns whether the entry was removed.
    pub fn release(&self, session_id: SessionId) -> bool {
        self.sessions.remove_if(&session_id, |_, slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().map(|dialogue| dialogue.is_terminated()).unwrap_or(false)
        }).is_some()
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.sessions.contains_key(&session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
