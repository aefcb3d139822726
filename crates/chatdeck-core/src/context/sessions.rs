use crate::constants::defaults;
use crate::context::ConversationHistory;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub type SharedHistory = Arc<tokio::sync::Mutex<ConversationHistory>>;

/// Process-local map from session id to that session's transcript.
///
/// Transcripts are created on first access and live until removed. Nothing
/// is written to disk.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SharedHistory>>,
    max_messages: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_messages: defaults::MAX_MESSAGES,
        }
    }

    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    /// Transcript for `session_id`, created empty if it does not exist yet.
    pub fn get_history(&self, session_id: &str) -> SharedHistory {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(tokio::sync::Mutex::new(
                    ConversationHistory::new().with_max_messages(self.max_messages),
                ))
            })
            .clone()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.contains_key(session_id)
    }

    /// Empty a transcript but keep the session.
    pub async fn clear(&self, session_id: &str) {
        let history = {
            let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.get(session_id).cloned()
        };
        if let Some(history) = history {
            history.lock().await.clear();
        }
    }

    pub fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(session_id).is_some()
    }

    /// Known session ids, sorted.
    pub fn session_ids(&self) -> Vec<String> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
