//! In-memory session store: state lives as long as the process.

use async_trait::async_trait;
use lifeline_core::error::SessionError;
use lifeline_core::session::SessionStore;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps each session's key/value map in a process-wide table.
/// A session disappears once its last key is removed.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Map<String, Value>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str { "in_memory" }

    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).and_then(|s| s.get(key)).cloned())
    }

    async fn set(&self, session_id: &str, key: &str, value: Value) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError> {
        let mut sessions = self.sessions.write().await;
        let Some(state) = sessions.get_mut(session_id) else {
            return Ok(None);
        };
        let removed = state.remove(key);
        if state.is_empty() {
            sessions.remove(session_id);
            tracing::trace!(session = %session_id, "Session state emptied");
        }
        Ok(removed)
    }

    async fn session_count(&self) -> Result<usize, SessionError> {
        Ok(self.sessions.read().await.len())
    }
}
