//! SessionStore trait: per-session key/value state between messages.
//!
//! The query pipeline keeps the unread part of a result list here so a
//! later "more" request can continue where the previous page stopped.
//! Values are JSON so any backend can hold them.

use async_trait::async_trait;
use serde_json::Value;
use crate::error::SessionError;

/// The core SessionStore trait.
///
/// Implementations: in-memory (default). Sessions never share keys.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Read a value for a session.
    async fn get(&self, session_id: &str, key: &str) -> std::result::Result<Option<Value>, SessionError>;

    /// Write (replace) a value for a session.
    async fn set(&self, session_id: &str, key: &str, value: Value) -> std::result::Result<(), SessionError>;

    /// Remove a value, returning what was stored.
    async fn remove(&self, session_id: &str, key: &str) -> std::result::Result<Option<Value>, SessionError>;

    /// Number of sessions currently holding state.
    async fn session_count(&self) -> std::result::Result<usize, SessionError>;
}
