//! Incident records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One unexpected fault while handling a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    /// Session the message belonged to (`channel:chat`)
    pub session_id: String,
    pub sender_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// The user's text exactly as received
    pub message_text: String,
    /// Rendered error or panic payload
    pub error: String,
    /// `error` for returned errors, `panic` for caught panics
    pub kind: IncidentKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Error,
    Panic,
}

impl Incident {
    pub fn new(
        session_id: impl Into<String>,
        sender_id: impl Into<String>,
        sender_name: Option<String>,
        message_text: impl Into<String>,
        kind: IncidentKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            session_id: session_id.into(),
            sender_id: sender_id.into(),
            sender_name,
            message_text: message_text.into(),
            error: error.into(),
            kind,
        }
    }
}
