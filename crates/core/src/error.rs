//! Error types for the Lifeline domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Lifeline operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Data feed errors ---
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Anything that stops a category snapshot from being read.
///
/// Every variant means the same thing to the query flow: data is unavailable
/// for this one query.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("No endpoint configured for category: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Feed returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Malformed feed payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Corrupt session value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}
