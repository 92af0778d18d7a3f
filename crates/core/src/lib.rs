//! # Lifeline Core
//!
//! Domain types, traits, and error definitions for the Lifeline resource bot.
//! This crate performs **no I/O**: it defines the domain model that the
//! transport, feed, session and query crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the query pipeline is a trait here:
//! - [`Channel`]: a chat transport that yields messages and sends replies
//! - [`SessionStore`]: per-session key/value state between messages
//!
//! Implementations live in their respective crates, so the pipeline can be
//! exercised in tests with in-process stand-ins.

pub mod category;
pub mod channel;
pub mod error;
pub mod record;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use category::Category;
pub use channel::{Channel, ChannelId, ChannelMessage, Markup, Reply};
pub use error::{Error, Result};
pub use record::{Freshness, Record};
pub use session::SessionStore;
