//! # Lifeline Query
//!
//! Turns a chat message into a page of resource records:
//!
//! ```text
//! message ─► Command ─► tokens ─► Category ─► DataSource::fetch
//!                                               │
//!            Reply ◄─ Formatter ◄─ Paginator ◄─ DistrictMatcher
//! ```
//!
//! [`QueryBot`] wires the stages together; [`guarded`] is the per-message
//! fault boundary and [`Dispatcher`] drives both from the chat channels.

pub mod bot;
pub mod command;
pub mod dispatcher;
pub mod formatter;
pub mod guard;
pub mod matcher;
pub mod messages;
pub mod paginator;
pub mod resolver;

pub use bot::QueryBot;
pub use command::Command;
pub use dispatcher::Dispatcher;
pub use formatter::Formatter;
pub use guard::guarded;
pub use matcher::DistrictMatcher;
pub use paginator::{DATASET_KEY, Paginator};
pub use resolver::{normalize, resolve_category, tokenize};
