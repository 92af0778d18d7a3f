//! Chat channel implementations for Lifeline.
//!
//! Each channel connects to a chat platform and relays messages to/from
//! the query bot. Channels are trait-based and platform-agnostic.
//!
//! Available channels:
//! - **CLI**: Interactive terminal chat (stdin/stdout)
//! - **Telegram**: Telegram Bot API via long polling
//! - **Registry**: Central channel manager and message router

pub mod cli;
pub mod registry;
pub mod telegram;

pub use cli::CliChannel;
pub use registry::ChannelRegistry;
pub use telegram::{TelegramChannel, TelegramConfig};
