//! CLI channel: interactive terminal-based chat.
//!
//! This is the simplest channel: reads from stdin, writes to stdout.
//! Used for `lifeline chat`.

use async_trait::async_trait;
use lifeline_core::channel::{Channel, ChannelId, ChannelMessage, Reply};
use lifeline_core::error::ChannelError;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    id: ChannelId,
}

impl CliChannel {
    pub fn new() -> Self {
        Self {
            id: ChannelId("cli".into()),
        }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap one line of terminal input as a channel message.
pub fn local_message(line: impl Into<String>) -> ChannelMessage {
    ChannelMessage {
        channel_id: ChannelId("cli".into()),
        sender_id: "local_user".into(),
        sender_name: Some("User".into()),
        content: line.into(),
        chat_id: "cli_session".into(),
        message_id: None,
        metadata: serde_json::Map::new(),
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let stdin = io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }

                        // Check for exit commands
                        if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
                            break;
                        }

                        if tx.send(Ok(local_message(line))).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(
        &self,
        _chat_id: &str,
        reply: &Reply,
        _reply_to: Option<&str>,
    ) -> Result<(), ChannelError> {
        println!();
        for line in reply.text.lines() {
            println!("  {line}");
        }
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_core::Markup;

    #[test]
    fn cli_channel_properties() {
        let ch = CliChannel::new();
        assert_eq!(ch.name(), "cli");
        assert_eq!(ch.id().0, "cli");
        assert_eq!(ch.markup(), Markup::Plain);
    }

    #[test]
    fn local_messages_share_one_session() {
        let a = local_message("oxygen mumbai");
        let b = local_message("/more");
        assert_eq!(a.session_id(), "cli:cli_session");
        assert_eq!(a.session_id(), b.session_id());
    }
}
