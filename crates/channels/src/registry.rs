//! Channel registry: owns the active channels.
//!
//! Merges inbound messages from every channel into one stream for the
//! dispatcher and routes replies back to the channel they came from.

use std::collections::HashMap;
use std::sync::Arc;

use lifeline_core::channel::{Channel, ChannelMessage, Markup, Reply};
use lifeline_core::error::ChannelError;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Inbound item from [`ChannelRegistry::start_all`]: the channel name and
/// what it received.
pub type Inbound = (String, Result<ChannelMessage, ChannelError>);

/// Central registry holding all enabled channel instances.
pub struct ChannelRegistry {
    channels: HashMap<String, Arc<dyn Channel>>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Register a channel. A channel with the same name is replaced.
    pub fn register(&mut self, channel: Arc<dyn Channel>) {
        let name = channel.name().to_string();
        info!(channel = %name, "Registered channel");
        self.channels.insert(name, channel);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Channel>> {
        self.channels.get(name)
    }

    /// Registered channel names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Markup the named channel renders, `Plain` for unknown channels.
    pub fn markup_of(&self, channel_name: &str) -> Markup {
        self.channels
            .get(channel_name)
            .map(|channel| channel.markup())
            .unwrap_or_default()
    }

    /// Start all channels and merge their message streams into one receiver.
    ///
    /// The receiver closes once every channel's own stream has ended.
    pub async fn start_all(&self) -> Result<mpsc::Receiver<Inbound>, ChannelError> {
        let (merged_tx, merged_rx) = mpsc::channel(256);

        for (name, channel) in &self.channels {
            let mut rx = channel.start().await?;
            let tx = merged_tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(item) = rx.recv().await {
                    if tx.send((channel_name.clone(), item)).await.is_err() {
                        break; // Merged receiver dropped
                    }
                }
            });

            info!(channel = %name, "Started channel");
        }

        Ok(merged_rx)
    }

    /// Send a reply through the named channel.
    pub async fn send_to(
        &self,
        channel_name: &str,
        chat_id: &str,
        reply: &Reply,
        reply_to: Option<&str>,
    ) -> Result<(), ChannelError> {
        let channel = self.channels.get(channel_name).ok_or_else(|| {
            ChannelError::NotConfigured(format!("Channel '{}' not found", channel_name))
        })?;

        channel.send(chat_id, reply, reply_to).await
    }

    /// Show a typing indicator; failures are logged and otherwise ignored.
    pub async fn typing(&self, channel_name: &str, chat_id: &str) {
        if let Some(channel) = self.channels.get(channel_name) {
            if let Err(e) = channel.send_typing(chat_id).await {
                warn!(channel = %channel_name, error = %e, "Typing indicator failed");
            }
        }
    }

    /// Stop all channels gracefully.
    pub async fn stop_all(&self) {
        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!(channel = %name, error = %e, "Failed to stop channel");
            }
        }
    }
}
