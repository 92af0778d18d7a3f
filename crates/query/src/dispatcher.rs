//! Message dispatch loop.
//!
//! Pulls messages from every registered channel and sends each reply back
//! where the message came from. Every session with pending messages gets
//! one worker task that drains its queue in arrival order, so a session's
//! messages never overlap while different sessions proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lifeline_channels::ChannelRegistry;
use lifeline_core::ChannelMessage;
use lifeline_core::error::ChannelError;
use lifeline_telemetry::ErrorReporter;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::bot::QueryBot;
use crate::guard::guarded;

type Queued = (String, ChannelMessage);

/// Pending messages per session. A session has an entry exactly while a
/// worker is draining its queue.
#[derive(Default)]
struct SessionQueues {
    queues: Mutex<HashMap<String, mpsc::UnboundedSender<Queued>>>,
}

impl SessionQueues {
    /// Queue a message. Returns the receiver when the session had no
    /// worker, so the caller must start one.
    fn enqueue(&self, session_id: &str, item: Queued) -> Option<mpsc::UnboundedReceiver<Queued>> {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        // Sending under the map lock pairs with the re-check in `next`.
        let item = match queues.get(session_id) {
            Some(tx) => match tx.send(item) {
                Ok(()) => return None,
                Err(mpsc::error::SendError(item)) => item,
            },
            None => item,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // `rx` is alive, so this send cannot fail.
        let _ = tx.send(item);
        queues.insert(session_id.to_string(), tx);
        Some(rx)
    }

    /// Next queued message, or `None` after retiring the session's entry.
    fn next(&self, session_id: &str, rx: &mut mpsc::UnboundedReceiver<Queued>) -> Option<Queued> {
        if let Ok(item) = rx.try_recv() {
            return Some(item);
        }
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        match rx.try_recv() {
            Ok(item) => Some(item),
            Err(_) => {
                queues.remove(session_id);
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.queues.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

pub struct Dispatcher {
    bot: Arc<QueryBot>,
    registry: Arc<ChannelRegistry>,
    reporter: Arc<dyn ErrorReporter>,
    queues: SessionQueues,
}

impl Dispatcher {
    pub fn new(
        bot: Arc<QueryBot>,
        registry: Arc<ChannelRegistry>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            bot,
            registry,
            reporter,
            queues: SessionQueues::default(),
        }
    }

    /// Handle one message end to end: typing indicator, guarded handling,
    /// reply delivery.
    pub async fn dispatch(&self, channel_name: &str, message: &ChannelMessage) -> Result<(), ChannelError> {
        debug!(channel = %channel_name, session = %message.session_id(), "Handling message");
        self.registry.typing(channel_name, &message.chat_id).await;

        let markup = self.registry.markup_of(channel_name);
        let reply = guarded(
            self.reporter.as_ref(),
            message,
            self.bot.handle(message, markup),
        )
        .await;

        self.registry
            .send_to(
                channel_name,
                &message.chat_id,
                &reply,
                message.message_id.as_deref(),
            )
            .await
    }

    /// Run until every channel's stream has ended, then wait for in-flight
    /// messages and stop the channels.
    pub async fn run(self: Arc<Self>) -> Result<(), ChannelError> {
        let mut inbound = self.registry.start_all().await?;
        info!(channels = ?self.registry.list(), "Dispatcher running");

        let mut workers = JoinSet::new();
        while let Some((channel_name, item)) = inbound.recv().await {
            let message = match item {
                Ok(message) => message,
                Err(e) => {
                    warn!(channel = %channel_name, error = %e, "Channel receive error");
                    continue;
                }
            };

            let session_id = message.session_id();
            if let Some(rx) = self.queues.enqueue(&session_id, (channel_name, message)) {
                let this = Arc::clone(&self);
                workers.spawn(async move { this.drain(session_id, rx).await });
            }

            // Reap finished workers so the set does not grow unbounded.
            while workers.try_join_next().is_some() {}
        }

        while workers.join_next().await.is_some() {}
        self.registry.stop_all().await;
        info!("Dispatcher stopped");
        Ok(())
    }

    async fn drain(&self, session_id: String, mut rx: mpsc::UnboundedReceiver<Queued>) {
        while let Some((channel_name, message)) = self.queues.next(&session_id, &mut rx) {
            if let Err(e) = self.dispatch(&channel_name, &message).await {
                warn!(channel = %channel_name, session = %session_id, error = %e, "Reply not delivered");
            }
        }
    }

    /// Sessions with messages in flight or queued.
    pub fn active_sessions(&self) -> usize {
        self.queues.len()
    }
}
