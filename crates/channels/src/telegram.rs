//! Telegram channel adapter.
//!
//! Implements the Channel trait for the Telegram Bot API:
//! - inbound: `getUpdates` long polling, tracking the update offset
//! - outbound: `sendMessage`, with `parse_mode=HTML` for HTML replies
//! - health: `getMe`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lifeline_config::TelegramSettings;
use lifeline_core::channel::{Channel, ChannelId, ChannelMessage, Markup, Reply};
use lifeline_core::error::ChannelError;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Telegram rejects messages longer than this many characters.
const MAX_MESSAGE_CHARS: usize = 4096;

/// Pause before polling again after a failed `getUpdates`.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram channel configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub bot_token: String,
    /// Bot API root, without trailing slash.
    pub api_url: String,
    /// Long-poll wait passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl TelegramConfig {
    /// Build from loaded settings. Fails when no token is configured.
    pub fn from_settings(settings: &TelegramSettings) -> Result<Self, ChannelError> {
        let bot_token = settings
            .bot_token
            .clone()
            .ok_or_else(|| ChannelError::NotConfigured("TELEGRAM_BOT_TOKEN is not set".into()))?;

        Ok(Self {
            bot_token,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            poll_timeout_secs: settings.poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

/// Telegram channel adapter.
pub struct TelegramChannel {
    config: Arc<TelegramConfig>,
    channel_id: ChannelId,
    client: reqwest::Client,
    poller: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Result<Self, ChannelError> {
        // The HTTP timeout must outlast the long-poll wait.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .map_err(|e| ChannelError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            channel_id: ChannelId("telegram".into()),
            client,
            poller: tokio::sync::Mutex::new(None),
        })
    }
}

// --- Bot API wire types ---

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: i64,
    #[serde(default)]
    from: Option<TgUser>,
    chat: TgChat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    id: i64,
    first_name: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
}

/// A parsed `getUpdates` batch.
#[derive(Debug, Default)]
pub struct UpdateBatch {
    /// Text messages, in update order
    pub messages: Vec<ChannelMessage>,
    /// Offset to acknowledge this batch with, if it contained any update
    pub next_offset: Option<i64>,
}

/// Parse a `getUpdates` response body.
///
/// Updates without a text message (stickers, edits, joins) are acknowledged
/// but not forwarded.
pub fn parse_updates(body: &[u8]) -> Result<UpdateBatch, ChannelError> {
    let response: ApiResponse<Vec<Update>> = serde_json::from_slice(body)
        .map_err(|e| ChannelError::InvalidPayload(format!("getUpdates: {e}")))?;

    if !response.ok {
        return Err(ChannelError::InvalidPayload(
            response
                .description
                .unwrap_or_else(|| "getUpdates returned ok=false".into()),
        ));
    }

    let mut batch = UpdateBatch::default();
    for update in response.result.unwrap_or_default() {
        batch.next_offset = Some(batch.next_offset.unwrap_or(i64::MIN).max(update.update_id + 1));

        let Some(message) = update.message else {
            continue;
        };
        let Some(text) = message.text else {
            continue;
        };

        let (sender_id, sender_name) = match &message.from {
            Some(user) => (user.id.to_string(), Some(user.first_name.clone())),
            None => (message.chat.id.to_string(), None),
        };

        let mut metadata = serde_json::Map::new();
        if let Some(username) = message.from.as_ref().and_then(|u| u.username.clone()) {
            metadata.insert("username".into(), serde_json::Value::String(username));
        }

        batch.messages.push(ChannelMessage {
            channel_id: ChannelId("telegram".into()),
            sender_id,
            sender_name,
            content: text,
            chat_id: message.chat.id.to_string(),
            message_id: Some(message.message_id.to_string()),
            metadata,
        });
    }

    Ok(batch)
}

/// Split text into chunks Telegram accepts, preferring line boundaries.
///
/// Each chunk carries the markup it must be sent with. A single line longer
/// than `max_chars` is cut by characters; for HTML it is first reduced to
/// plain text, since a cut inside a tag or entity makes Telegram reject the
/// whole chunk.
pub fn split_message(text: &str, markup: Markup, max_chars: usize) -> Vec<(String, Markup)> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push((std::mem::take(&mut current), markup));
            current_len = 0;
        }

        if line_len > max_chars {
            let plain = match markup {
                Markup::Html => strip_html(line),
                Markup::Plain => line.to_string(),
            };
            let chars: Vec<char> = plain.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push((piece.iter().collect(), Markup::Plain));
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push((current, markup));
    }
    chunks
}

/// Drop tags and decode the entities HTML replies use.
fn strip_html(text: &str) -> String {
    const ENTITIES: [(&str, char); 4] =
        [("&lt;", '<'), ("&gt;", '>'), ("&amp;", '&'), ("&quot;", '"')];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(end) = rest.find('>') {
                rest = &rest[end + 1..];
                continue;
            }
        } else if c == '&' {
            if let Some((entity, decoded)) = ENTITIES.iter().find(|(e, _)| rest.starts_with(e)) {
                out.push(*decoded);
                rest = &rest[entity.len()..];
                continue;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Transport error text without the request URL, which embeds the bot token.
fn transport_error(e: reqwest::Error) -> String {
    e.without_url().to_string()
}

fn send_body(chat_id: &str, text: &str, markup: Markup, reply_to: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "chat_id": chat_id,
        "text": text,
        "disable_web_page_preview": true,
    });
    if markup == Markup::Html {
        body["parse_mode"] = serde_json::json!("HTML");
    }
    if let Some(id) = reply_to.and_then(|id| id.parse::<i64>().ok()) {
        body["reply_to_message_id"] = serde_json::json!(id);
    }
    body
}

async fn poll_once(
    client: &reqwest::Client,
    config: &TelegramConfig,
    offset: Option<i64>,
) -> Result<UpdateBatch, ChannelError> {
    let mut body = serde_json::json!({
        "timeout": config.poll_timeout_secs,
        "allowed_updates": ["message"],
    });
    if let Some(offset) = offset {
        body["offset"] = serde_json::json!(offset);
    }

    let response = client
        .post(config.method_url("getUpdates"))
        .json(&body)
        .send()
        .await
        .map_err(|e| ChannelError::ConnectionLost(transport_error(e)))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ChannelError::ConnectionLost(transport_error(e)))?;

    parse_updates(&bytes)
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn id(&self) -> &ChannelId {
        &self.channel_id
    }

    fn markup(&self) -> Markup {
        Markup::Html
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        info!("Telegram channel starting (long polling)");
        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let mut offset = None;
            while !tx.is_closed() {
                match poll_once(&client, &config, offset).await {
                    Ok(batch) => {
                        if batch.next_offset.is_some() {
                            offset = batch.next_offset;
                        }
                        for message in batch.messages {
                            if tx.send(Ok(message)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Telegram poll failed, retrying");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                    }
                }
            }
            debug!("Telegram poller exiting: receiver dropped");
        });

        *self.poller.lock().await = Some(handle);
        Ok(rx)
    }

    async fn send(
        &self,
        chat_id: &str,
        reply: &Reply,
        reply_to: Option<&str>,
    ) -> Result<(), ChannelError> {
        let chunks = split_message(&reply.text, reply.markup, MAX_MESSAGE_CHARS);
        for (i, (chunk, markup)) in chunks.iter().enumerate() {
            // Only the first chunk threads onto the user's message.
            let reply_to = if i == 0 { reply_to } else { None };
            let body = send_body(chat_id, chunk, *markup, reply_to);

            let response = self
                .client
                .post(self.config.method_url("sendMessage"))
                .json(&body)
                .send()
                .await
                .map_err(|e| ChannelError::DeliveryFailed {
                    channel: "telegram".into(),
                    reason: transport_error(e),
                })?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                return Err(ChannelError::DeliveryFailed {
                    channel: "telegram".into(),
                    reason: format!("status {status}: {detail}"),
                });
            }
        }

        debug!(chat_id = %chat_id, chars = reply.text.len(), "Telegram reply sent");
        Ok(())
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), ChannelError> {
        self.client
            .post(self.config.method_url("sendChatAction"))
            .json(&serde_json::json!({"chat_id": chat_id, "action": "typing"}))
            .send()
            .await
            .map_err(|e| ChannelError::DeliveryFailed {
                channel: "telegram".into(),
                reason: transport_error(e),
            })?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChannelError> {
        info!("Telegram channel stopping");
        if let Some(handle) = self.poller.lock().await.take() {
            handle.abort();
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        if self.config.bot_token.is_empty() {
            return Ok(false);
        }
        let response = self
            .client
            .get(self.config.method_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::ConnectionLost(transport_error(e)))?;
        Ok(response.status().is_success())
    }
}
