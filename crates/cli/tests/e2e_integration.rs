//! End-to-end tests for the Lifeline bot.
//!
//! These drive the full pipeline: a scripted chat channel feeds the
//! dispatcher, the query bot reads category snapshots over HTTP from a
//! local fixture server, and replies are captured as the channel sent them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lifeline_channels::ChannelRegistry;
use lifeline_config::{AppConfig, Catalog};
use lifeline_core::error::ChannelError;
use lifeline_core::{Channel, ChannelId, ChannelMessage, Markup, Reply};
use lifeline_feed::HttpFeed;
use lifeline_query::{Dispatcher, QueryBot};
use lifeline_session::InMemorySessionStore;
use lifeline_telemetry::NoopReporter;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

// ── Fixture feed ─────────────────────────────────────────────────────────

const OXYGEN: &str = r#"{"data": [
    {"id": "o1", "name": "Old Oxygen Depot", "district": "Mumbai",
     "verificationStatus": "Verified", "lastVerifiedOn": "2021-05-01T10:00:00Z",
     "phone1": "9876500001"},
    {"id": "o2", "name": "Fresh Oxygen Co", "district": "Mumbai",
     "verificationStatus": "Verified", "lastVerifiedOn": "2021-05-03T10:00:00Z",
     "phone1": "9876500002", "description": "24x7 refills\n"},
    {"id": "o3", "name": "Shady Cylinders", "district": "Mumbai",
     "verificationStatus": "Unverified", "lastVerifiedOn": "2021-05-04T10:00:00Z"},
    {"id": "o4", "name": "Pune Oxygen", "district": "Pune",
     "verificationStatus": "Verified", "lastVerifiedOn": "2021-05-05T10:00:00Z"},
    {"id": "o5", "name": "Mid Oxygen", "district": "Mumbai",
     "verificationStatus": "Verified", "lastVerifiedOn": "2021-05-02T10:00:00Z"},
    {"id": "o6", "name": "Last Oxygen", "district": "Mumbai",
     "verificationStatus": "Verified"}
]}"#;

const HOSPITALS: &str = r#"{"data": [
    {"name": "City <General> & Co", "district": "Pune",
     "verificationStatus": "verified", "lastVerifiedOn": 1620000000000,
     "availableBeds": 12, "hasICU": true}
]}"#;

/// Serves fixture bodies by request path until the test ends.
async fn fixture_server(routes: HashMap<&'static str, &'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let request = String::from_utf8_lossy(&buf);
                let path = request.split_whitespace().nth(1).unwrap_or("/");

                let response = match routes.get(path) {
                    Some(body) => format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    ),
                    None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                };
                socket.write_all(response.as_bytes()).await.ok();
                socket.shutdown().await.ok();
            });
        }
    });

    format!("http://{addr}")
}

// ── Scripted channel ─────────────────────────────────────────────────────

/// Replays a fixed conversation and records every reply.
struct ScriptedChannel {
    id: ChannelId,
    markup: Markup,
    script: Mutex<Vec<(String, String)>>,
    sent: Mutex<Vec<(String, Reply)>>,
}

impl ScriptedChannel {
    fn new(markup: Markup, script: &[(&str, &str)]) -> Self {
        Self {
            id: ChannelId("scripted".into()),
            markup,
            script: Mutex::new(
                script
                    .iter()
                    .map(|(chat, text)| (chat.to_string(), text.to_string()))
                    .collect(),
            ),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn replies(&self, chat: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == chat)
            .map(|(_, reply)| reply.text.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Channel for ScriptedChannel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    fn markup(&self) -> Markup {
        self.markup
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let script: Vec<(String, String)> = self.script.lock().unwrap().drain(..).collect();
        let (tx, rx) = mpsc::channel(script.len().max(1));
        for (chat, text) in script {
            tx.send(Ok(ChannelMessage {
                channel_id: self.id.clone(),
                sender_id: format!("user-{chat}"),
                sender_name: Some("Tester".into()),
                content: text,
                chat_id: chat,
                message_id: None,
                metadata: serde_json::Map::new(),
            }))
            .await
            .unwrap();
        }
        Ok(rx)
    }

    async fn send(
        &self,
        chat_id: &str,
        reply: &Reply,
        _reply_to: Option<&str>,
    ) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), reply.clone()));
        Ok(())
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

async fn run_conversation(base_url: String, channel: Arc<ScriptedChannel>) {
    let mut config = AppConfig::default();
    config.feed.base_url = base_url;
    config.feed.timeout_secs = 5;

    let catalog = Arc::new(Catalog::from_config(&config).unwrap());
    let feed = HttpFeed::new(&config.feed, catalog.clone()).unwrap();
    let bot = QueryBot::new(
        &config,
        catalog,
        Arc::new(feed),
        Arc::new(InMemorySessionStore::new()),
    );

    let mut registry = ChannelRegistry::new();
    registry.register(channel);
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(bot),
        Arc::new(registry),
        Arc::new(NoopReporter),
    ));
    dispatcher.run().await.unwrap();
}

async fn default_server() -> String {
    fixture_server(HashMap::from([
        ("/oxygen.json", OXYGEN),
        ("/hospital_clinic_centre.json", HOSPITALS),
    ]))
    .await
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_then_page_through_results() {
    let base = default_server().await;
    let channel = Arc::new(ScriptedChannel::new(
        Markup::Plain,
        &[
            ("alice", "Oxygen in Mumbai?"),
            ("alice", "/more"),
            ("alice", "/more"),
        ],
    ));
    run_conversation(base, channel.clone()).await;

    let replies = channel.replies("alice");
    assert_eq!(replies.len(), 3);

    // Newest first, unverified and other districts excluded.
    let first = &replies[0];
    let fresh = first.find("Fresh Oxygen Co").unwrap();
    let mid = first.find("Mid Oxygen").unwrap();
    let old = first.find("Old Oxygen Depot").unwrap();
    assert!(fresh < mid && mid < old);
    assert!(!first.contains("Shady Cylinders"));
    assert!(!first.contains("Pune Oxygen"));
    assert!(first.contains("Phone 1 - +91 9876500002"));
    assert!(first.contains("Description - 24x7 refills\n"));
    assert!(!first.contains("o2"), "hidden id field leaked");
    assert!(first.contains("Data fetched from - https://life.coronasafe.network/"));

    // Undated record ranks last and arrives on the second page.
    assert!(replies[1].contains("Last Oxygen"));
    assert!(replies[2].starts_with("No more information"));
}

#[tokio::test]
async fn html_channel_gets_escaped_markup() {
    let base = default_server().await;
    let channel = Arc::new(ScriptedChannel::new(
        Markup::Html,
        &[("bob", "/hospital@LifelineBot pune")],
    ));
    run_conversation(base, channel.clone()).await;

    let reply = &channel.replies("bob")[0];
    assert!(reply.starts_with("<b>Here's what I've found -</b>"));
    assert!(reply.contains("<b><i>City &lt;General&gt; &amp; Co</i></b>"));
    assert!(reply.contains("<b>Available Beds</b> - 12"));
    assert!(reply.contains("<b>Has Icu</b> - Yes"));
}

#[tokio::test]
async fn rejected_and_unmatched_queries() {
    let base = default_server().await;
    let channel = Arc::new(ScriptedChannel::new(
        Markup::Plain,
        &[
            ("carol", "oxygen"),
            ("carol", "vaccine in mumbai"),
            ("carol", "oxygen in Atlantis"),
            ("carol", "/more"),
        ],
    ));
    run_conversation(base, channel.clone()).await;

    let replies = channel.replies("carol");
    assert!(replies[0].starts_with("Invalid input"));
    assert!(replies[1].starts_with("Invalid input"));
    assert!(replies[2].starts_with("I'm sorry, I couldn't find anything"));
    assert!(replies[3].starts_with("No more information"));
}

#[tokio::test]
async fn missing_snapshot_is_an_apology() {
    // Only oxygen is served; medicine 404s.
    let base = fixture_server(HashMap::from([("/oxygen.json", OXYGEN)])).await;
    let channel = Arc::new(ScriptedChannel::new(
        Markup::Plain,
        &[("dave", "medicine in Mumbai"), ("dave", "o2 mumbai")],
    ));
    run_conversation(base, channel.clone()).await;

    let replies = channel.replies("dave");
    assert!(replies[0].starts_with("Sorry, I couldn't reach the resource database"));
    assert!(replies[1].contains("Fresh Oxygen Co"));
}

#[tokio::test]
async fn sessions_do_not_share_pages() {
    let base = default_server().await;
    let channel = Arc::new(ScriptedChannel::new(
        Markup::Plain,
        &[
            ("erin", "oxygen mumbai"),
            ("frank", "/more"),
            ("erin", "/more"),
        ],
    ));
    run_conversation(base, channel.clone()).await;

    assert!(channel.replies("frank")[0].starts_with("No more information"));
    assert!(channel.replies("erin")[1].contains("Last Oxygen"));
}

#[tokio::test]
async fn start_and_help() {
    let base = default_server().await;
    let channel = Arc::new(ScriptedChannel::new(
        Markup::Plain,
        &[("gina", "/start"), ("gina", "/help")],
    ));
    run_conversation(base, channel.clone()).await;

    let replies = channel.replies("gina");
    assert!(replies[0].starts_with("Hi Tester!"));
    for command in ["/ambulance", "/helpline", "/hospital", "/medicine", "/oxygen"] {
        assert!(replies[1].contains(command), "help is missing {command}");
    }
}
