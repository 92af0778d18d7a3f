//! The query bot: turns one inbound message into one reply.

use std::sync::Arc;

use lifeline_config::{AppConfig, Catalog};
use lifeline_core::{ChannelMessage, Markup, Reply, SessionStore};
use lifeline_feed::DataSource;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::formatter::Formatter;
use crate::matcher::DistrictMatcher;
use crate::messages;
use crate::paginator::Paginator;
use crate::resolver::{normalize, resolve_category, tokenize};

pub struct QueryBot {
    catalog: Arc<Catalog>,
    source: Arc<dyn DataSource>,
    matcher: DistrictMatcher,
    paginator: Paginator,
    formatter: Formatter,
    min_tokens: usize,
}

impl QueryBot {
    pub fn new(
        config: &AppConfig,
        catalog: Arc<Catalog>,
        source: Arc<dyn DataSource>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            matcher: DistrictMatcher::new(catalog.clone(), &config.query),
            paginator: Paginator::new(sessions, config.query.page_size),
            formatter: Formatter::new(&config.format),
            min_tokens: config.query.min_tokens,
            catalog,
            source,
        }
    }

    /// Route a message to the matching entry point.
    pub async fn handle(
        &self,
        message: &ChannelMessage,
        markup: Markup,
    ) -> lifeline_core::Result<Reply> {
        let session_id = message.session_id();
        match Command::parse(&message.content) {
            Command::Start => Ok(self.start(message.sender_name.as_deref(), markup)),
            Command::Help => Ok(self.help(markup)),
            Command::More => self.more(&session_id, markup).await,
            Command::Query(text) => self.query(&session_id, &text, markup).await,
        }
    }

    /// Run a fresh search and reply with its first page.
    ///
    /// Invalid input and an unreachable feed are answered with a fixed
    /// message rather than an error. Session state is only touched once
    /// the feed has been read.
    pub async fn query(
        &self,
        session_id: &str,
        text: &str,
        markup: Markup,
    ) -> lifeline_core::Result<Reply> {
        let tokens = tokenize(&normalize(text));
        let category = resolve_category(&tokens, &self.catalog);

        let category = match category {
            Some(category) if tokens.len() >= self.min_tokens => category,
            _ => {
                debug!(session = %session_id, text = %text, "Rejected query");
                return Ok(Reply::plain(messages::INVALID_INPUT));
            }
        };

        let records = match self.source.fetch(category).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    session = %session_id,
                    category = %category,
                    source = self.source.name(),
                    error = %e,
                    "Feed unavailable"
                );
                return Ok(Reply::plain(messages::SOURCE_UNAVAILABLE));
            }
        };

        let fetched = records.len();
        let results = self.matcher.find(&tokens, records);
        info!(
            session = %session_id,
            category = %category,
            fetched,
            matched = results.len(),
            "Query answered"
        );

        // Replaces any leftover pages from an earlier search, or clears
        // them when nothing matched.
        self.paginator.store_dataset(session_id, &results).await?;
        if results.is_empty() {
            return Ok(Reply::plain(messages::NOTHING_FOUND));
        }

        let page = self.paginator.take_page(session_id).await?;
        Ok(self.formatter.render_page(&page, markup))
    }

    /// Next page of the session's last search.
    pub async fn more(&self, session_id: &str, markup: Markup) -> lifeline_core::Result<Reply> {
        let page = self.paginator.take_page(session_id).await?;
        debug!(session = %session_id, records = page.len(), "Paged results");
        Ok(self.formatter.render_page(&page, markup))
    }

    pub fn start(&self, sender_name: Option<&str>, markup: Markup) -> Reply {
        let greeting = match sender_name {
            Some(name) if !name.trim().is_empty() => format!("Hi {}!", markup.escape(name.trim())),
            _ => "Hi!".to_string(),
        };
        let help = self.help(markup);
        Reply {
            text: format!(
                "{greeting} I help you find verified medical resources near you.\n\n{}",
                help.text
            ),
            markup,
        }
    }

    /// Usage text listing every configured category and its aliases.
    pub fn help(&self, markup: Markup) -> Reply {
        let mut text = String::new();
        text.push_str(&markup.bold("Ask me for a resource and a district:"));
        text.push('\n');
        text.push_str("  oxygen in Mumbai\n  /hospital Pune\n  need ambulance near Delhi\n\n");

        text.push_str(&markup.bold("Resources"));
        text.push('\n');
        for category in self.catalog.categories() {
            let aliases = self.catalog.aliases_for(category);
            text.push_str(&format!(
                "  /{} - {}\n",
                category,
                markup.escape(&aliases.join(", "))
            ));
        }

        text.push('\n');
        text.push_str(&format!(
            "Results come {} at a time. {}",
            self.paginator.page_size(),
            messages::MORE_INVITE
        ));
        Reply { text, markup }
    }
}
