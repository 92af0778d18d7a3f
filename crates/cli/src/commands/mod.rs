//! Subcommand implementations and the wiring they share.

pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod onboard;
pub mod run;
pub mod status;

use std::sync::Arc;

use lifeline_config::{AppConfig, Catalog};
use lifeline_feed::HttpFeed;
use lifeline_query::QueryBot;
use lifeline_session::InMemorySessionStore;
use lifeline_telemetry::ErrorReporter;

/// The long-lived pieces every serving command needs.
pub struct Runtime {
    pub config: AppConfig,
    pub bot: Arc<QueryBot>,
    pub reporter: Arc<dyn ErrorReporter>,
}

impl Runtime {
    pub fn build(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let catalog = Arc::new(Catalog::from_config(&config)?);
        let feed = HttpFeed::new(&config.feed, catalog.clone())?;
        let sessions = Arc::new(InMemorySessionStore::new());
        let bot = QueryBot::new(&config, catalog, Arc::new(feed), sessions);
        let reporter = lifeline_telemetry::from_config(&config.reporting);

        tracing::debug!(reporter = reporter.name(), "Runtime assembled");
        Ok(Self {
            config,
            bot: Arc::new(bot),
            reporter,
        })
    }
}

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}
