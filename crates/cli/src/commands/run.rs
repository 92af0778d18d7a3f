//! `lifeline run`: Serve the Telegram bot.

use std::sync::Arc;

use lifeline_channels::{ChannelRegistry, TelegramChannel, TelegramConfig};
use lifeline_core::Channel;
use lifeline_query::Dispatcher;
use tracing::{info, warn};

use super::{Runtime, load_config};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    if !config.has_bot_token() {
        eprintln!();
        eprintln!("  ERROR: No Telegram bot token configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    export TELEGRAM_BOT_TOKEN='123456:ABC-...'");
        eprintln!();
        eprintln!("  Or add it to your config file under [telegram]:");
        eprintln!("    {}", lifeline_config::AppConfig::config_path().display());
        eprintln!();
        return Err("No bot token found. See above for setup instructions.".into());
    }

    let telegram = TelegramChannel::new(TelegramConfig::from_settings(&config.telegram)?)?;
    match telegram.health_check().await {
        Ok(true) => info!("Telegram reachable"),
        _ => warn!("Telegram health check failed; polling will keep retrying"),
    }

    let runtime = Runtime::build(config)?;
    let mut registry = ChannelRegistry::new();
    registry.register(Arc::new(telegram));
    let registry = Arc::new(registry);

    let dispatcher = Arc::new(Dispatcher::new(
        runtime.bot.clone(),
        registry.clone(),
        runtime.reporter.clone(),
    ));

    info!(
        feed = %runtime.config.feed.base_url,
        reporter = runtime.reporter.name(),
        "Lifeline bot ready"
    );

    tokio::select! {
        result = dispatcher.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            registry.stop_all().await;
        }
    }

    Ok(())
}
