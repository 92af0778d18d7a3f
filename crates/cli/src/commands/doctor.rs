//! `lifeline doctor`: Diagnose configuration and connectivity.

use std::sync::Arc;

use lifeline_channels::{TelegramChannel, TelegramConfig};
use lifeline_config::{AppConfig, Catalog};
use lifeline_core::Channel;
use lifeline_feed::{DataSource, HttpFeed};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Lifeline Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    if !AppConfig::config_path().exists() {
        println!("  ⚠️  No config file — defaults in use (run `lifeline onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. Fix the config and re-run.");
            return Ok(());
        }
    };

    // Telegram
    match TelegramConfig::from_settings(&config.telegram) {
        Ok(settings) => match TelegramChannel::new(settings) {
            Ok(channel) => match channel.health_check().await {
                Ok(true) => println!("  ✅ Telegram bot token accepted"),
                Ok(false) => {
                    println!("  ❌ Telegram rejected the bot token");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Telegram unreachable: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Telegram client error: {e}");
                issues += 1;
            }
        },
        Err(_) => {
            println!("  ⚠️  No Telegram bot token — `lifeline run` will refuse to start");
            issues += 1;
        }
    }

    // Feed, one request per configured category
    let catalog = Arc::new(Catalog::from_config(&config)?);
    let feed = HttpFeed::new(&config.feed, catalog.clone())?;
    for category in catalog.categories() {
        match feed.fetch(category).await {
            Ok(records) => println!("  ✅ Feed {:<10} {} records", category.as_str(), records.len()),
            Err(e) => {
                println!("  ❌ Feed {:<10} {e}", category.as_str());
                issues += 1;
            }
        }
    }

    if let Some(url) = &config.reporting.url {
        println!("  ✅ Incidents reported to {url}");
    } else {
        println!("  ✅ Incidents logged only (no [reporting] url)");
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
