//! `lifeline config`: Configuration management commands.

use lifeline_config::{AppConfig, Catalog};

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            if !config.has_bot_token() {
                warnings.push("No Telegram bot token (set TELEGRAM_BOT_TOKEN); only `chat` and `ask` will work");
            }
            if config.query.page_size > 10 {
                warnings.push("page_size above 10 makes replies long on mobile");
            }
            if config.reporting.token.is_some() && config.reporting.url.is_none() {
                warnings.push("[reporting] token is set but url is not; incidents are only logged");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            let catalog = Catalog::from_config(&config)?;
            println!();
            println!("   Feed:        {}", config.feed.base_url);
            println!("   Categories:  {}", catalog.categories().count());
            println!("   Page size:   {}", config.query.page_size);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    println!("{}", render_redacted(&config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

/// TOML for display, with credentials masked.
fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.telegram.bot_token.is_some() {
        shown.telegram.bot_token = Some("***".into());
    }
    if shown.reporting.token.is_some() {
        shown.reporting.token = Some("***".into());
    }
    toml::to_string_pretty(&shown)
}
