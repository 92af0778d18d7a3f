//! `lifeline status`: Show the effective configuration.

use lifeline_config::{AppConfig, Catalog};

use super::load_config;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let catalog = Catalog::from_config(&config)?;

    println!("🩺 Lifeline Status");
    println!("==================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Feed:         {}", config.feed.base_url);
    println!("  Timeout:      {}s", config.feed.timeout_secs);
    println!("  Telegram:     {}", if config.has_bot_token() { "token set" } else { "no token" });
    println!("  Page size:    {}", config.query.page_size);
    println!(
        "  Reporting:    {}",
        config.reporting.url.as_deref().unwrap_or("logs only")
    );
    println!("  Categories:");
    for category in catalog.categories() {
        println!(
            "    {:<10} {}  [{}]",
            category.as_str(),
            catalog.endpoint(category).unwrap_or("-"),
            catalog.aliases_for(category).join(", ")
        );
    }

    if AppConfig::config_path().exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — using defaults (run `lifeline onboard`)");
    }

    Ok(())
}
