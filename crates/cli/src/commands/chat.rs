//! `lifeline chat`: Talk to the bot in the terminal.

use std::sync::Arc;

use lifeline_channels::{ChannelRegistry, CliChannel};
use lifeline_query::Dispatcher;

use super::{Runtime, load_config};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::build(load_config()?)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Lifeline — Interactive Mode           ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Feed:      {}", runtime.config.feed.base_url);
    println!("  Page size: {}", runtime.config.query.page_size);
    println!();
    println!("  Ask for a resource and a district, e.g. \"oxygen in Mumbai\".");
    println!("  Send /more for further results, /help for all categories.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut registry = ChannelRegistry::new();
    registry.register(Arc::new(CliChannel::new()));

    let dispatcher = Arc::new(Dispatcher::new(
        runtime.bot.clone(),
        Arc::new(registry),
        runtime.reporter.clone(),
    ));
    dispatcher.run().await?;

    println!();
    println!("  Stay safe! 👋");
    println!();
    Ok(())
}
