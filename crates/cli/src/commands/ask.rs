//! `lifeline ask`: Send one message and print the reply.

use lifeline_channels::cli::local_message;
use lifeline_core::Markup;
use lifeline_query::guarded;

use super::{Runtime, load_config};

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::build(load_config()?)?;
    let message = local_message(message);

    let reply = guarded(
        runtime.reporter.as_ref(),
        &message,
        runtime.bot.handle(&message, Markup::Plain),
    )
    .await;

    println!("{}", reply.text);
    Ok(())
}
