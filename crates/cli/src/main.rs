//! Lifeline CLI: the main entry point.
//!
//! Commands:
//! - `run`: Serve the Telegram bot
//! - `chat`: Talk to the bot in the terminal
//! - `ask`: Send one message and print the reply
//! - `onboard`: Write a default config file
//! - `status`: Show the effective configuration
//! - `doctor`: Diagnose configuration and connectivity
//! - `config`: Validate, show or locate the config file

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "lifeline",
    about = "Lifeline — find verified oxygen, beds, medicine and more by district",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "LIFELINE_LOG_FORMAT")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Telegram bot until interrupted
    Run,

    /// Chat with the bot in the terminal
    Chat,

    /// Send a single message and print the reply
    Ask {
        /// The message, e.g. "oxygen in Mumbai"
        #[arg(short, long)]
        message: String,
    },

    /// Create the config directory and a default config file
    Onboard,

    /// Show the effective configuration
    Status,

    /// Diagnose configuration and connectivity
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate the config file
    Validate,
    /// Print the effective configuration as TOML (secrets redacted)
    Show,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }

    match cli.command {
        Commands::Run => commands::run::run().await?,
        Commands::Chat => commands::chat::run().await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
