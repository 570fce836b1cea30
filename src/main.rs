mod cli;

use anyhow::Result;
use hindsight::{config, server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hindsight", version, about = "Ask-anything server for your recent digital activity")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP ask server
    Serve,
    /// Ask a single question from the terminal
    Ask {
        /// The question to ask
        query: String,
    },
    /// Import items from a JSON file into the local timeline
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::HindsightConfig::load()?;

    // Initialize tracing with the configured log level, logging to stderr so
    // stdout stays clean for CLI output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Ask { query } => {
            cli::ask(&config, &query).await?;
        }
        Command::Import { file } => {
            cli::import(&config, &file)?;
        }
    }

    Ok(())
}
