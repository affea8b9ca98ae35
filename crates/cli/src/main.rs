//! Skillbot CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write the default configuration file
//! - `ingest`  — Load the configured corpora into the knowledge store
//! - `serve`   — Start the HTTP skill server
//! - `ask`     — One-shot question through the pipeline

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "skillbot",
    about = "Skillbot — Kakao chatbot skill backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Ingest the configured corpora into the knowledge store
    Ingest,

    /// Start the HTTP skill server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a one-shot question through the pipeline
    Ask {
        /// The question text
        message: String,

        /// Conversation identifier for history (defaults to "local")
        #[arg(short, long)]
        conversation: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ingest => commands::ingest::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask {
            message,
            conversation,
        } => commands::ask::run(message, conversation).await?,
    }

    Ok(())
}
