//! taoloop CLI: the main entry point.
//!
//! Commands:
//! - `ask`   : Answer one question with an agent profile
//! - `chat`  : Interactive question loop
//! - `check` : Probe the configured model endpoint
//! - `books` : List the book catalog
//! - `config`: Print the default configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taoloop_agent::AgentProfile;

mod commands;

#[derive(Parser)]
#[command(
    name = "taoloop",
    about = "taoloop: Thought-Action-Observation agents over hosted chat models",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from this file instead of ~/.taoloop/config.toml
    #[arg(short, long, global = true, env = "TAOLOOP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        question: String,

        /// Which agent to use (books, weather, calculator)
        #[arg(short, long, default_value = "books")]
        profile: AgentProfile,

        /// Override the configured round limit
        #[arg(short, long)]
        max_iterations: Option<u32>,

        /// Print the full transcript to stderr
        #[arg(long)]
        trace: bool,
    },

    /// Ask questions interactively until `exit`
    Chat {
        /// Which agent to use (books, weather, calculator)
        #[arg(short, long, default_value = "books")]
        profile: AgentProfile,
    },

    /// Check connectivity with the configured model
    Check,

    /// List the books the lookup tool knows about
    Books,

    /// Print configuration
    Config {
        /// Show the effective configuration (file + environment) instead of defaults
        #[arg(long)]
        effective: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Ask {
            question,
            profile,
            max_iterations,
            trace,
        } => commands::ask::run(config_path, &question, profile, max_iterations, trace).await?,
        Commands::Chat { profile } => commands::chat::run(config_path, profile).await?,
        Commands::Check => commands::check::run(config_path).await?,
        Commands::Books => commands::books::run(),
        Commands::Config { effective } => commands::config_cmd::run(config_path, effective)?,
    }

    Ok(())
}
