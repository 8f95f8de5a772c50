//! Cutify CLI, the main entry point.
//!
//! Commands:
//! - `serve`: start the HTTP API
//! - `init-db`: create the database schema
//! - `doctor`: diagnose configuration, database and storage
//! - `config`: print the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "cutify",
    about = "Cutify: AI showrunner and storyboard backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./cutify.toml, then ~/.cutify/config.toml)
    #[arg(short, long, global = true, env = "CUTIFY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the database schema and exit
    InitDb,

    /// Diagnose system health
    Doctor,

    /// Print the effective configuration with secrets redacted
    Config,
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

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::InitDb => commands::init_db::run(config).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
        Commands::Config => commands::config_cmd::run(config).await?,
    }

    Ok(())
}
