use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use patentrag::cli::{Cli, Commands};
use patentrag::config::Config;
use patentrag::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Load configuration (if available, otherwise use defaults)
    let config = Config::load(&project_root).unwrap_or_default();

    // The guard MUST be held until program exit to ensure logs are flushed
    let _logging_guard = init_logging(&config.logging, &project_root)?;

    tracing::debug!("patentrag starting in {}", project_root.display());

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            patentrag::commands::init::run(force).await?;
        }
        Commands::Ingest { dir } => {
            patentrag::commands::ingest::run(&dir).await?;
        }
        Commands::Search { query, mode, limit } => {
            patentrag::commands::search::run(&query, &mode, limit).await?;
        }
        Commands::Explore {
            query,
            steps,
            limit,
        } => {
            patentrag::commands::explore::run(&query, steps.as_deref(), limit).await?;
        }
        Commands::Status => {
            patentrag::commands::status::run().await?;
        }
    }

    Ok(())
}
