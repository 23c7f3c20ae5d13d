use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "patentrag")]
#[command(author, version, about = "Patent retrieval and iterative exploration CLI")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize patentrag in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate and index patent JSON records from a directory
    Ingest {
        /// Directory containing patent JSON files
        dir: PathBuf,
    },

    /// Search the patent index
    Search {
        /// Search query
        query: String,

        /// Strategy: keyword, semantic or hybrid
        #[arg(short, long, default_value = "hybrid")]
        mode: String,

        /// Maximum number of results to return
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Run a bounded exploration loop, refining the query each round
    Explore {
        /// Initial search query
        query: String,

        /// Refinement rounds; unusable values fall back to the configured
        /// default
        #[arg(short, long)]
        steps: Option<String>,

        /// Hits fetched per round
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show index status and statistics
    Status,
}
