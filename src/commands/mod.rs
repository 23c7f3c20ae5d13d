pub mod explore;
pub mod ingest;
pub mod init;
pub mod search;
pub mod status;

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::storage::{IndexStore, PatentIndex};

/// Everything a command needs after startup: the loaded config, the
/// embedding gateway and the opened index.
pub(crate) struct CommandContext {
    pub config: Config,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn IndexStore>,
}

/// Load config and open the index for the current directory. An
/// unreachable index backend fails here, before any command logic runs.
pub(crate) async fn open_context() -> Result<CommandContext> {
    let root = project_root()?;

    if !Config::is_initialized(&root) {
        bail!(
            "No {} directory found. Run 'patentrag init' first.",
            Config::data_dir(&root).display()
        );
    }

    let config = Config::load(&root)?;
    let embedder = create_provider(&config.embeddings)?;

    let store = PatentIndex::open(
        &Config::data_dir(&root),
        &config.storage,
        config.embeddings.dimension,
    )
    .await?;

    Ok(CommandContext {
        config,
        embedder,
        store: Arc::new(store),
    })
}

pub(crate) fn project_root() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}
