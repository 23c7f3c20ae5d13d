//! Status command: shows configuration, index location and statistics.

use anyhow::Result;
use std::env;

use crate::config::Config;
use crate::embeddings::create_provider;
use crate::storage::{IndexStore, PatentIndex};

pub async fn run() -> Result<()> {
    let root = env::current_dir()?;

    if !Config::is_initialized(&root) {
        println!("patentrag is not initialized here.");
        println!();
        println!("Run 'patentrag init' to create a local .patentrag/ directory.");
        return Ok(());
    }

    let config = Config::load(&root)?;

    println!("Data directory: {}", Config::data_dir(&root).display());
    println!("Vector index:   {}", config.db_path(&root).display());
    println!(
        "Embeddings:     {} ({}, dim {})",
        config.embeddings.provider, config.embeddings.model, config.embeddings.dimension
    );
    println!(
        "Fusion weights: keyword {:.2} / semantic {:.2}",
        config.search.keyword_weight, config.search.semantic_weight
    );

    println!();
    match create_provider(&config.embeddings) {
        Ok(provider) => println!("Embedding gateway: ok ({})", provider.provider_name()),
        Err(e) => println!("Embedding gateway: unavailable ({})", e),
    }

    match PatentIndex::open(
        &Config::data_dir(&root),
        &config.storage,
        config.embeddings.dimension,
    )
    .await
    {
        Ok(index) => match index.document_count().await {
            Ok(count) => println!("Indexed patents:   {}", count),
            Err(e) => println!("Indexed patents:   unavailable ({})", e),
        },
        Err(e) => println!("Index store:       unreachable ({})", e),
    }

    Ok(())
}
