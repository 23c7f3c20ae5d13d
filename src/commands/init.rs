use anyhow::{bail, Result};
use std::env;
use tracing::info;

use crate::Config;

pub async fn run(force: bool) -> Result<()> {
    let root = env::current_dir()?;

    if Config::is_initialized(&root) && !force {
        bail!(
            "patentrag is already initialized in {:?} (use --force to overwrite)",
            Config::data_dir(&root)
        );
    }

    let config = Config::default();
    config.save(&root)?;

    info!("Initialized patentrag in {:?}", Config::data_dir(&root));
    println!(
        "✓ Created {} with default configuration",
        Config::data_dir(&root).display()
    );
    println!("\nNext steps:");
    println!("  1. Edit .patentrag/config.toml to customize settings");
    println!("  2. Run 'patentrag ingest <dir>' to index patent records");
    println!("  3. Run 'patentrag search <query>' or 'patentrag explore <query>'");

    Ok(())
}
