//! Loading of raw patent JSON files from an ingestion directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::patent::RawPatentRecord;

/// One file's load attempt. Parse failures are per-record data, not batch
/// errors: the pipeline reports them and keeps going.
pub struct LoadedRecord {
    pub path: PathBuf,
    pub record: Result<RawPatentRecord, anyhow::Error>,
}

/// Read every `*.json` file under `dir`.
///
/// A missing directory is a batch-level error; anything wrong with an
/// individual file is carried per-record.
pub fn load_records(dir: &Path) -> Result<Vec<LoadedRecord>> {
    if !dir.is_dir() {
        anyhow::bail!("ingestion directory '{}' does not exist", dir.display());
    }

    let mut loaded = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();

        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some("json")
        {
            continue;
        }

        let record = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|content| {
                serde_json::from_str::<RawPatentRecord>(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))
            });

        loaded.push(LoadedRecord {
            path: path.to_path_buf(),
            record,
        });
    }

    debug!("Loaded {} candidate records from {}", loaded.len(), dir.display());
    Ok(loaded)
}
