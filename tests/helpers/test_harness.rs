use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use patentrag::config::Config;
use patentrag::embeddings::MockEmbedder;
use patentrag::ingest::{DocumentValidator, IngestPipeline, IngestReport};
use patentrag::search::HybridSearch;
use patentrag::storage::PatentIndex;

/// Small dimension keeps the vector table cheap in tests.
pub const TEST_DIMENSION: usize = 64;

/// A temp-dir-backed index with a deterministic mock embedder.
pub struct TestHarness {
    pub temp_dir: TempDir,
    pub config: Config,
    pub embedder: Arc<MockEmbedder>,
    pub store: Arc<PatentIndex>,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;

        let mut config = Config::default();
        config.embeddings.provider = "mock".to_string();
        config.embeddings.dimension = TEST_DIMENSION;

        let data_dir = temp_dir.path().join(".patentrag");
        std::fs::create_dir_all(&data_dir)?;

        let embedder = Arc::new(MockEmbedder::new(TEST_DIMENSION));
        let store = Arc::new(
            PatentIndex::open(&data_dir, &config.storage, TEST_DIMENSION).await?,
        );

        Ok(Self {
            temp_dir,
            config,
            embedder,
            store,
        })
    }

    /// Directory holding raw patent JSON files for ingestion.
    pub fn records_dir(&self) -> Result<PathBuf> {
        let dir = self.temp_dir.path().join("records");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write one raw patent record file.
    pub fn write_record(
        &self,
        name: &str,
        patent_id: &str,
        title: &str,
        abstract_text: &str,
    ) -> Result<()> {
        let record = serde_json::json!({
            "title": title,
            "abstract": abstract_text,
            "publication_date": "2021-03-04",
            "search_parameters": { "patent_id": patent_id },
        });
        std::fs::write(
            self.records_dir()?.join(name),
            serde_json::to_string_pretty(&record)?,
        )?;
        Ok(())
    }

    /// Run the full ingestion pipeline over the records directory.
    pub async fn ingest(&self) -> Result<IngestReport> {
        let validator = DocumentValidator::new(Arc::clone(&self.embedder) as _, TEST_DIMENSION);
        let pipeline = IngestPipeline::new(validator, Arc::clone(&self.store) as _);
        pipeline.ingest_dir(&self.records_dir()?).await
    }

    /// Hybrid search over the harness index with default weights.
    pub fn hybrid(&self) -> HybridSearch {
        HybridSearch::with_config(
            Arc::clone(&self.store) as _,
            Arc::clone(&self.embedder) as _,
            &self.config.search,
        )
    }
}
