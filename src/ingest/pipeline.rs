//! Batch ingestion: load, validate concurrently, then one bulk index write.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::loader::load_records;
use super::validator::DocumentValidator;
use crate::patent::PatentDocument;
use crate::storage::IndexStore;

/// Concurrent validation fan-out; each in-flight record holds one
/// embedding call.
const VALIDATION_CONCURRENCY: usize = 8;

/// Why one record was skipped.
#[derive(Debug, Clone)]
pub struct Rejection {
    /// Source file of the record
    pub source: String,
    /// Stable reason label plus detail
    pub reason: String,
}

/// Outcome of one batch ingestion. Every batch reports counts even when
/// records were skipped; a single bad record never aborts the run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Records seen in the ingestion directory
    pub processed: usize,
    /// Records rejected during load or validation
    pub skipped: usize,
    /// Documents written to the index store
    pub indexed: usize,
    pub rejections: Vec<Rejection>,
}

/// Validate-then-bulk-index pipeline.
///
/// Validation runs concurrently (it is pure apart from the embedding
/// call); indexing happens once at the end so validation failures never
/// interleave with index I/O.
pub struct IngestPipeline {
    validator: DocumentValidator,
    store: Arc<dyn IndexStore>,
}

impl IngestPipeline {
    pub fn new(validator: DocumentValidator, store: Arc<dyn IndexStore>) -> Self {
        Self { validator, store }
    }

    /// Ingest every JSON record under `dir`.
    pub async fn ingest_dir(&self, dir: &Path) -> Result<IngestReport> {
        let loaded = load_records(dir)?;

        let mut report = IngestReport {
            processed: loaded.len(),
            ..Default::default()
        };

        let mut documents: Vec<PatentDocument> = Vec::new();

        let validated: Vec<_> = stream::iter(loaded)
            .map(|entry| {
                let validator = &self.validator;
                async move {
                    let source = entry.path.display().to_string();
                    match entry.record {
                        Ok(raw) => (source, validator.validate(&raw).await.map_err(|e| {
                            format!("{}: {:#}", e.reason(), anyhow::Error::from(e))
                        })),
                        Err(e) => (source, Err(format!("unreadable_record: {:#}", e))),
                    }
                }
            })
            .buffer_unordered(VALIDATION_CONCURRENCY)
            .collect()
            .await;

        for (source, result) in validated {
            match result {
                Ok(document) => documents.push(document),
                Err(reason) => {
                    warn!(source = source.as_str(), reason = reason.as_str(), "Skipping record");
                    report.rejections.push(Rejection { source, reason });
                }
            }
        }

        // Deterministic report and write order regardless of validation
        // completion order
        report.rejections.sort_by(|a, b| a.source.cmp(&b.source));
        documents.sort_by(|a, b| a.patent_id.cmp(&b.patent_id));
        report.skipped = report.rejections.len();

        self.store
            .ensure_index()
            .await
            .context("Failed to ensure index exists")?;

        if !documents.is_empty() {
            report.indexed = self
                .store
                .bulk_index(&documents)
                .await
                .context("Failed to bulk index documents")?;
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            indexed = report.indexed,
            "Ingestion completed"
        );

        Ok(report)
    }
}
