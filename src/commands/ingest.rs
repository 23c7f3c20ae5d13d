use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use super::open_context;
use crate::ingest::{DocumentValidator, IngestPipeline};

pub async fn run(dir: &Path) -> Result<()> {
    let ctx = open_context().await?;

    let validator = DocumentValidator::new(
        Arc::clone(&ctx.embedder),
        ctx.config.embeddings.dimension,
    );
    let pipeline = IngestPipeline::new(validator, Arc::clone(&ctx.store));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Ingesting patents from {}", dir.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let report = pipeline.ingest_dir(dir).await;
    spinner.finish_and_clear();
    let report = report?;

    info!(
        processed = report.processed,
        indexed = report.indexed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Ingest command completed"
    );

    println!(
        "Ingested {} of {} records in {:.2}s",
        report.indexed,
        report.processed,
        start.elapsed().as_secs_f64()
    );

    if !report.rejections.is_empty() {
        println!("\nSkipped {} records:", report.skipped);
        for rejection in &report.rejections {
            println!("  {}: {}", rejection.source, rejection.reason);
        }
    }

    Ok(())
}
