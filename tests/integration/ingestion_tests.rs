use anyhow::Result;

use crate::helpers::test_harness::TestHarness;
use patentrag::search::{KeywordSearch, Search};
use patentrag::storage::IndexStore;
use std::sync::Arc;

#[tokio::test]
async fn test_ingest_directory_end_to_end() -> Result<()> {
    let harness = TestHarness::new().await?;

    harness.write_record("p1.json", "P1", "Anode coating", "lithium anode coating process")?;
    harness.write_record("p2.json", "P2", "Turbine blade", "composite wind turbine blade")?;
    harness.write_record("p3.json", "P3", "Solid electrolyte", "solid state electrolyte layer")?;

    // One record without an abstract; it must be skipped, not fatal
    std::fs::write(
        harness.records_dir()?.join("bad.json"),
        r#"{"title": "No abstract", "search_parameters": {"patent_id": "P4"}}"#,
    )?;

    let report = harness.ingest().await?;

    assert_eq!(report.processed, 4);
    assert_eq!(report.indexed, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(harness.store.document_count().await?, 3);

    Ok(())
}

#[tokio::test]
async fn test_reingest_replaces_documents_by_patent_id() -> Result<()> {
    let harness = TestHarness::new().await?;

    harness.write_record("p1.json", "P1", "Old title", "lithium cell chemistry")?;
    harness.ingest().await?;
    assert_eq!(harness.store.document_count().await?, 1);

    harness.write_record("p1.json", "P1", "New title", "lithium cell chemistry improved")?;
    let report = harness.ingest().await?;

    assert_eq!(report.indexed, 1);
    assert_eq!(
        harness.store.document_count().await?,
        1,
        "re-ingesting the same patent id must not duplicate rows"
    );

    let search = KeywordSearch::new(Arc::clone(&harness.store) as _);
    let hits = search.search("lithium", 10).await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.title, "New title");

    Ok(())
}

#[tokio::test]
async fn test_ingest_missing_directory_fails() -> Result<()> {
    let harness = TestHarness::new().await?;

    let validator = patentrag::ingest::DocumentValidator::new(
        Arc::clone(&harness.embedder) as _,
        crate::helpers::test_harness::TEST_DIMENSION,
    );
    let pipeline =
        patentrag::ingest::IngestPipeline::new(validator, Arc::clone(&harness.store) as _);

    let missing = harness.temp_dir.path().join("nope");
    assert!(pipeline.ingest_dir(&missing).await.is_err());

    Ok(())
}
