use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::helpers::test_harness::TestHarness;
use patentrag::explore::{ExplorationStatus, Explorer};

async fn seeded_harness() -> Result<TestHarness> {
    let harness = TestHarness::new().await?;

    harness.write_record(
        "p1.json",
        "P1",
        "Anode coating",
        "lithium anode coating process for rechargeable cells",
    )?;
    harness.write_record(
        "p2.json",
        "P2",
        "Solid electrolyte",
        "solid state electrolyte layer for lithium batteries",
    )?;
    harness.write_record(
        "p3.json",
        "P3",
        "Separator film",
        "porous polymer separator film for lithium cells",
    )?;

    harness.ingest().await?;
    Ok(harness)
}

#[tokio::test]
async fn test_exploration_converges_on_static_corpus() -> Result<()> {
    let harness = seeded_harness().await?;
    let explorer = Explorer::with_config(Arc::new(harness.hybrid()), &harness.config.exploration);

    // Round one retrieves the whole corpus, so round two adds nothing new
    let outcome = explorer.run("lithium", 5, &CancellationToken::new()).await;

    assert_eq!(outcome.status, ExplorationStatus::Converged);
    assert_eq!(outcome.rounds, 2);
    assert_eq!(outcome.hits.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_exploration_hits_are_unique_and_sorted() -> Result<()> {
    let harness = seeded_harness().await?;
    let explorer = Explorer::with_config(Arc::new(harness.hybrid()), &harness.config.exploration);

    let outcome = explorer.run("lithium", 3, &CancellationToken::new()).await;

    let ids: HashSet<&str> = outcome.hits.iter().map(|h| h.patent_id()).collect();
    assert_eq!(ids.len(), outcome.hits.len(), "no duplicate patent ids");

    for pair in outcome.hits.windows(2) {
        assert!(pair[0].score >= pair[1].score, "scores must be descending");
    }

    Ok(())
}

#[tokio::test]
async fn test_exploration_single_step_exhausts() -> Result<()> {
    let harness = seeded_harness().await?;
    let explorer = Explorer::with_config(Arc::new(harness.hybrid()), &harness.config.exploration);

    let outcome = explorer.run("lithium", 1, &CancellationToken::new()).await;

    assert_eq!(outcome.status, ExplorationStatus::Exhausted);
    assert_eq!(outcome.rounds, 1);
    assert!(!outcome.hits.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_exploration_cancelled_before_start() -> Result<()> {
    let harness = seeded_harness().await?;
    let explorer = Explorer::with_config(Arc::new(harness.hybrid()), &harness.config.exploration);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = explorer.run("lithium", 3, &cancel).await;

    assert_eq!(outcome.status, ExplorationStatus::Cancelled);
    assert_eq!(outcome.rounds, 0);
    assert!(outcome.hits.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_exploration_refines_query_with_corpus_terms() -> Result<()> {
    let harness = seeded_harness().await?;
    let explorer = Explorer::with_config(Arc::new(harness.hybrid()), &harness.config.exploration);

    let outcome = explorer.run("lithium", 3, &CancellationToken::new()).await;

    assert!(outcome.final_query.starts_with("lithium"));
    assert_ne!(
        outcome.final_query, "lithium",
        "refinement must append terms mined from results"
    );

    Ok(())
}
