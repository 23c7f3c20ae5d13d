use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

use crate::helpers::test_harness::TestHarness;
use patentrag::search::{KeywordSearch, Search, SemanticSearch};
use patentrag::SearchStrategy;

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
        "Turbine blade",
        "composite wind turbine blade with embedded sensors",
    )?;
    harness.write_record(
        "p3.json",
        "P3",
        "Solid electrolyte",
        "solid state electrolyte layer for lithium batteries",
    )?;

    harness.ingest().await?;
    Ok(harness)
}

#[tokio::test]
async fn test_keyword_search_matches_lexical_terms() -> Result<()> {
    let harness = seeded_harness().await?;
    let search = KeywordSearch::new(Arc::clone(&harness.store) as _);

    let hits = search.search("lithium", 10).await?;

    let ids: Vec<&str> = hits.iter().map(|h| h.patent_id()).collect();
    assert!(ids.contains(&"P1"));
    assert!(ids.contains(&"P3"));
    assert!(!ids.contains(&"P2"));
    assert!(hits.iter().all(|h| h.strategy == SearchStrategy::Keyword));

    Ok(())
}

#[tokio::test]
async fn test_keyword_search_no_match_returns_empty() -> Result<()> {
    let harness = seeded_harness().await?;
    let search = KeywordSearch::new(Arc::clone(&harness.store) as _);

    let hits = search.search("zeolite", 10).await?;
    assert!(hits.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_semantic_identical_abstracts_score_identically() -> Result<()> {
    let harness = TestHarness::new().await?;

    let abstract_text = "graphene oxide membrane for water filtration";
    harness.write_record("p1.json", "P1", "Membrane A", abstract_text)?;
    harness.write_record("p2.json", "P2", "Membrane B", abstract_text)?;
    harness.ingest().await?;

    let search = SemanticSearch::new(
        Arc::clone(&harness.store) as _,
        Arc::clone(&harness.embedder) as _,
    );
    let hits = search.search(abstract_text, 10).await?;

    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.score <= 1.0));
    assert!(
        (hits[0].score - hits[1].score).abs() < 1e-5,
        "identical abstracts must score the same"
    );

    Ok(())
}

#[tokio::test]
async fn test_hybrid_results_are_deduplicated_and_bounded() -> Result<()> {
    let harness = seeded_harness().await?;
    let hybrid = harness.hybrid();

    let hits = hybrid.search("lithium electrolyte", 2).await?;

    assert!(hits.len() <= 2);
    let ids: HashSet<&str> = hits.iter().map(|h| h.patent_id()).collect();
    assert_eq!(ids.len(), hits.len(), "no duplicate patent ids");
    assert!(hits.iter().all(|h| h.strategy == SearchStrategy::Hybrid));

    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score, "scores must be descending");
    }

    Ok(())
}

#[tokio::test]
async fn test_hybrid_prefers_documents_found_by_both_legs() -> Result<()> {
    let harness = seeded_harness().await?;
    let hybrid = harness.hybrid();

    // The query is P1's exact abstract: it matches P1 lexically and the
    // mock embedder maps equal text to the same vector
    let hits = hybrid
        .search("lithium anode coating process for rechargeable cells", 10)
        .await?;

    assert!(!hits.is_empty());
    assert_eq!(hits[0].patent_id(), "P1");

    Ok(())
}

#[tokio::test]
async fn test_query_with_broken_syntax_still_searches() -> Result<()> {
    let harness = seeded_harness().await?;
    let search = KeywordSearch::new(Arc::clone(&harness.store) as _);

    // Unbalanced quote would fail the raw query parser
    let hits = search.search("lithium\" anode", 10).await?;
    assert!(!hits.is_empty());

    Ok(())
}
