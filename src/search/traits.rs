//! Search trait shared by the keyword, semantic and hybrid strategies.

use async_trait::async_trait;

use crate::error::RetrievalError;
use crate::patent::{SearchHit, SearchStrategy};

/// One retrieval strategy: a single one-shot query returning ranked hits.
///
/// Implementations perform no retry; retry policy belongs to the caller,
/// which knows its request budget.
#[async_trait]
pub trait Search: Send + Sync {
    /// Search for patents relevant to the query.
    ///
    /// Returns hits sorted by descending score, at most one per patent id.
    async fn search(&self, query: &str, limit: usize)
        -> Result<Vec<SearchHit>, RetrievalError>;

    /// Which strategy this implementation executes.
    fn strategy(&self) -> SearchStrategy;
}

/// Enforce the result-list invariants: unique patent ids (keeping the
/// higher-scoring hit) and descending score order with a deterministic
/// patent-id tie-break.
pub fn rank_and_dedup(hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    let mut best: std::collections::HashMap<String, SearchHit> = std::collections::HashMap::new();

    for hit in hits {
        match best.get(hit.patent_id()) {
            Some(existing) if existing.score >= hit.score => {}
            _ => {
                best.insert(hit.patent_id().to_string(), hit);
            }
        }
    }

    let mut ranked: Vec<SearchHit> = best.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.patent_id().cmp(b.patent_id()))
    });
    ranked.truncate(limit);
    ranked
}
