use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::traits::{rank_and_dedup, Search};
use crate::error::RetrievalError;
use crate::patent::{SearchHit, SearchStrategy};
use crate::storage::IndexStore;

/// Lexical (BM25) search over patent titles and abstracts.
pub struct KeywordSearch {
    store: Arc<dyn IndexStore>,
}

impl KeywordSearch {
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Search for KeywordSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, RetrievalError> {
        let start = Instant::now();

        let scored = self
            .store
            .lexical_query(query, limit)
            .await
            .map_err(|e| RetrievalError::new(SearchStrategy::Keyword, e))?;

        let hits = scored
            .into_iter()
            .map(|s| SearchHit {
                document: s.document,
                score: s.score,
                strategy: SearchStrategy::Keyword,
            })
            .collect();

        let results = rank_and_dedup(hits, limit);

        info!(
            search_type = "keyword",
            query = query,
            results = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Keyword search completed"
        );

        Ok(results)
    }

    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::Keyword
    }
}
