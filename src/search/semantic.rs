use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::traits::{rank_and_dedup, Search};
use crate::embeddings::EmbeddingProvider;
use crate::error::RetrievalError;
use crate::patent::{SearchHit, SearchStrategy};
use crate::storage::IndexStore;

/// Semantic search: embed the query, then nearest-neighbor over stored
/// patent embeddings.
pub struct SemanticSearch {
    store: Arc<dyn IndexStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SemanticSearch {
    pub fn new(store: Arc<dyn IndexStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }
}

#[async_trait]
impl Search for SemanticSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, RetrievalError> {
        let start = Instant::now();

        let query_vector = self
            .embedder
            .embed_query(query)
            .await
            .with_context(|| format!("Failed to embed query: {}", query))
            .map_err(|e| RetrievalError::new(SearchStrategy::Semantic, e))?;

        debug!(
            "Generated query embedding with {} dimensions",
            query_vector.len()
        );

        let scored = self
            .store
            .vector_query(&query_vector, limit)
            .await
            .map_err(|e| RetrievalError::new(SearchStrategy::Semantic, e))?;

        let hits = scored
            .into_iter()
            .map(|s| SearchHit {
                document: s.document,
                score: s.score,
                strategy: SearchStrategy::Semantic,
            })
            .collect();

        let results = rank_and_dedup(hits, limit);

        info!(
            search_type = "semantic",
            query = query,
            results = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Semantic search completed"
        );

        Ok(results)
    }

    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::Semantic
    }
}
