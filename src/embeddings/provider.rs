use anyhow::Result;
use async_trait::async_trait;

/// Contract to an external embedding service.
///
/// Implementations are thin: no retry or backoff lives here, callers own
/// that policy. A failed call surfaces to the validator as
/// `EmbeddingUnavailable`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate embedding for a single query (may have special optimization)
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors this provider produces
    fn dimension(&self) -> usize;

    /// Provider name for logging and the status command
    fn provider_name(&self) -> &'static str;
}
