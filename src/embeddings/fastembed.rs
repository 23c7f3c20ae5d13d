use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use super::provider::EmbeddingProvider;
use crate::config::EmbeddingsConfig;

/// Local embedding provider backed by fastembed.
///
/// Downloads the model on first use if not cached.
pub struct FastembedProvider {
    model: TextEmbedding,
    dimension: usize,
    batch_size: usize,
}

impl FastembedProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let model_type = parse_model_name(&config.model);

        info!("Loading embedding model: {}", config.model);

        let model =
            TextEmbedding::try_new(InitOptions::new(model_type).with_show_download_progress(true))
                .with_context(|| format!("Failed to initialize embedding model: {}", config.model))?;

        info!("Embedding model loaded");

        Ok(Self {
            model,
            dimension: config.dimension,
            batch_size: config.batch_size,
        })
    }
}

/// Map a model name string to the fastembed enum, falling back to nomic.
fn parse_model_name(name: &str) -> EmbeddingModel {
    match name {
        "nomic-embed-text-v1.5" | "nomic-embed-text" => EmbeddingModel::NomicEmbedTextV15,
        "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => EmbeddingModel::AllMiniLML6V2,
        "bge-small-en-v1.5" | "bge-small" => EmbeddingModel::BGESmallENV15,
        "bge-base-en-v1.5" | "bge-base" => EmbeddingModel::BGEBaseENV15,
        "bge-large-en-v1.5" | "bge-large" => EmbeddingModel::BGELargeENV15,
        _ => {
            tracing::warn!(
                "Unknown model '{}', falling back to nomic-embed-text-v1.5",
                name
            );
            EmbeddingModel::NomicEmbedTextV15
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FastembedProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let batch: Vec<&str> = chunk.iter().map(|s| s.as_str()).collect();
            let embeddings = self
                .model
                .embed(batch, None)
                .with_context(|| "Failed to generate embeddings")?;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embeddings = self
            .model
            .embed(vec![query], None)
            .with_context(|| "Failed to generate query embedding")?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding generated for query"))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "fastembed"
    }
}
