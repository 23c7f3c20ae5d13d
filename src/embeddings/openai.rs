use anyhow::{anyhow, Context, Result};
use async_openai::{
    config::OpenAIConfig as AsyncOpenAIConfig, types::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;
use tracing::info;

use super::provider::EmbeddingProvider;
use crate::config::EmbeddingsConfig;

/// Remote embedding gateway speaking the OpenAI embeddings API.
///
/// With a custom `base_url` this also covers self-hosted services that
/// expose a compatible endpoint. Deliberately retry-free: a failed request
/// surfaces immediately and the caller decides whether to try again.
pub struct OpenAIProvider {
    client: Client<AsyncOpenAIConfig>,
    model: String,
    dimension: usize,
    batch_size: usize,
}

impl OpenAIProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("API key not found in env var {}", config.api_key_env))?;

        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        info!("Initialized OpenAI-compatible provider with model: {}", config.model);

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            dimension: config.dimension,
            // OpenAI caps embedding inputs at 2048 per request
            batch_size: config.batch_size.min(2048),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(batch.to_vec())
                .build()
                .context("Failed to build embedding request")?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .context("Embedding API request failed")?;

            for data in response.data {
                all_embeddings.push(data.embedding);
            }
        }

        Ok(all_embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(vec![query.to_string()])
            .build()
            .context("Failed to build query request")?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .context("Embedding API request failed")?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow!("No embedding returned"))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires API key and network
    async fn test_openai_embed_query() {
        let config = EmbeddingsConfig {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            ..Default::default()
        };

        let provider = OpenAIProvider::new(&config).unwrap();
        let embedding = provider.embed_query("lithium battery separator").await.unwrap();

        assert_eq!(embedding.len(), 1536);
    }
}
