//! Embedding gateway: trait plus local, remote and test providers.

mod fastembed;
mod mock;
mod openai;
mod provider;

pub use fastembed::FastembedProvider;
pub use mock::{FailingEmbedder, MockEmbedder};
pub use openai::OpenAIProvider;
pub use provider::EmbeddingProvider;

use std::sync::Arc;

use crate::config::EmbeddingsConfig;
use crate::error::ConfigError;

/// Build the configured embedding provider.
pub fn create_provider(config: &EmbeddingsConfig) -> Result<Arc<dyn EmbeddingProvider>, ConfigError> {
    match config.provider.as_str() {
        "fastembed" => {
            let provider = FastembedProvider::new(config)
                .map_err(|e| ConfigError::Invalid(format!("fastembed init failed: {e:#}")))?;
            Ok(Arc::new(provider))
        }
        "openai" => {
            let provider = OpenAIProvider::new(config)
                .map_err(|e| ConfigError::Invalid(format!("openai init failed: {e:#}")))?;
            Ok(Arc::new(provider))
        }
        "mock" => Ok(Arc::new(MockEmbedder::new(config.dimension))),
        other => Err(ConfigError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_provider() {
        let config = EmbeddingsConfig {
            provider: "mock".to_string(),
            dimension: 128,
            ..Default::default()
        };

        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.dimension(), 128);
    }

    #[test]
    fn test_create_unknown_provider_fails() {
        let config = EmbeddingsConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };

        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownProvider(_)));
    }
}
