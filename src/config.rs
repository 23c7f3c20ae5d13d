use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".patentrag";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub exploration: ExplorationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Provider backend: "fastembed" (local), "openai" (remote) or "mock"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Embedding model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Expected embedding dimension; vectors of any other length are rejected
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Batch size for embedding generation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Base URL for an OpenAI-compatible endpoint (None = api.openai.com)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key for remote providers
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimension: default_dimension(),
            batch_size: default_batch_size(),
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_provider() -> String {
    "fastembed".to_string()
}

fn default_model() -> String {
    "nomic-embed-text-v1.5".to_string()
}

fn default_dimension() -> usize {
    768
}

fn default_batch_size() -> usize {
    32
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the LanceDB database (relative to .patentrag/)
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Logical index name, used as the vector table name
    #[serde(default = "default_index_name")]
    pub index_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            index_name: default_index_name(),
        }
    }
}

fn default_db_path() -> String {
    "patents.lance".to_string()
}

fn default_index_name() -> String {
    "patents".to_string()
}

/// Weights and limits for the search strategy layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Weight for the keyword (BM25) leg of hybrid fusion
    #[serde(default = "default_fusion_weight")]
    pub keyword_weight: f32,

    /// Weight for the semantic (vector) leg of hybrid fusion
    #[serde(default = "default_fusion_weight")]
    pub semantic_weight: f32,

    /// Default number of results to return
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keyword_weight: default_fusion_weight(),
            semantic_weight: default_fusion_weight(),
            default_limit: default_search_limit(),
        }
    }
}

fn default_fusion_weight() -> f32 {
    0.5
}

fn default_search_limit() -> usize {
    10
}

/// Bounds for the iterative exploration loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Refinement rounds when the caller does not supply a usable value
    #[serde(default = "default_steps")]
    pub default_steps: usize,

    /// Newly retrieved hits mined for refinement terms each round
    #[serde(default = "default_refine_top_k")]
    pub refine_top_k: usize,

    /// Hits fetched per hybrid round
    #[serde(default = "default_round_limit")]
    pub round_limit: usize,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            default_steps: default_steps(),
            refine_top_k: default_refine_top_k(),
            round_limit: default_round_limit(),
        }
    }
}

fn default_steps() -> usize {
    3
}

fn default_refine_top_k() -> usize {
    3
}

fn default_round_limit() -> usize {
    10
}

/// File/stderr logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable file logging under the log directory
    #[serde(default)]
    pub enabled: bool,

    /// Also log to stderr
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// File log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory (relative paths resolve against the project root)
    #[serde(default = "default_log_dir")]
    pub directory: PathBuf,

    /// Rotation strategy: hourly, daily, minutely, never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Log file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: default_true(),
            level: default_log_level(),
            directory: default_log_dir(),
            rotation: default_rotation(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".patentrag/logs")
}

fn default_rotation() -> String {
    "daily".to_string()
}

fn default_file_prefix() -> String {
    "patentrag.log".to_string()
}

impl Config {
    /// Load configuration from the .patentrag directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .patentrag directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the .patentrag directory
    pub fn data_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR)
    }

    /// Get the path to the LanceDB database
    pub fn db_path(&self, root: &Path) -> PathBuf {
        Self::data_dir(root).join(&self.storage.db_path)
    }

    /// Check if patentrag is initialized in the given directory
    pub fn is_initialized(root: &Path) -> bool {
        Self::data_dir(root).exists()
    }
}
