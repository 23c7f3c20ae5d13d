//! Error taxonomy for ingestion, retrieval and startup.
//!
//! Per-document validation failures are recoverable (skipped and counted by
//! the ingestion pipeline). Retrieval failures are fatal to the request or
//! exploration round that raised them, but any partial results are kept.
//! Configuration errors are fatal at startup.

use thiserror::Error;

use crate::patent::SearchStrategy;

/// Why a single raw record was rejected during validation.
///
/// Never aborts a batch: the pipeline records the rejection and moves on.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The embedding gateway could not be reached or returned an error.
    #[error("embedding service unavailable")]
    EmbeddingUnavailable(#[source] anyhow::Error),

    /// The gateway returned a vector of the wrong length.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimensionMismatch { expected: usize, actual: usize },
}

impl ValidationError {
    /// Short stable label used in ingestion reports.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::EmbeddingUnavailable(_) => "embedding_unavailable",
            Self::EmbeddingDimensionMismatch { .. } => "embedding_dimension_mismatch",
        }
    }
}

/// A search request failed. Carries the strategy that was executing so the
/// caller can tell which leg of a fused query broke.
#[derive(Debug, Error)]
#[error("{strategy} search failed")]
pub struct RetrievalError {
    pub strategy: SearchStrategy,
    #[source]
    pub cause: anyhow::Error,
}

impl RetrievalError {
    pub fn new(strategy: SearchStrategy, cause: anyhow::Error) -> Self {
        Self { strategy, cause }
    }
}

/// Fatal startup problems: unreachable backends, unusable config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("index store unreachable at {path}")]
    IndexUnreachable {
        path: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("unknown embedding provider '{0}'")]
    UnknownProvider(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
