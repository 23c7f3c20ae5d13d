//! Core data model: raw patent records, validated documents and search hits.

use serde::{Deserialize, Serialize};

/// A raw patent record as persisted by the acquisition layer.
///
/// One JSON file per patent. All keys are optional at this stage; the
/// validator decides what is actually indexable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPatentRecord {
    pub title: Option<String>,

    /// `abstract` is a reserved word in Rust, hence the rename.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,

    pub publication_date: Option<String>,

    pub pdf: Option<String>,

    /// The upstream provider nests the patent identifier under the search
    /// parameters it echoes back with each record.
    #[serde(default)]
    pub search_parameters: SearchParameters,
}

/// Echoed request parameters carrying the patent identifier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParameters {
    pub patent_id: Option<String>,
}

/// A validated, embedded patent document ready for indexing.
///
/// Immutable once built. Indexable only when `patent_id` and
/// `abstract_text` are non-empty and `embedding` has the configured
/// dimension. Re-ingesting the same `patent_id` replaces the stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentDocument {
    /// Unique business key.
    pub patent_id: String,
    pub title: String,
    pub abstract_text: String,
    pub publication_date: Option<String>,
    pub pdf_link: Option<String>,
    /// Deterministic token count of the abstract, kept for analytics.
    pub token_count: usize,
    /// Fixed-dimension embedding of the abstract. Empty on documents
    /// reconstructed from a search hit; stores do not return vectors.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// A document paired with a backend-native relevance score.
///
/// Intermediate shape returned by the index store before a strategy tags
/// and orders the results.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: PatentDocument,
    pub score: f32,
}

/// One ranked retrieval result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: PatentDocument,
    /// Strategy-specific scale: raw BM25 for keyword, similarity in
    /// (0, 1] for semantic, fused normalized score for hybrid.
    pub score: f32,
    pub strategy: SearchStrategy,
}

impl SearchHit {
    pub fn patent_id(&self) -> &str {
        &self.document.patent_id
    }
}

/// Closed set of retrieval strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    Keyword,
    Semantic,
    Hybrid,
}

impl SearchStrategy {
    /// Parse a CLI mode string. Unknown values fall back to hybrid, the
    /// original default.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "bm25" | "lexical" => Self::Keyword,
            "semantic" | "vector" => Self::Semantic,
            _ => Self::Hybrid,
        }
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword => write!(f, "keyword"),
            Self::Semantic => write!(f, "semantic"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}
