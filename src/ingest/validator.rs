//! Validation and normalization of raw patent records.

use std::sync::Arc;
use tracing::debug;

use crate::embeddings::EmbeddingProvider;
use crate::error::ValidationError;
use crate::patent::{PatentDocument, RawPatentRecord};

/// Turns raw records into indexable documents.
///
/// Pure given its inputs and the gateway response: the only side effect is
/// the embedding call, and that call is never made for records that fail
/// the field checks.
pub struct DocumentValidator {
    embedder: Arc<dyn EmbeddingProvider>,
    expected_dimension: usize,
}

impl DocumentValidator {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, expected_dimension: usize) -> Self {
        Self {
            embedder,
            expected_dimension,
        }
    }

    pub fn expected_dimension(&self) -> usize {
        self.expected_dimension
    }

    /// Validate one record. Field checks happen before any gateway call.
    pub async fn validate(&self, raw: &RawPatentRecord) -> Result<PatentDocument, ValidationError> {
        let abstract_text = match raw.abstract_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(ValidationError::MissingField("abstract")),
        };

        let patent_id = match raw.search_parameters.patent_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(ValidationError::MissingField("patent_id")),
        };

        let token_count = count_tokens(abstract_text);

        let vectors = self
            .embedder
            .embed(&[abstract_text.to_string()])
            .await
            .map_err(ValidationError::EmbeddingUnavailable)?;

        let embedding = vectors
            .into_iter()
            .next()
            .ok_or_else(|| {
                ValidationError::EmbeddingUnavailable(anyhow::anyhow!(
                    "provider returned no vector"
                ))
            })?;

        if embedding.len() != self.expected_dimension {
            return Err(ValidationError::EmbeddingDimensionMismatch {
                expected: self.expected_dimension,
                actual: embedding.len(),
            });
        }

        debug!(
            patent_id = patent_id,
            token_count, "Validated patent record"
        );

        Ok(PatentDocument {
            patent_id: patent_id.to_string(),
            title: raw.title.clone().unwrap_or_default(),
            abstract_text: abstract_text.to_string(),
            publication_date: raw.publication_date.clone(),
            pdf_link: raw.pdf.clone(),
            token_count,
            embedding,
        })
    }
}

/// Deterministic token count: number of alphanumeric runs.
///
/// Used for downstream analytics only, never for ranking, so a stable
/// reproducible integer is all the contract requires.
pub fn count_tokens(text: &str) -> usize {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{FailingEmbedder, MockEmbedder};

    fn raw(patent_id: Option<&str>, abstract_text: Option<&str>) -> RawPatentRecord {
        RawPatentRecord {
            title: Some("Lithium anode coating".to_string()),
            abstract_text: abstract_text.map(String::from),
            publication_date: Some("2021-03-04".to_string()),
            pdf: None,
            search_parameters: crate::patent::SearchParameters {
                patent_id: patent_id.map(String::from),
            },
        }
    }

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens("lithium anode coating"), 3);
        assert_eq!(count_tokens("  solid-state electrolyte. "), 3);
        assert_eq!(count_tokens(""), 0);
    }

    #[tokio::test]
    async fn test_valid_record_produces_document() {
        let embedder = Arc::new(MockEmbedder::new(768));
        let validator = DocumentValidator::new(embedder, 768);

        let document = validator
            .validate(&raw(Some("P1"), Some("lithium anode coating")))
            .await
            .unwrap();

        assert_eq!(document.patent_id, "P1");
        assert_eq!(document.token_count, 3);
        assert_eq!(document.embedding.len(), 768);
        assert_eq!(document.publication_date.as_deref(), Some("2021-03-04"));
    }

    #[tokio::test]
    async fn test_missing_abstract_rejected_before_gateway() {
        let embedder = Arc::new(MockEmbedder::new(768));
        let validator = DocumentValidator::new(embedder.clone(), 768);

        let err = validator
            .validate(&raw(Some("P1"), None))
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::MissingField("abstract")));
        assert_eq!(embedder.call_count(), 0, "gateway must not be called");
    }

    #[tokio::test]
    async fn test_empty_patent_id_rejected_before_gateway() {
        let embedder = Arc::new(MockEmbedder::new(768));
        let validator = DocumentValidator::new(embedder.clone(), 768);

        let err = validator
            .validate(&raw(Some("  "), Some("some abstract")))
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::MissingField("patent_id")));
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        // Provider produces 384-dim vectors but 768 is expected
        let embedder = Arc::new(MockEmbedder::new(384));
        let validator = DocumentValidator::new(embedder, 768);

        let err = validator
            .validate(&raw(Some("P1"), Some("some abstract")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ValidationError::EmbeddingDimensionMismatch {
                expected: 768,
                actual: 384
            }
        ));
    }

    #[tokio::test]
    async fn test_gateway_failure_maps_to_unavailable() {
        let embedder = Arc::new(FailingEmbedder::new(768));
        let validator = DocumentValidator::new(embedder, 768);

        let err = validator
            .validate(&raw(Some("P1"), Some("some abstract")))
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::EmbeddingUnavailable(_)));
    }
}
