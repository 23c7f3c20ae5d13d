//! Index store: combined lexical + vector backend behind one contract.

mod keyword;
mod lancedb;

pub use keyword::{KeywordIndex, KeywordSchema};
pub use lancedb::PatentStore;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::RwLock;

use crate::config::StorageConfig;
use crate::error::ConfigError;
use crate::patent::{PatentDocument, ScoredDocument};

/// Contract to the search/index backend.
///
/// Two query types over the same corpus: BM25-style text match and vector
/// nearest-neighbor. Bulk indexing replaces rows by patent id. Read-after-
/// write visibility follows the backend's own consistency model; callers
/// must not assume just-indexed documents are instantly searchable.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Idempotent create-if-absent of the index.
    async fn ensure_index(&self) -> Result<()>;

    /// Index a batch of validated documents, replacing any existing rows
    /// with the same patent ids. Returns the number indexed.
    async fn bulk_index(&self, documents: &[PatentDocument]) -> Result<usize>;

    /// Lexical relevance query over title and abstract.
    async fn lexical_query(&self, query: &str, limit: usize) -> Result<Vec<ScoredDocument>>;

    /// Nearest-neighbor query over stored embeddings.
    async fn vector_query(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredDocument>>;

    /// Total number of indexed documents.
    async fn document_count(&self) -> Result<usize>;
}

/// The default backend: a Tantivy keyword index and a LanceDB vector table
/// kept in lockstep under the `.patentrag/` data directory.
pub struct PatentIndex {
    keyword: RwLock<KeywordIndex>,
    vectors: PatentStore,
}

impl PatentIndex {
    /// Open both halves of the index. An unreachable backend is fatal at
    /// startup, surfaced as a `ConfigError` with no retry.
    pub async fn open(
        data_dir: &Path,
        storage: &StorageConfig,
        dimension: usize,
    ) -> Result<Self, ConfigError> {
        let keyword = KeywordIndex::new(data_dir).map_err(|e| ConfigError::IndexUnreachable {
            path: data_dir.display().to_string(),
            cause: e,
        })?;

        let db_path = data_dir.join(&storage.db_path);
        let vectors = PatentStore::new(&db_path, &storage.index_name, dimension)
            .await
            .map_err(|e| ConfigError::IndexUnreachable {
                path: db_path.display().to_string(),
                cause: e,
            })?;

        Ok(Self {
            keyword: RwLock::new(keyword),
            vectors,
        })
    }

    fn keyword_write(&self) -> std::sync::RwLockWriteGuard<'_, KeywordIndex> {
        self.keyword
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn keyword_read(&self) -> std::sync::RwLockReadGuard<'_, KeywordIndex> {
        self.keyword
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IndexStore for PatentIndex {
    async fn ensure_index(&self) -> Result<()> {
        // The keyword half is created on open; make sure the vector table
        // exists too.
        self.vectors.ensure_table().await?;
        Ok(())
    }

    async fn bulk_index(&self, documents: &[PatentDocument]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let patent_ids: Vec<&str> = documents.iter().map(|d| d.patent_id.as_str()).collect();

        // Replace semantics: clear old rows in both halves first.
        self.vectors.delete_by_patent_ids(&patent_ids).await?;

        // Tantivy work is synchronous; keep the write guard out of awaits.
        {
            let mut keyword = self.keyword_write();
            keyword.delete_by_patent_ids(&patent_ids);
            keyword.add_documents(documents)?;
            keyword.commit()?;
        }

        self.vectors.insert_documents(documents).await?;

        Ok(documents.len())
    }

    async fn lexical_query(&self, query: &str, limit: usize) -> Result<Vec<ScoredDocument>> {
        let keyword = self.keyword_read();
        keyword.search(query, limit)
    }

    async fn vector_query(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredDocument>> {
        self.vectors.vector_search(vector.to_vec(), limit).await
    }

    async fn document_count(&self) -> Result<usize> {
        self.vectors.count_documents().await
    }
}
