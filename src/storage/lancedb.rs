//! Vector half of the index store, backed by LanceDB.

use anyhow::{Context, Result};
use arrow_array::types::Float32Type;
use arrow_array::{
    Array, FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, Table};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::patent::{PatentDocument, ScoredDocument};

/// Vector store holding one row per patent.
pub struct PatentStore {
    db: Connection,
    db_path: PathBuf,
    table_name: String,
    dimension: usize,
}

impl PatentStore {
    /// Create or open a LanceDB store at the given path.
    pub async fn new(path: &Path, table_name: &str, dimension: usize) -> Result<Self> {
        let db_path = path.to_path_buf();
        let path_str = path.to_string_lossy();

        info!("Opening LanceDB at: {}", path_str);

        let db = connect(&path_str)
            .execute()
            .await
            .with_context(|| format!("Failed to connect to LanceDB at {}", path_str))?;

        Ok(Self {
            db,
            db_path,
            table_name: table_name.to_string(),
            dimension,
        })
    }

    /// Idempotent create-if-absent of the patents table.
    pub async fn ensure_table(&self) -> Result<Table> {
        let table_names = self.db.table_names().execute().await?;

        if table_names.contains(&self.table_name) {
            debug!("Opening existing table: {}", self.table_name);
            self.db
                .open_table(&self.table_name)
                .execute()
                .await
                .with_context(|| format!("Failed to open table {}", self.table_name))
        } else {
            debug!("Creating new table: {}", self.table_name);
            let batches = RecordBatchIterator::new(vec![], Arc::new(self.table_schema()));
            self.db
                .create_table(&self.table_name, Box::new(batches))
                .execute()
                .await
                .with_context(|| "Failed to create patents table")
        }
    }

    fn table_schema(&self) -> Schema {
        Schema::new(vec![
            Field::new("patent_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("abstract", DataType::Utf8, false),
            Field::new("publication_date", DataType::Utf8, true),
            Field::new("pdf", DataType::Utf8, true),
            Field::new("token_count", DataType::Int32, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.dimension as i32,
                ),
                false,
            ),
        ])
    }

    /// Insert documents. Existing rows for the same patent ids must be
    /// deleted first; see `delete_by_patent_ids`.
    pub async fn insert_documents(&self, documents: &[PatentDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let table = self.ensure_table().await?;

        let batch = self.documents_to_record_batch(documents)?;
        let batches = RecordBatchIterator::new(vec![Ok(batch)], Arc::new(self.table_schema()));

        table
            .add(Box::new(batches))
            .execute()
            .await
            .with_context(|| "Failed to insert documents")?;

        info!("Inserted {} documents into vector store", documents.len());

        Ok(())
    }

    fn documents_to_record_batch(&self, documents: &[PatentDocument]) -> Result<RecordBatch> {
        let patent_ids: Vec<&str> = documents.iter().map(|d| d.patent_id.as_str()).collect();
        let titles: Vec<&str> = documents.iter().map(|d| d.title.as_str()).collect();
        let abstracts: Vec<&str> = documents.iter().map(|d| d.abstract_text.as_str()).collect();
        let publication_dates: Vec<Option<&str>> = documents
            .iter()
            .map(|d| d.publication_date.as_deref())
            .collect();
        let pdfs: Vec<Option<&str>> = documents.iter().map(|d| d.pdf_link.as_deref()).collect();
        let token_counts: Vec<i32> = documents.iter().map(|d| d.token_count as i32).collect();

        let embedding_array = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            documents
                .iter()
                .map(|d| Some(d.embedding.iter().map(|&v| Some(v)))),
            self.dimension as i32,
        );

        RecordBatch::try_new(
            Arc::new(self.table_schema()),
            vec![
                Arc::new(StringArray::from(patent_ids)),
                Arc::new(StringArray::from(titles)),
                Arc::new(StringArray::from(abstracts)),
                Arc::new(StringArray::from(publication_dates)),
                Arc::new(StringArray::from(pdfs)),
                Arc::new(Int32Array::from(token_counts)),
                Arc::new(embedding_array),
            ],
        )
        .with_context(|| "Failed to create RecordBatch")
    }

    /// Nearest-neighbor query over the embedding column.
    ///
    /// LanceDB reports L2 distance; scores are converted to a similarity in
    /// (0, 1] via `1 / (1 + distance)` so identical vectors score ~1.0.
    pub async fn vector_search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<ScoredDocument>> {
        let table = self.ensure_table().await?;

        let results = table
            .vector_search(vector)
            .with_context(|| "Failed to create vector search query")?
            .limit(limit)
            .execute()
            .await
            .with_context(|| "Failed to execute vector search")?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .with_context(|| "Failed to collect search results")?;

        let mut scored = Vec::new();

        for batch in batches {
            let string_col = |name: &str| -> Result<&StringArray> {
                batch
                    .column_by_name(name)
                    .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                    .ok_or_else(|| anyhow::anyhow!("Missing {} column", name))
            };

            let patent_ids = string_col("patent_id")?;
            let titles = string_col("title")?;
            let abstracts = string_col("abstract")?;
            let publication_dates = batch
                .column_by_name("publication_date")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>());
            let pdfs = batch
                .column_by_name("pdf")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>());
            let token_counts = batch
                .column_by_name("token_count")
                .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
                .ok_or_else(|| anyhow::anyhow!("Missing token_count column"))?;

            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<arrow_array::Float32Array>());

            for i in 0..batch.num_rows() {
                let score = distances.map(|d| 1.0 / (1.0 + d.value(i))).unwrap_or(1.0);

                let opt_value = |col: Option<&StringArray>| -> Option<String> {
                    col.and_then(|c| {
                        if c.is_null(i) || c.value(i).is_empty() {
                            None
                        } else {
                            Some(c.value(i).to_string())
                        }
                    })
                };

                scored.push(ScoredDocument {
                    document: PatentDocument {
                        patent_id: patent_ids.value(i).to_string(),
                        title: titles.value(i).to_string(),
                        abstract_text: abstracts.value(i).to_string(),
                        publication_date: opt_value(publication_dates),
                        pdf_link: opt_value(pdfs),
                        token_count: token_counts.value(i) as usize,
                        embedding: Vec::new(),
                    },
                    score,
                });
            }
        }

        Ok(scored)
    }

    /// Delete rows for the given patent ids (replace semantics on re-ingest).
    pub async fn delete_by_patent_ids(&self, patent_ids: &[&str]) -> Result<()> {
        if patent_ids.is_empty() {
            return Ok(());
        }

        let table = self.ensure_table().await?;

        let quoted: Vec<String> = patent_ids
            .iter()
            .map(|id| format!("'{}'", id.replace('\'', "''")))
            .collect();

        table
            .delete(&format!("patent_id IN ({})", quoted.join(", ")))
            .await
            .with_context(|| "Failed to delete existing patent rows")?;

        debug!("Deleted {} patent ids before re-insert", patent_ids.len());

        Ok(())
    }

    /// Total number of stored patents.
    pub async fn count_documents(&self) -> Result<usize> {
        let table = self.ensure_table().await?;

        table
            .count_rows(None)
            .await
            .with_context(|| "Failed to count documents")
    }

    /// Drop the patents table entirely.
    pub async fn clear(&self) -> Result<()> {
        let table_names = self.db.table_names().execute().await?;

        if table_names.contains(&self.table_name) {
            self.db
                .drop_table(&self.table_name)
                .await
                .with_context(|| "Failed to drop patents table")?;
        }

        info!("Cleared all data from vector store");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}
