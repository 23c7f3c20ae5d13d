//! Lexical (BM25) half of the index store, built on Tantivy.

use anyhow::{Context, Result};
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value as _, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info, warn};

use crate::patent::{PatentDocument, ScoredDocument};

/// Keyword index directory name within .patentrag/
const KEYWORD_INDEX_DIR: &str = "keyword.index";

const FIELD_PATENT_ID: &str = "patent_id";
const FIELD_TITLE: &str = "title";
const FIELD_ABSTRACT: &str = "abstract";
const FIELD_PUBLICATION_DATE: &str = "publication_date";
const FIELD_PDF: &str = "pdf";
const FIELD_TOKEN_COUNT: &str = "token_count";

/// Tantivy schema for patent documents.
#[derive(Clone)]
pub struct KeywordSchema {
    schema: Schema,
    patent_id: Field,
    title: Field,
    abstract_text: Field,
    publication_date: Field,
    pdf: Field,
    token_count: Field,
}

impl KeywordSchema {
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        // patent_id is untokenized so replace-by-term works on re-ingestion
        let patent_id = builder.add_text_field(FIELD_PATENT_ID, STRING | STORED);
        let title = builder.add_text_field(FIELD_TITLE, TEXT | STORED);
        let abstract_text = builder.add_text_field(FIELD_ABSTRACT, TEXT | STORED);
        let publication_date = builder.add_text_field(FIELD_PUBLICATION_DATE, STORED);
        let pdf = builder.add_text_field(FIELD_PDF, STORED);
        let token_count = builder.add_text_field(FIELD_TOKEN_COUNT, STORED);

        let schema = builder.build();

        Self {
            schema,
            patent_id,
            title,
            abstract_text,
            publication_date,
            pdf,
            token_count,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl Default for KeywordSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// BM25 index over patent titles and abstracts.
pub struct KeywordIndex {
    index: Index,
    schema: KeywordSchema,
    writer: IndexWriter,
    reader: IndexReader,
}

impl KeywordIndex {
    /// Create or open the keyword index under the given data directory.
    pub fn new(path: &Path) -> Result<Self> {
        let index_path = path.join(KEYWORD_INDEX_DIR);
        let schema = KeywordSchema::new();

        let index = if index_path.exists() {
            info!("Opening existing keyword index at {:?}", index_path);
            Index::open_in_dir(&index_path)
                .with_context(|| format!("Failed to open keyword index at {:?}", index_path))?
        } else {
            info!("Creating new keyword index at {:?}", index_path);
            std::fs::create_dir_all(&index_path).with_context(|| {
                format!("Failed to create keyword index directory {:?}", index_path)
            })?;
            Index::create_in_dir(&index_path, schema.schema().clone())
                .with_context(|| format!("Failed to create keyword index at {:?}", index_path))?
        };

        let writer = index
            .writer(50_000_000)
            .with_context(|| "Failed to create index writer")?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .with_context(|| "Failed to create index reader")?;

        Ok(Self {
            index,
            schema,
            writer,
            reader,
        })
    }

    /// Add documents to the index. Call `commit` to make them visible.
    pub fn add_documents(&mut self, documents: &[PatentDocument]) -> Result<()> {
        for document in documents {
            self.writer.add_document(doc!(
                self.schema.patent_id => document.patent_id.as_str(),
                self.schema.title => document.title.as_str(),
                self.schema.abstract_text => document.abstract_text.as_str(),
                self.schema.publication_date => document.publication_date.as_deref().unwrap_or(""),
                self.schema.pdf => document.pdf_link.as_deref().unwrap_or(""),
                self.schema.token_count => document.token_count.to_string(),
            ))?;
        }

        debug!("Added {} documents to keyword index", documents.len());
        Ok(())
    }

    /// Delete any existing rows for the given patent ids.
    pub fn delete_by_patent_ids(&mut self, patent_ids: &[&str]) {
        for id in patent_ids {
            self.writer
                .delete_term(Term::from_field_text(self.schema.patent_id, id));
        }
    }

    /// Commit pending changes and reload the reader.
    pub fn commit(&mut self) -> Result<()> {
        self.writer
            .commit()
            .with_context(|| "Failed to commit keyword index changes")?;

        self.reader
            .reload()
            .with_context(|| "Failed to reload index reader")?;

        info!("Keyword index committed");
        Ok(())
    }

    /// Clear the entire index.
    pub fn clear(&mut self) -> Result<()> {
        self.writer.delete_all_documents()?;
        self.commit()?;
        info!("Keyword index cleared");
        Ok(())
    }

    /// BM25 query over title and abstract.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredDocument>> {
        let searcher = self.reader.searcher();

        let query_parser = QueryParser::for_index(
            &self.index,
            vec![self.schema.title, self.schema.abstract_text],
        );
        let parsed_query = match query_parser.parse_query(query) {
            Ok(q) => q,
            Err(e) => {
                warn!("Failed to parse query '{}': {}", query, e);
                // Strip query syntax and retry as plain terms
                let escaped = query.replace(
                    ['(', ')', '[', ']', '{', '}', '"', '\'', ':', '\\', '/', '^', '~', '*', '?',
                     '!', '+', '-'],
                    " ",
                );
                query_parser
                    .parse_query(&escaped)
                    .with_context(|| format!("Failed to parse escaped query: {}", escaped))?
            }
        };

        let top_docs = searcher
            .search(&parsed_query, &TopDocs::with_limit(limit))
            .with_context(|| "Failed to execute keyword search")?;

        let mut results = Vec::with_capacity(top_docs.len());

        for (score, doc_address) in top_docs {
            let retrieved: TantivyDocument = searcher
                .doc(doc_address)
                .with_context(|| "Failed to retrieve document")?;

            let field_str = |field: Field| -> String {
                retrieved
                    .get_first(field)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };

            let opt_field = |field: Field| -> Option<String> {
                let value = field_str(field);
                if value.is_empty() { None } else { Some(value) }
            };

            let token_count: usize = retrieved
                .get_first(self.schema.token_count)
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);

            results.push(ScoredDocument {
                document: PatentDocument {
                    patent_id: field_str(self.schema.patent_id),
                    title: field_str(self.schema.title),
                    abstract_text: field_str(self.schema.abstract_text),
                    publication_date: opt_field(self.schema.publication_date),
                    pdf_link: opt_field(self.schema.pdf),
                    token_count,
                    embedding: Vec::new(),
                },
                score,
            });
        }

        debug!("Keyword search returned {} results", results.len());
        Ok(results)
    }

    /// Check if the index exists at the given path.
    pub fn exists(path: &Path) -> bool {
        path.join(KEYWORD_INDEX_DIR).exists()
    }
}
