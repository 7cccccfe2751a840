//! Index store
//!
//! Owns the Tantivy index a pass writes to and a query runner later reads
//! from. The store is either held in RAM or kept in a directory on disk.

use std::path::Path;
use tantivy::directory::MmapDirectory;
use tantivy::{Index, IndexReader, IndexSettings, IndexWriter, ReloadPolicy};
use tracing::info;

use super::indexer::{MessageIndexer, TantivyDocumentWriter};
use super::query::QueryRunner;
use super::schema::{build_schema, register_tokenizer, MessageFields};
use super::types::IndexReport;
use crate::error::{Result, SearchError};
use crate::mailbox::Message;

/// Default writer memory budget (50MB)
pub const DEFAULT_WRITER_MEMORY: usize = 50_000_000;

/// Handle to a message index
#[derive(Clone)]
pub struct IndexStore {
    index: Index,
    fields: MessageFields,
    writer_memory: usize,
}

impl IndexStore {
    /// Create an empty index held in memory
    pub fn in_memory() -> Self {
        let (schema, fields) = build_schema();
        let index = Index::create_in_ram(schema);
        register_tokenizer(&index);

        Self {
            index,
            fields,
            writer_memory: DEFAULT_WRITER_MEMORY,
        }
    }

    /// Open the index at the given path, creating it if needed
    pub fn open_or_create(index_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_path).map_err(|e| {
            SearchError::Store(format!(
                "Failed to create index directory {}: {}",
                index_path.display(),
                e
            ))
        })?;

        let index = if index_path.join("meta.json").exists() {
            info!("Opening existing index at {}", index_path.display());
            Index::open_in_dir(index_path)
                .map_err(|e| SearchError::Store(format!("Failed to open index: {}", e)))?
        } else {
            info!("Creating index at {}", index_path.display());
            let (schema, _) = build_schema();
            let dir = MmapDirectory::open(index_path)
                .map_err(|e| SearchError::Store(format!("Failed to open index directory: {}", e)))?;
            Index::create(dir, schema, IndexSettings::default())
                .map_err(|e| SearchError::Store(format!("Failed to create index: {}", e)))?
        };
        register_tokenizer(&index);

        let fields = MessageFields::from_schema(&index.schema()).map_err(|e| {
            SearchError::Store(format!("Index schema does not hold messages: {}", e))
        })?;

        Ok(Self {
            index,
            fields,
            writer_memory: DEFAULT_WRITER_MEMORY,
        })
    }

    /// Set the writer memory budget in bytes
    pub fn with_writer_memory(mut self, bytes: usize) -> Self {
        self.writer_memory = bytes;
        self
    }

    /// Acquire the single writer of this store
    pub fn writer(&self) -> Result<TantivyDocumentWriter> {
        let writer: IndexWriter = self
            .index
            .writer_with_num_threads(1, self.writer_memory)
            .map_err(|e| SearchError::Index(format!("Failed to create index writer: {}", e)))?;
        Ok(TantivyDocumentWriter::new(writer, self.fields))
    }

    /// Open the store for reading
    pub fn searcher(&self) -> Result<QueryRunner> {
        let reader: IndexReader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e: tantivy::TantivyError| {
                SearchError::Store(format!("Failed to open index reader: {}", e))
            })?;
        Ok(QueryRunner::new(&self.index, reader, self.fields))
    }

    /// Write one document per eligible message and release the writer
    pub fn index_messages(&self, messages: &[Option<Message>]) -> Result<IndexReport> {
        MessageIndexer::index_messages(self.writer()?, messages)
    }
}
