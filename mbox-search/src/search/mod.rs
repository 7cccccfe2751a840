//! Full-text search module
//!
//! Provides message indexing and search capabilities using Tantivy.

pub mod indexer;
pub mod query;
pub mod schema;
pub mod store;
pub mod types;

pub use indexer::{DocumentWriter, MessageIndexer, TantivyDocumentWriter};
pub use query::{DocumentSearcher, QueryRunner};
pub use store::IndexStore;
pub use types::*;
