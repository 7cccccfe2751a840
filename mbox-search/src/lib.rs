//! mbox-search: index an MBOX mailbox and query it
//!
//! Reads every message of an MBOX file, writes selected fields of each
//! message into a Tantivy index and runs a free-text query against it.
//!
//! # Pipeline
//!
//! 1. [`mailbox::MboxSource`] lists the messages of the file in order.
//! 2. [`search::IndexStore::index_messages`] writes one document per message
//!    that has a subject. Messages without one are skipped, a message whose
//!    sender or date cannot be read aborts the pass.
//! 3. [`search::QueryRunner`] parses the query against the `content` field
//!    and returns up to 100 hits, newest first.
//!
//! # Example
//!
//! ```no_run
//! use mbox_search::mailbox::{MboxSource, MessageSource};
//! use mbox_search::search::{DocumentSearcher, IndexStore, SearchOptions};
//!
//! fn main() -> mbox_search::Result<()> {
//!     let messages = MboxSource::new("data/sample.mbox").list_messages()?;
//!
//!     let store = IndexStore::in_memory();
//!     store.index_messages(&messages)?;
//!
//!     let results = store.searcher()?.search("SMTP", &SearchOptions::default())?;
//!     for hit in results.hits {
//!         println!("Subject: {}", hit.subject);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`mailbox`]: MBOX reading and message model
//! - [`search`]: Index schema, indexer and query runner
//! - [`pipeline`]: The load, index, query sequence

pub mod config;
pub mod error;
pub mod mailbox;
pub mod pipeline;
pub mod search;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SearchError};
