//! Error types for mbox-search

use thiserror::Error;

/// Result type alias for mbox-search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors raised by the load, index and query steps
#[derive(Error, Debug)]
pub enum SearchError {
    /// The mailbox could not be opened or read
    #[error("Failed to load messages from {path}: {reason}")]
    Load { path: String, reason: String },

    /// A field could not be extracted or a document could not be written
    #[error("Failed to index messages: {0}")]
    Index(String),

    /// The query could not be parsed or executed
    #[error("Query error: {0}")]
    Query(String),

    /// The index store could not be created or opened
    #[error("Index store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
