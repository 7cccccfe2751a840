//! Search types and data structures

use serde::{Deserialize, Serialize};

/// Fields written to the index for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    pub from_address: String,
    pub from_personal: Option<String>,
    /// Minute resolution, UTC, `yyyyMMddHHmm`
    pub sent_date: String,
    pub subject: String,
    pub size: usize,
    /// Only set for textual bodies
    pub content: Option<String>,
}

/// What the indexer does with one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Write this document
    Eligible(IndexedDocument),
    /// Message has no subject
    SkippedNoSubject,
    /// No message at this position
    SkippedAbsent,
}

/// Counts from one indexing pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub indexed: u64,
    pub skipped_no_subject: u64,
    pub skipped_absent: u64,
}

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    /// Newest `sentDate` first
    #[default]
    SentDateDesc,
    /// Best BM25 score first
    Relevance,
}

/// Search options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum hits to return
    pub limit: usize,
    pub order: SearchOrder,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            order: SearchOrder::SentDateDesc,
        }
    }
}

/// Search result entry
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Subject line
    pub subject: String,
    /// Sender address
    pub from_address: String,
    /// Sender display name
    pub from_personal: Option<String>,
    /// Date sent, `yyyyMMddHHmm`
    pub sent_date: String,
    /// Message size in bytes
    pub size: usize,
    /// Relevance score, only computed for [`SearchOrder::Relevance`]
    pub score: Option<f32>,
}

/// Search results response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    /// Matching results
    pub hits: Vec<SearchHit>,
    /// Number of hits returned
    pub total: usize,
    /// Query time in milliseconds
    pub query_time_ms: u64,
}
