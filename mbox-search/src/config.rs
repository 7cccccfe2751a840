//! Configuration for mbox-search

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};
use crate::search::{SearchOptions, SearchOrder};

/// Smallest writer budget Tantivy accepts for one indexing thread
pub const MIN_WRITER_MEMORY: usize = 15_000_000;

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub index: IndexConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Mailbox to read
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Path to the MBOX file
    #[serde(default = "default_mbox_path")]
    pub mbox_path: PathBuf,
}

/// Index store settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Index directory; the index lives in memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Writer memory budget in bytes
    #[serde(default = "default_writer_memory")]
    pub writer_memory_bytes: usize,
}

/// Query settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Query to run after indexing
    #[serde(default = "default_query")]
    pub query: String,
    /// Maximum hits to return
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub order: SearchOrder,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty", "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_mbox_path() -> PathBuf {
    PathBuf::from("data/sample.mbox")
}

fn default_writer_memory() -> usize {
    50_000_000
}

fn default_query() -> String {
    "SMTP".to_string()
}

fn default_limit() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mbox_path: default_mbox_path(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: None,
            writer_memory_bytes: default_writer_memory(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            limit: default_limit(),
            order: SearchOrder::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SearchConfig {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.limit,
            order: self.order,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SearchError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.source.mbox_path.as_os_str().is_empty() {
            return Err(SearchError::Config("No mbox path configured".to_string()));
        }

        if self.search.limit == 0 {
            return Err(SearchError::Config("search.limit must be positive".to_string()));
        }

        if self.index.writer_memory_bytes < MIN_WRITER_MEMORY {
            return Err(SearchError::Config(format!(
                "index.writer_memory_bytes must be at least {}",
                MIN_WRITER_MEMORY
            )));
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => Ok(()),
            other => Err(SearchError::Config(format!("Unknown log format '{}'", other))),
        }
    }
}
