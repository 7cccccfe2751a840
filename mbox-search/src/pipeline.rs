//! Load, index and query in one pass

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::mailbox::{MboxSource, MessageSource};
use crate::search::{DocumentSearcher, IndexReport, IndexStore, SearchResults};

/// What one run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    /// Entries found in the mailbox
    pub messages_loaded: usize,
    pub report: IndexReport,
    pub results: SearchResults,
}

/// Open the index store the configuration asks for
pub fn open_store(config: &Config) -> Result<IndexStore> {
    let store = match &config.index.path {
        Some(path) => IndexStore::open_or_create(path)?,
        None => IndexStore::in_memory(),
    };
    Ok(store.with_writer_memory(config.index.writer_memory_bytes))
}

/// Run the configured query over a freshly indexed mailbox
pub fn run(config: &Config) -> Result<PipelineOutcome> {
    config.validate()?;

    let source = MboxSource::new(&config.source.mbox_path);
    let messages = source.list_messages()?;

    let store = open_store(config)?;
    let report = store.index_messages(&messages)?;

    let runner = store.searcher()?;
    info!(
        documents = runner.document_count(),
        query = %config.search.query,
        "Searching index"
    );
    let results = runner.search(&config.search.query, &config.search.options())?;

    Ok(PipelineOutcome {
        messages_loaded: messages.len(),
        report,
        results,
    })
}
