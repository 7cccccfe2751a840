//! Query runner
//!
//! Parses free-text queries against the analyzed `content` field and
//! returns stored message fields for each hit.

use tantivy::collector::TopDocs;
use tantivy::query::{Query, QueryParser};
use tantivy::schema::Value;
use tantivy::{DocAddress, Index, IndexReader, Order, Searcher, TantivyDocument};
use tracing::debug;

use super::schema::{MessageFields, SENT_DATE_SORT};
use super::types::{SearchHit, SearchOptions, SearchOrder, SearchResults};
use crate::error::{Result, SearchError};

/// Read side of a document index
pub trait DocumentSearcher {
    /// Run a query and return at most `options.limit` hits
    fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResults>;

    /// Number of documents visible to this searcher
    fn document_count(&self) -> u64;
}

/// Tantivy-backed query runner
pub struct QueryRunner {
    reader: IndexReader,
    fields: MessageFields,
    query_parser: QueryParser,
}

impl QueryRunner {
    pub(crate) fn new(index: &Index, reader: IndexReader, fields: MessageFields) -> Self {
        let query_parser = QueryParser::for_index(index, vec![fields.content]);
        Self {
            reader,
            fields,
            query_parser,
        }
    }

    fn parse(&self, query: &str) -> Result<Box<dyn Query>> {
        self.query_parser
            .parse_query(query)
            .map_err(|e| SearchError::Query(format!("Invalid query '{}': {}", query, e)))
    }

    fn collect(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        options: &SearchOptions,
    ) -> tantivy::Result<Vec<(Option<f32>, DocAddress)>> {
        let top_docs = TopDocs::with_limit(options.limit);
        let hits = match options.order {
            SearchOrder::SentDateDesc => searcher
                .search(query, &top_docs.order_by_u64_field(SENT_DATE_SORT, Order::Desc))?
                .into_iter()
                .map(|(_sent, address)| (None, address))
                .collect(),
            SearchOrder::Relevance => searcher
                .search(query, &top_docs)?
                .into_iter()
                .map(|(score, address)| (Some(score), address))
                .collect(),
        };
        Ok(hits)
    }

    fn to_hit(&self, doc: &TantivyDocument, score: Option<f32>) -> SearchHit {
        let text = |field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        SearchHit {
            subject: text(self.fields.subject).unwrap_or_default(),
            from_address: text(self.fields.from_address).unwrap_or_default(),
            from_personal: text(self.fields.from_personal),
            sent_date: text(self.fields.sent_date).unwrap_or_default(),
            size: text(self.fields.size)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            score,
        }
    }
}

impl DocumentSearcher for QueryRunner {
    fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResults> {
        let start_time = std::time::Instant::now();

        if options.limit == 0 {
            return Err(SearchError::Query("Result limit must be positive".to_string()));
        }

        let parsed_query = self.parse(query)?;
        let searcher = self.reader.searcher();

        let addresses = self
            .collect(&searcher, parsed_query.as_ref(), options)
            .map_err(|e| SearchError::Query(format!("Search failed: {}", e)))?;

        let mut hits = Vec::with_capacity(addresses.len());
        for (score, doc_address) in addresses {
            let doc: TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| SearchError::Query(format!("Failed to retrieve document: {}", e)))?;
            hits.push(self.to_hit(&doc, score));
        }

        let query_time_ms = start_time.elapsed().as_millis() as u64;
        debug!(query, hits = hits.len(), query_time_ms, "Query executed");

        Ok(SearchResults {
            total: hits.len(),
            hits,
            query_time_ms,
        })
    }

    fn document_count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}
