//! Index schema for message documents

use chrono::{DateTime, Utc};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, STORED, STRING,
};
use tantivy::tokenizer::{
    LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer,
};
use tantivy::Index;

pub const FROM_ADDRESS: &str = "fromAddress";
pub const FROM_PERSONAL: &str = "fromPersonal";
pub const SENT_DATE: &str = "sentDate";
pub const SENT_DATE_SORT: &str = "sentDateSort";
pub const SUBJECT: &str = "subject";
pub const SIZE: &str = "size";
pub const CONTENT: &str = "content";

/// Name the analyzer is registered under
pub const MESSAGE_TOKENIZER: &str = "message_text";

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Schema fields for message documents
#[derive(Debug, Clone, Copy)]
pub struct MessageFields {
    pub from_address: Field,
    pub from_personal: Field,
    pub sent_date: Field,
    /// Fast-field mirror of `sent_date`, only used for sorting
    pub sent_date_sort: Field,
    pub subject: Field,
    pub size: Field,
    pub content: Field,
}

impl MessageFields {
    /// Look up the fields in an existing schema
    pub fn from_schema(schema: &Schema) -> tantivy::Result<Self> {
        Ok(Self {
            from_address: schema.get_field(FROM_ADDRESS)?,
            from_personal: schema.get_field(FROM_PERSONAL)?,
            sent_date: schema.get_field(SENT_DATE)?,
            sent_date_sort: schema.get_field(SENT_DATE_SORT)?,
            subject: schema.get_field(SUBJECT)?,
            size: schema.get_field(SIZE)?,
            content: schema.get_field(CONTENT)?,
        })
    }
}

/// Build the Tantivy schema
pub fn build_schema() -> (Schema, MessageFields) {
    let mut schema_builder = Schema::builder();

    let analyzed = TextFieldIndexing::default()
        .set_tokenizer(MESSAGE_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let analyzed_stored = TextOptions::default()
        .set_indexing_options(analyzed.clone())
        .set_stored();
    let analyzed_only = TextOptions::default().set_indexing_options(analyzed);

    let from_address = schema_builder.add_text_field(FROM_ADDRESS, STRING | STORED);
    let from_personal = schema_builder.add_text_field(FROM_PERSONAL, STRING | STORED);
    let sent_date = schema_builder.add_text_field(SENT_DATE, STRING | STORED);
    let sent_date_sort = schema_builder.add_u64_field(SENT_DATE_SORT, FAST);
    let subject = schema_builder.add_text_field(SUBJECT, analyzed_stored);
    let size = schema_builder.add_text_field(SIZE, STORED);
    let content = schema_builder.add_text_field(CONTENT, analyzed_only);

    let fields = MessageFields {
        from_address,
        from_personal,
        sent_date,
        sent_date_sort,
        subject,
        size,
        content,
    };

    (schema_builder.build(), fields)
}

/// Register the message analyzer on an index
///
/// Must run on every opened index, registrations are not persisted.
pub fn register_tokenizer(index: &Index) {
    let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(100))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(STOP_WORDS.iter().map(|word| word.to_string())))
        .build();
    index.tokenizers().register(MESSAGE_TOKENIZER, analyzer);
}

/// Format a sent date with minute resolution
pub fn format_sent_date(date: &DateTime<Utc>) -> String {
    date.format("%Y%m%d%H%M").to_string()
}

/// Numeric sort key for a formatted sent date
///
/// `yyyyMMddHHmm` is fixed width, so numeric order equals string order.
pub fn sent_date_sort_key(sent_date: &str) -> Option<u64> {
    if sent_date.len() != 12 {
        return None;
    }
    sent_date.parse().ok()
}
