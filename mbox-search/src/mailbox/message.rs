//! Message model built from raw MBOX entries

use chrono::{DateTime, Utc};
use mail_parser::{MessageParser, PartType};

/// Sender of a message as found in the From header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    /// Mailbox address, `None` when the header could not be read as an address
    pub address: Option<String>,
    /// Display name
    pub personal: Option<String>,
}

/// Top-level body of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// text/* body, decoded to a string
    Text(String),
    /// multipart/* body
    Multipart,
    /// Anything else (application/*, image/*, message/rfc822, ...)
    Binary,
}

impl MessageContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// One email read from a mailbox
#[derive(Debug, Clone)]
pub struct Message {
    pub from: Option<Sender>,
    pub sent_date: Option<DateTime<Utc>>,
    pub subject: Option<String>,
    /// Size of the raw message in bytes
    pub size: usize,
    pub content: MessageContent,
    /// Sender from the MBOX separator line, for diagnostics
    pub envelope_sender: String,
}

impl Message {
    /// Parse the raw content of one MBOX entry
    ///
    /// Returns `None` when the entry holds nothing the MIME parser can read.
    pub fn from_raw(envelope_sender: &str, raw: &[u8]) -> Option<Self> {
        let parsed = MessageParser::default().parse(raw)?;

        let from = parsed.from().and_then(|f| f.first()).map(|addr| Sender {
            address: addr.address().map(|s| s.to_string()),
            personal: addr.name().map(|s| s.to_string()),
        });

        let sent_date = parsed
            .date()
            .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0));

        let content = match parsed.parts.first().map(|part| &part.body) {
            Some(PartType::Text(text)) | Some(PartType::Html(text)) => {
                MessageContent::Text(text.to_string())
            }
            Some(PartType::Multipart(_)) => MessageContent::Multipart,
            _ => MessageContent::Binary,
        };

        Some(Self {
            from,
            sent_date,
            subject: parsed.subject().map(|s| s.to_string()),
            size: raw.len(),
            content,
            envelope_sender: envelope_sender.to_string(),
        })
    }
}
