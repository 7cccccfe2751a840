//! Message indexer
//!
//! Turns messages into index documents and writes them through a
//! [`DocumentWriter`]. Messages without a subject are skipped; a message
//! whose sender or date cannot be extracted aborts the whole pass.

use tantivy::{IndexWriter, TantivyDocument};
use tracing::{debug, info, warn};

use super::schema::{format_sent_date, sent_date_sort_key, MessageFields};
use super::types::{DocumentOutcome, IndexReport, IndexedDocument};
use crate::error::{Result, SearchError};
use crate::mailbox::Message;

/// Write side of a document index
pub trait DocumentWriter {
    /// Append one document
    fn add_document(&mut self, document: &IndexedDocument) -> Result<()>;

    /// Make every added document visible to new readers
    fn commit(&mut self) -> Result<()>;

    /// Release the writer
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Tantivy-backed document writer
///
/// Holds the index lock until closed. Dropping it without calling
/// [`DocumentWriter::close`] still releases the writer.
pub struct TantivyDocumentWriter {
    writer: Option<IndexWriter>,
    fields: MessageFields,
}

impl TantivyDocumentWriter {
    pub(crate) fn new(writer: IndexWriter, fields: MessageFields) -> Self {
        Self {
            writer: Some(writer),
            fields,
        }
    }

    fn writer_mut(&mut self) -> Result<&mut IndexWriter> {
        self.writer
            .as_mut()
            .ok_or_else(|| SearchError::Index("Index writer already closed".to_string()))
    }

    fn to_tantivy(&self, document: &IndexedDocument) -> Result<TantivyDocument> {
        let sort_key = sent_date_sort_key(&document.sent_date).ok_or_else(|| {
            SearchError::Index(format!("Malformed sent date: {}", document.sent_date))
        })?;

        let mut doc = TantivyDocument::default();
        doc.add_text(self.fields.from_address, &document.from_address);
        if let Some(personal) = &document.from_personal {
            doc.add_text(self.fields.from_personal, personal);
        }
        doc.add_text(self.fields.sent_date, &document.sent_date);
        doc.add_u64(self.fields.sent_date_sort, sort_key);
        doc.add_text(self.fields.subject, &document.subject);
        doc.add_text(self.fields.size, document.size.to_string());
        if let Some(content) = &document.content {
            doc.add_text(self.fields.content, content);
        }
        Ok(doc)
    }
}

impl DocumentWriter for TantivyDocumentWriter {
    fn add_document(&mut self, document: &IndexedDocument) -> Result<()> {
        let doc = self.to_tantivy(document)?;
        self.writer_mut()?
            .add_document(doc)
            .map_err(|e| SearchError::Index(format!("Failed to add document: {}", e)))?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.writer_mut()?
            .commit()
            .map_err(|e| SearchError::Index(format!("Failed to commit: {}", e)))?;
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        match self.writer.take() {
            Some(writer) => writer
                .wait_merging_threads()
                .map_err(|e| SearchError::Index(format!("Failed to close index writer: {}", e))),
            None => Ok(()),
        }
    }
}

impl Drop for TantivyDocumentWriter {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.wait_merging_threads() {
                warn!("Failed to close index writer: {}", e);
            }
        }
    }
}

/// Drives one indexing pass
pub struct MessageIndexer;

impl MessageIndexer {
    /// Index messages in order, then commit and close the writer
    ///
    /// The writer is closed on every path. A close failure is logged and
    /// never replaces the outcome of the pass.
    pub fn index_messages<W: DocumentWriter>(
        mut writer: W,
        messages: &[Option<Message>],
    ) -> Result<IndexReport> {
        let outcome = Self::write_messages(&mut writer, messages).and_then(|report| {
            writer.commit()?;
            Ok(report)
        });

        if let Err(e) = writer.close() {
            warn!("Failed to release index writer: {}", e);
        }

        match &outcome {
            Ok(report) => info!(
                indexed = report.indexed,
                skipped_no_subject = report.skipped_no_subject,
                skipped_absent = report.skipped_absent,
                "Indexing complete"
            ),
            Err(e) => warn!("Indexing aborted: {}", e),
        }

        outcome
    }

    fn write_messages<W: DocumentWriter>(
        writer: &mut W,
        messages: &[Option<Message>],
    ) -> Result<IndexReport> {
        let mut report = IndexReport::default();

        for (position, message) in messages.iter().enumerate() {
            match Self::classify(message.as_ref())? {
                DocumentOutcome::Eligible(document) => {
                    debug!(position, subject = %document.subject, "Adding document");
                    writer.add_document(&document)?;
                    report.indexed += 1;
                }
                DocumentOutcome::SkippedNoSubject => {
                    let envelope = message
                        .as_ref()
                        .map(|m| m.envelope_sender.as_str())
                        .unwrap_or_default();
                    info!(position, envelope_sender = envelope, "Skipped...");
                    report.skipped_no_subject += 1;
                }
                DocumentOutcome::SkippedAbsent => {
                    debug!(position, "No message at position");
                    report.skipped_absent += 1;
                }
            }
        }

        Ok(report)
    }

    /// Decide what to write for one message
    ///
    /// Fails when the message has a subject but its sender or sent date
    /// cannot be extracted.
    pub fn classify(message: Option<&Message>) -> Result<DocumentOutcome> {
        let Some(message) = message else {
            return Ok(DocumentOutcome::SkippedAbsent);
        };
        let Some(subject) = &message.subject else {
            return Ok(DocumentOutcome::SkippedNoSubject);
        };

        let sender = message.from.as_ref().ok_or_else(|| {
            SearchError::Index(format!("Message '{}' has no sender", subject))
        })?;
        let from_address = sender.address.clone().ok_or_else(|| {
            SearchError::Index(format!("Message '{}' has a malformed sender address", subject))
        })?;
        let sent_date = message.sent_date.as_ref().ok_or_else(|| {
            SearchError::Index(format!("Message '{}' has no sent date", subject))
        })?;

        Ok(DocumentOutcome::Eligible(IndexedDocument {
            from_address,
            from_personal: sender.personal.clone(),
            sent_date: format_sent_date(sent_date),
            subject: subject.clone(),
            size: message.size,
            content: message.content.as_text().map(|text| text.to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::{MessageContent, Sender};
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct WriterLog {
        subjects: Vec<String>,
        committed: bool,
        closed: bool,
    }

    /// Writer that records what it is given
    #[derive(Default)]
    struct RecordingWriter {
        log: Rc<RefCell<WriterLog>>,
        fail_on_add: bool,
    }

    impl DocumentWriter for RecordingWriter {
        fn add_document(&mut self, document: &IndexedDocument) -> Result<()> {
            if self.fail_on_add {
                return Err(SearchError::Index("disk full".to_string()));
            }
            self.log.borrow_mut().subjects.push(document.subject.clone());
            Ok(())
        }

        fn commit(&mut self) -> Result<()> {
            self.log.borrow_mut().committed = true;
            Ok(())
        }

        fn close(self) -> Result<()> {
            self.log.borrow_mut().closed = true;
            Err(SearchError::Index("close failed".to_string()))
        }
    }

    fn message(subject: Option<&str>, minute: u32) -> Message {
        Message {
            from: Some(Sender {
                address: Some("alice@example.com".to_string()),
                personal: Some("Alice".to_string()),
            }),
            sent_date: Some(Utc.with_ymd_and_hms(2008, 11, 3, 14, minute, 30).unwrap()),
            subject: subject.map(|s| s.to_string()),
            size: 512,
            content: MessageContent::Text("SMTP relay".to_string()),
            envelope_sender: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn test_classify_absent_message() {
        assert_eq!(MessageIndexer::classify(None).unwrap(), DocumentOutcome::SkippedAbsent);
    }

    #[test]
    fn test_classify_message_without_subject() {
        let msg = message(None, 0);
        assert_eq!(
            MessageIndexer::classify(Some(&msg)).unwrap(),
            DocumentOutcome::SkippedNoSubject
        );
    }

    #[test]
    fn test_classify_extracts_fields() {
        let msg = message(Some("Hello"), 52);
        let DocumentOutcome::Eligible(doc) = MessageIndexer::classify(Some(&msg)).unwrap() else {
            panic!("expected an eligible document");
        };

        assert_eq!(doc.from_address, "alice@example.com");
        assert_eq!(doc.from_personal.as_deref(), Some("Alice"));
        assert_eq!(doc.sent_date, "200811031452");
        assert_eq!(doc.subject, "Hello");
        assert_eq!(doc.size, 512);
        assert_eq!(doc.content.as_deref(), Some("SMTP relay"));
    }

    #[test]
    fn test_classify_binary_body_has_no_content() {
        let mut msg = message(Some("Attachment"), 0);
        msg.content = MessageContent::Binary;
        let DocumentOutcome::Eligible(doc) = MessageIndexer::classify(Some(&msg)).unwrap() else {
            panic!("expected an eligible document");
        };
        assert!(doc.content.is_none());
    }

    #[test]
    fn test_classify_malformed_sender_fails() {
        let mut msg = message(Some("Broken"), 0);
        msg.from = Some(Sender {
            address: None,
            personal: Some("Nobody".to_string()),
        });
        assert!(matches!(
            MessageIndexer::classify(Some(&msg)),
            Err(SearchError::Index(_))
        ));

        msg.from = None;
        assert!(MessageIndexer::classify(Some(&msg)).is_err());
    }

    #[test]
    fn test_classify_missing_date_fails() {
        let mut msg = message(Some("Undated"), 0);
        msg.sent_date = None;
        assert!(MessageIndexer::classify(Some(&msg)).is_err());
    }

    #[test]
    fn test_missing_subject_wins_over_malformed_sender() {
        let mut msg = message(None, 0);
        msg.from = None;
        assert_eq!(
            MessageIndexer::classify(Some(&msg)).unwrap(),
            DocumentOutcome::SkippedNoSubject
        );
    }

    #[test]
    fn test_index_messages_keeps_order_and_counts_skips() {
        let writer = RecordingWriter::default();
        let log = writer.log.clone();
        let messages = vec![
            Some(message(Some("first"), 1)),
            None,
            Some(message(None, 2)),
            Some(message(Some("second"), 3)),
        ];

        // The close failure is logged, not returned
        let report = MessageIndexer::index_messages(writer, &messages).unwrap();

        assert_eq!(
            report,
            IndexReport {
                indexed: 2,
                skipped_no_subject: 1,
                skipped_absent: 1,
            }
        );
        let log = log.borrow();
        assert_eq!(log.subjects, vec!["first", "second"]);
        assert!(log.committed);
        assert!(log.closed);
    }

    #[test]
    fn test_writer_failure_aborts_pass_and_still_closes() {
        let writer = RecordingWriter {
            fail_on_add: true,
            ..Default::default()
        };
        let log = writer.log.clone();

        let result = MessageIndexer::index_messages(writer, &[Some(message(Some("x"), 0))]);

        assert!(matches!(result, Err(SearchError::Index(msg)) if msg == "disk full"));
        assert!(!log.borrow().committed);
        assert!(log.borrow().closed);
    }

    #[test]
    fn test_extraction_failure_aborts_pass() {
        let writer = RecordingWriter::default();
        let log = writer.log.clone();
        let mut broken = message(Some("broken"), 0);
        broken.from = None;

        let result = MessageIndexer::index_messages(
            writer,
            &[Some(message(Some("ok"), 0)), Some(broken), Some(message(Some("never"), 0))],
        );

        assert!(result.is_err());
        let log = log.borrow();
        assert_eq!(log.subjects, vec!["ok"]);
        assert!(!log.committed);
        assert!(log.closed);
    }

    /// Log sink shared with a test subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_close_failure_is_reported_as_release_failure() {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();

        let messages = [Some(message(Some("a"), 0))];
        let result = tracing::subscriber::with_default(subscriber, || {
            MessageIndexer::index_messages(RecordingWriter::default(), &messages)
        });

        assert!(result.is_ok());
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Failed to release index writer"));
        assert!(output.contains("close failed"));
        assert!(!output.contains("Indexing aborted"));
    }
}
