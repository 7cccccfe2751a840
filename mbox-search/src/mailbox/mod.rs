//! Message source module
//!
//! Reads messages out of a mailbox file. Framing of the MBOX file, including
//! `>From` unescaping, is done by `mail-parser`'s MBOX iterator, MIME parsing
//! of each entry by its message parser.

pub mod message;

pub use message::{Message, MessageContent, Sender};

use mail_parser::mailbox::mbox::MessageIterator;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SearchError};

/// Anything that can list the messages of a mailbox
pub trait MessageSource {
    /// List all messages in store order
    ///
    /// An entry that could not be read as a message is `None`; it stays in
    /// the sequence so positions match the store.
    fn list_messages(&self) -> Result<Vec<Option<Message>>>;
}

/// Read-only MBOX file source
pub struct MboxSource {
    path: PathBuf,
}

impl MboxSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load_error(&self, reason: impl ToString) -> SearchError {
        SearchError::Load {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl MessageSource for MboxSource {
    fn list_messages(&self) -> Result<Vec<Option<Message>>> {
        let file = File::open(&self.path).map_err(|e| self.load_error(e))?;
        let absolute = self
            .path
            .canonicalize()
            .unwrap_or_else(|_| self.path.clone());

        let mut messages = Vec::new();
        for (position, entry) in MessageIterator::new(file).enumerate() {
            let entry = entry.map_err(|e| self.load_error(format!("{:?}", e)))?;
            let message = Message::from_raw(entry.from(), entry.contents());
            if message.is_none() {
                debug!(
                    position,
                    envelope_sender = entry.from(),
                    "Entry could not be parsed as a message"
                );
            }
            messages.push(message);
        }

        info!(
            "Messages in file {} found: {}",
            absolute.display(),
            messages.len()
        );

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_list_messages_in_file_order() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "From a@example.com Mon Nov  3 14:52:00 2008\n\
From: a@example.com\nSubject: one\n\nfirst\n\n\
From b@example.com Mon Nov  3 15:52:00 2008\nFrom: b@example.com\nSubject: two\n\nsecond\n"
        )
        .unwrap();

        let messages = MboxSource::new(file.path()).list_messages().unwrap();
        let subjects: Vec<_> = messages
            .iter()
            .map(|m| m.as_ref().and_then(|m| m.subject.clone()))
            .collect();
        assert_eq!(subjects, vec![Some("one".to_string()), Some("two".to_string())]);
    }

    #[test]
    fn test_escaped_from_lines_are_restored() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "From carol@example.com Mon Nov  3 14:52:00 2008\n\
From: carol@example.com\nSubject: quoting\n\n\
>From the changelog: relay fixed\n"
        )
        .unwrap();

        let messages = MboxSource::new(file.path()).list_messages().unwrap();
        assert_eq!(messages.len(), 1);

        let message = messages[0].as_ref().unwrap();
        assert_eq!(message.envelope_sender, "carol@example.com");
        let body = message.content.as_text().unwrap();
        assert!(body.contains("From the changelog"));
        assert!(!body.contains(">From"));
    }

    #[test]
    fn test_empty_file_lists_no_messages() {
        let file = NamedTempFile::new().unwrap();
        let messages = MboxSource::new(file.path()).list_messages().unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = MboxSource::new(dir.path().join("missing.mbox"));

        match source.list_messages() {
            Err(SearchError::Load { path, .. }) => assert!(path.ends_with("missing.mbox")),
            other => panic!("expected load error, got {:?}", other.map(|m| m.len())),
        }
    }
}
