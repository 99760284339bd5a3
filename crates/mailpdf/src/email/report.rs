//! Outcome of an extraction batch.

use std::fmt;
use std::path::PathBuf;

use super::error::ExtractError;

/// An attachment written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAttachment {
    /// Sequence number of the source message.
    pub seq: u32,
    /// Filename as declared in the message.
    pub declared_filename: String,
    /// Where the payload was written.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: usize,
}

/// Why a message or part produced no file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The fetch response carried no message literal.
    NoBody,
    /// A `multipart/*` container.
    Container,
    /// No `Content-Disposition` header.
    NoDisposition,
    /// The declared filename does not contain `.pdf` or `.PDF`.
    NotPdf(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoBody => write!(f, "response has no message body"),
            SkipReason::Container => write!(f, "multipart container"),
            SkipReason::NoDisposition => write!(f, "no Content-Disposition header"),
            SkipReason::NotPdf(name) => write!(f, "'{}' is not a PDF", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPart {
    pub seq: u32,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct FailedPart {
    pub seq: u32,
    pub error: ExtractError,
}

/// Everything that happened while extracting a batch of messages.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub messages_seen: usize,
    pub saved: Vec<SavedAttachment>,
    pub skipped: Vec<SkippedPart>,
    pub failed: Vec<FailedPart>,
}

impl ExtractionReport {
    pub(crate) fn record_saved(&mut self, saved: SavedAttachment) {
        self.saved.push(saved);
    }

    pub(crate) fn record_skipped(&mut self, seq: u32, reason: SkipReason) {
        self.skipped.push(SkippedPart { seq, reason });
    }

    pub(crate) fn record_failed(&mut self, seq: u32, error: ExtractError) {
        self.failed.push(FailedPart { seq, error });
    }

    /// Returns true if no part failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Counts skips for a given reason kind.
    pub fn skipped_count(&self, predicate: impl Fn(&SkipReason) -> bool) -> usize {
        self.skipped.iter().filter(|s| predicate(&s.reason)).count()
    }
}

impl fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} messages: {} saved, {} skipped, {} failed",
            self.messages_seen,
            self.saved.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}
