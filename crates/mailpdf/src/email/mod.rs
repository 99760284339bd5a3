//! Fetching messages over IMAP and extracting their PDF attachments.
//!
//! The fetch stage ([`fetch_messages`]) is fatal on error and always logs out.
//! The extraction stage ([`extract_pdf_attachments`]) never aborts; it
//! reports per-part outcomes in an [`ExtractionReport`].

pub mod client;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod report;
pub mod search;
pub mod source;

pub use client::ImapClient;
pub use error::{EmailError, ExtractError};
pub use extractor::{extract_pdf_attachments, is_pdf_filename, AttachmentExtractor};
pub use fetcher::{fetch_messages, FetchRequest};
pub use report::{ExtractionReport, FailedPart, SavedAttachment, SkipReason, SkippedPart};
pub use search::{Limit, SearchFilter};
pub use source::{MailSource, RawMessage};
