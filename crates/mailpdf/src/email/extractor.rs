//! Attachment extraction: parse raw messages and save their PDF parts.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use mail_parser::decoders::base64::base64_decode;
use mail_parser::decoders::quoted_printable::quoted_printable_decode;
use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};
use tracing::{debug, info, info_span, warn};

use crate::sanitize::{redact_path, sanitize_attachment_filename};

use super::error::ExtractError;
use super::report::{ExtractionReport, SavedAttachment, SkipReason};
use super::source::RawMessage;

/// Returns true if `filename` names a PDF.
///
/// This is a case-sensitive substring test for `.pdf` or `.PDF`, not an
/// extension check: `report.pdfnotes.txt` matches, `scan.Pdf` does not.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.contains(".pdf") || filename.contains(".PDF")
}

/// Saves PDF attachments from `messages` into `output_dir`.
///
/// Never fails as a whole; every per-message and per-part problem is logged
/// and recorded in the returned report.
pub fn extract_pdf_attachments(messages: Vec<RawMessage>, output_dir: &Path) -> ExtractionReport {
    AttachmentExtractor::new(output_dir).extract(messages)
}

/// Walks fetched messages and writes each PDF attachment to disk.
pub struct AttachmentExtractor {
    output_dir: PathBuf,
}

impl AttachmentExtractor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Consumes the fetched messages and extracts their attachments in order.
    pub fn extract(&self, messages: Vec<RawMessage>) -> ExtractionReport {
        let _span = info_span!("extract", output_dir = %self.output_dir.display()).entered();
        let mut report = ExtractionReport::default();

        for raw in messages {
            report.messages_seen += 1;
            match raw {
                RawMessage::Literal { seq, content } => {
                    self.extract_message(seq, &content, &mut report)
                }
                RawMessage::Bodiless { seq } => {
                    debug!("Skipping response {} without a message body", seq);
                    report.record_skipped(seq, SkipReason::NoBody);
                }
            }
        }

        info!("Extraction complete: {}", report);
        report
    }

    fn extract_message(&self, seq: u32, content: &[u8], report: &mut ExtractionReport) {
        let text = match std::str::from_utf8(content) {
            Ok(text) => text,
            Err(e) => {
                warn!("Message {} is not valid UTF-8: {}", seq, e);
                report.record_failed(
                    seq,
                    ExtractError::Decode {
                        what: format!("message {} as UTF-8", seq),
                    },
                );
                return;
            }
        };

        let Some(message) = MessageParser::default().parse(text.as_bytes()) else {
            warn!("Message {} could not be parsed", seq);
            report.record_failed(seq, ExtractError::Parse);
            return;
        };

        debug!(
            "Parsing message {} subject={:?}",
            seq,
            message.subject().unwrap_or("(no subject)")
        );
        self.walk_parts(seq, &message, report);
    }

    /// Visits parts depth-first, descending into attached messages.
    fn walk_parts(&self, seq: u32, message: &Message<'_>, report: &mut ExtractionReport) {
        let raw = message.raw_message.as_ref();
        for part in message.parts.iter() {
            self.extract_part(seq, part, raw, report);

            if let PartType::Message(nested) = &part.body {
                self.walk_parts(seq, nested, report);
            }
        }
    }

    /// `raw` is the source of the message that owns `part`; part offsets index into it.
    fn extract_part(
        &self,
        seq: u32,
        part: &MessagePart<'_>,
        raw: &[u8],
        report: &mut ExtractionReport,
    ) {
        if is_container(part) {
            report.record_skipped(seq, SkipReason::Container);
            return;
        }

        if part.content_disposition().is_none() {
            report.record_skipped(seq, SkipReason::NoDisposition);
            return;
        }

        let Some(declared) = part.attachment_name() else {
            warn!("Message {}: attachment has no filename", seq);
            report.record_failed(seq, ExtractError::MissingFilename);
            return;
        };

        if !is_pdf_filename(declared) {
            debug!("Message {}: skipping non-PDF attachment '{}'", seq, declared);
            report.record_skipped(seq, SkipReason::NotPdf(declared.to_string()));
            return;
        }

        let Some(filename) = sanitize_attachment_filename(declared) else {
            warn!("Message {}: refusing unsafe filename {:?}", seq, declared);
            report.record_failed(seq, ExtractError::UnsafeFilename(declared.to_string()));
            return;
        };

        let Some(payload) = leaf_payload(part, raw) else {
            warn!("Message {}: '{}' has no decodable payload", seq, declared);
            report.record_failed(
                seq,
                ExtractError::Decode {
                    what: format!("payload of '{}'", declared),
                },
            );
            return;
        };

        let path = self.output_dir.join(&filename);
        debug!("Writing {} bytes to {}", payload.len(), path.display());

        match std::fs::write(&path, &payload) {
            Ok(()) => {
                info!("Saved attachment {} from message {}", redact_path(&path), seq);
                report.record_saved(SavedAttachment {
                    seq,
                    declared_filename: declared.to_string(),
                    path,
                    size: payload.len(),
                });
            }
            Err(source) => {
                warn!("Message {}: failed to write '{}': {}", seq, filename, source);
                report.record_failed(seq, ExtractError::Write { path, source });
            }
        }
    }
}

fn is_container(part: &MessagePart<'_>) -> bool {
    matches!(part.body, PartType::Multipart(_))
        || part
            .content_type()
            .is_some_and(|ct| ct.ctype().eq_ignore_ascii_case("multipart"))
}

/// Returns the transfer-decoded body of a leaf part.
///
/// Text bodies are re-read from the raw message because the parsed text has
/// already been converted from its declared charset to UTF-8.
fn leaf_payload<'a>(part: &'a MessagePart<'_>, raw: &[u8]) -> Option<Cow<'a, [u8]>> {
    match &part.body {
        PartType::Binary(data) | PartType::InlineBinary(data) => Some(Cow::Borrowed(data.as_ref())),
        PartType::Text(_) | PartType::Html(_) => {
            let body = raw.get(part.raw_body_offset() as usize..part.raw_end_offset() as usize)?;
            transfer_decode(part.content_transfer_encoding(), body).map(Cow::Owned)
        }
        _ => None,
    }
}

/// Undoes the Content-Transfer-Encoding only; charsets are left alone.
fn transfer_decode(encoding: Option<&str>, body: &[u8]) -> Option<Vec<u8>> {
    match encoding.map(str::trim) {
        Some(enc) if enc.eq_ignore_ascii_case("base64") => base64_decode(body),
        Some(enc) if enc.eq_ignore_ascii_case("quoted-printable") => quoted_printable_decode(body),
        _ => Some(body.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_substring_match() {
        assert!(is_pdf_filename("invoice.pdf"));
        assert!(is_pdf_filename("SCAN.PDF"));
        assert!(is_pdf_filename("report.pdfnotes.txt"));
        assert!(is_pdf_filename("a.pdf.zip"));

        assert!(!is_pdf_filename("notes.txt"));
        assert!(!is_pdf_filename("scan.Pdf"));
        assert!(!is_pdf_filename("pdf"));
    }

    #[test]
    fn test_transfer_decode_keeps_charset_bytes() {
        let latin1 = [0xe9, b'%', b'P', b'D', b'F'];

        assert_eq!(transfer_decode(Some("base64"), b"6SVQREY=").unwrap(), latin1);
        assert_eq!(
            transfer_decode(Some(" Quoted-Printable"), b"=E9%PDF").unwrap(),
            latin1
        );
        assert_eq!(transfer_decode(Some("8bit"), &latin1).unwrap(), latin1);
        assert_eq!(transfer_decode(None, b"plain").unwrap(), b"plain");
    }

    #[test]
    fn test_bodiless_messages_have_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let report = extract_pdf_attachments(
            vec![RawMessage::Bodiless { seq: 1 }, RawMessage::Bodiless { seq: 2 }],
            dir.path(),
        );

        assert_eq!(report.messages_seen, 2);
        assert!(report.saved.is_empty());
        assert!(report.failed.is_empty());
        assert_eq!(report.skipped_count(|r| *r == SkipReason::NoBody), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_utf8_is_recorded_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let report = extract_pdf_attachments(
            vec![RawMessage::Literal {
                seq: 4,
                content: vec![0xff, 0xfe, 0x00, 0x41],
            }],
            dir.path(),
        );

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].seq, 4);
        assert!(matches!(report.failed[0].error, ExtractError::Decode { .. }));
    }

    #[test]
    fn test_single_part_inline_body_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let raw = b"From: a@example.com\r\nSubject: hi\r\nContent-Type: text/plain\r\n\r\nSee invoice.pdf\r\n";
        let report = extract_pdf_attachments(
            vec![RawMessage::Literal {
                seq: 1,
                content: raw.to_vec(),
            }],
            dir.path(),
        );

        assert!(report.saved.is_empty());
        assert_eq!(report.skipped_count(|r| *r == SkipReason::NoDisposition), 1);
    }
}
