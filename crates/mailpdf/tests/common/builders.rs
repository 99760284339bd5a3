//! Builder patterns for creating test messages and configurations.
//!
//! These builders produce raw RFC 822 bytes so tests exercise the real MIME
//! parser instead of hand-built part trees.

use std::path::Path;

use base64::Engine;

use mailpdf::{AccountConfig, RunConfig};

const DEFAULT_BOUNDARY: &str = "mailpdf-test-boundary";

/// A minimal PDF-looking payload with non-ASCII bytes in it.
pub fn pdf_bytes(marker: &str) -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    bytes.extend_from_slice(marker.as_bytes());
    bytes.extend_from_slice(b"\n%%EOF\n");
    bytes
}

enum PartKind {
    Text(String),
    Attachment {
        content_type: String,
        name_param: Option<String>,
        disposition: Option<String>,
        data: Vec<u8>,
    },
    Forwarded { filename: String, message: Vec<u8> },
}

/// Builder for raw multipart messages.
pub struct MessageBuilder {
    from: String,
    subject: String,
    boundary: String,
    parts: Vec<PartKind>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            from: "sender@example.com".to_string(),
            subject: "Test message".to_string(),
            boundary: DEFAULT_BOUNDARY.to_string(),
            parts: vec![],
        }
    }

    pub fn sender(mut self, from: &str) -> Self {
        self.from = from.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Use a different multipart boundary (needed for nested messages).
    pub fn boundary(mut self, boundary: &str) -> Self {
        self.boundary = boundary.to_string();
        self
    }

    /// Add an inline text body part (no disposition header).
    pub fn text(mut self, body: &str) -> Self {
        self.parts.push(PartKind::Text(body.to_string()));
        self
    }

    /// Add an attachment with `Content-Disposition: attachment; filename=...`.
    pub fn attachment(self, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.raw_attachment(
            content_type,
            None,
            Some(format!("attachment; filename=\"{}\"", filename).as_str()),
            data,
        )
    }

    /// Add a PDF attachment.
    pub fn pdf(self, filename: &str, data: &[u8]) -> Self {
        self.attachment(filename, "application/pdf", data)
    }

    /// Add an attachment part with full control over the naming headers.
    pub fn raw_attachment(
        mut self,
        content_type: &str,
        name_param: Option<&str>,
        disposition: Option<&str>,
        data: &[u8],
    ) -> Self {
        self.parts.push(PartKind::Attachment {
            content_type: content_type.to_string(),
            name_param: name_param.map(str::to_string),
            disposition: disposition.map(str::to_string),
            data: data.to_vec(),
        });
        self
    }

    /// Attach another message as `message/rfc822`.
    pub fn forwarded(self, message: Vec<u8>) -> Self {
        self.forwarded_as("forwarded.eml", message)
    }

    /// Attach another message under an explicit filename.
    pub fn forwarded_as(mut self, filename: &str, message: Vec<u8>) -> Self {
        self.parts.push(PartKind::Forwarded {
            filename: filename.to_string(),
            message,
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&format!("From: {}\r\n", self.from));
        out.push_str("To: me@example.com\r\n");
        out.push_str(&format!("Subject: {}\r\n", self.subject));
        out.push_str("Message-ID: <test@example.com>\r\n");
        out.push_str("MIME-Version: 1.0\r\n");
        out.push_str(&format!(
            "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
            self.boundary
        ));

        for part in &self.parts {
            out.push_str(&format!("--{}\r\n", self.boundary));
            match part {
                PartKind::Text(body) => {
                    out.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
                    out.push_str(body);
                    out.push_str("\r\n");
                }
                PartKind::Attachment {
                    content_type,
                    name_param,
                    disposition,
                    data,
                } => {
                    match name_param {
                        Some(name) => out.push_str(&format!(
                            "Content-Type: {}; name=\"{}\"\r\n",
                            content_type, name
                        )),
                        None => out.push_str(&format!("Content-Type: {}\r\n", content_type)),
                    }
                    if let Some(disposition) = disposition {
                        out.push_str(&format!("Content-Disposition: {}\r\n", disposition));
                    }
                    out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
                    out.push_str(&wrap_base64(data));
                }
                PartKind::Forwarded { filename, message } => {
                    out.push_str("Content-Type: message/rfc822\r\n");
                    out.push_str(&format!(
                        "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
                        filename
                    ));
                    out.push_str(&String::from_utf8_lossy(message));
                    out.push_str("\r\n");
                }
            }
        }

        out.push_str(&format!("--{}--\r\n", self.boundary));
        out.into_bytes()
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap_base64(data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    let mut wrapped = String::new();
    for chunk in encoded.as_bytes().chunks(76) {
        wrapped.push_str(std::str::from_utf8(chunk).unwrap());
        wrapped.push_str("\r\n");
    }
    wrapped
}

/// Builds a valid run configuration pointing at `output_dir`.
pub fn run_config(output_dir: &Path) -> RunConfig {
    let mut account = AccountConfig::new("imap.example.com", "me@example.com");
    account.auth.password_env_var = Some("MAILPDF_TEST_PASSWORD".to_string());
    RunConfig::new(account, output_dir)
}
