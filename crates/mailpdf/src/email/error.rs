//! Error types for fetching messages and extracting attachments.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the IMAP server.
///
/// All of these are fatal for a run: the fetch stage has no retry logic.
#[derive(Error, Debug)]
pub enum EmailError {
    /// Failed to connect to the IMAP server.
    #[error("IMAP connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS/SSL error during connection.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to resolve the account password.
    #[error("Credentials not found: {0}")]
    CredentialsNotFound(String),

    /// IMAP protocol error.
    #[error("IMAP protocol error: {0}")]
    ProtocolError(String),

    /// Mailbox not found.
    #[error("IMAP mailbox '{0}' not found")]
    FolderNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<async_native_tls::Error> for EmailError {
    fn from(err: async_native_tls::Error) -> Self {
        EmailError::TlsError(err.to_string())
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, EmailError>;

/// Non-fatal errors recorded while extracting attachments.
///
/// Each one is logged and collected into the extraction report; the batch
/// always continues with the next part or message.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The part has a disposition header but no declared filename.
    #[error("attachment has no filename")]
    MissingFilename,

    /// The message or part payload could not be decoded.
    #[error("failed to decode {what}")]
    Decode { what: String },

    /// The message could not be parsed as MIME.
    #[error("failed to parse message")]
    Parse,

    /// The declared filename is unusable as an output file name.
    #[error("refusing unsafe attachment filename {0:?}")]
    UnsafeFilename(String),

    /// Writing the attachment to disk failed.
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
