//! The mail-server operations the fetch stage depends on.

use async_trait::async_trait;

use super::error::Result;

/// One message as returned by a `FETCH <seq> RFC822` round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMessage {
    /// The response carried the full RFC 822 literal.
    Literal { seq: u32, content: Vec<u8> },
    /// The response had no body literal (or the server sent nothing back).
    Bodiless { seq: u32 },
}

impl RawMessage {
    /// Message sequence number this response belongs to.
    pub fn seq(&self) -> u32 {
        match self {
            RawMessage::Literal { seq, .. } | RawMessage::Bodiless { seq } => *seq,
        }
    }
}

/// A session-oriented mailbox retrieval protocol.
///
/// `ImapClient` is the production implementation. Callers normally go
/// through [`fetch_messages`](super::fetch_messages), which guarantees
/// `disconnect` is called once `connect` has succeeded.
#[async_trait]
pub trait MailSource: Send {
    /// Opens the connection and authenticates.
    async fn connect(&mut self) -> Result<()>;

    /// Selects a mailbox and returns its message count.
    async fn select_mailbox(&mut self, mailbox: &str) -> Result<u32>;

    /// Runs a SEARCH and returns matching sequence numbers in server order.
    async fn search(&mut self, query: &str) -> Result<Vec<u32>>;

    /// Fetches the full content of one message.
    async fn fetch_rfc822(&mut self, seq: u32) -> Result<RawMessage>;

    /// Logs out and closes the connection.
    async fn disconnect(&mut self) -> Result<()>;
}
