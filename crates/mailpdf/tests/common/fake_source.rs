//! In-memory mail source for exercising the fetch stage without a server.

use async_trait::async_trait;

use mailpdf::{EmailError, MailSource, RawMessage};

/// Which operation should fail, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Connect,
    Select,
    Search,
    /// Fail when fetching this sequence number.
    Fetch(u32),
    Logout,
}

struct StoredMessage {
    seq: u32,
    sender: String,
    content: Option<Vec<u8>>,
}

/// A single-mailbox fake that records every call it receives.
pub struct FakeMailbox {
    mailbox: String,
    messages: Vec<StoredMessage>,
    failure: Option<Failure>,
    connected: bool,
    pub calls: Vec<String>,
    pub logouts: usize,
}

impl FakeMailbox {
    pub fn new(mailbox: &str) -> Self {
        Self {
            mailbox: mailbox.to_string(),
            messages: vec![],
            failure: None,
            connected: false,
            calls: vec![],
            logouts: 0,
        }
    }

    /// Adds a message; sequence numbers are assigned in insertion order.
    pub fn with_message(mut self, sender: &str, content: Vec<u8>) -> Self {
        let seq = self.messages.len() as u32 + 1;
        self.messages.push(StoredMessage {
            seq,
            sender: sender.to_string(),
            content: Some(content),
        });
        self
    }

    /// Adds a message whose FETCH response carries no body literal.
    pub fn with_bodiless_message(mut self, sender: &str) -> Self {
        let seq = self.messages.len() as u32 + 1;
        self.messages.push(StoredMessage {
            seq,
            sender: sender.to_string(),
            content: None,
        });
        self
    }

    pub fn failing_on(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn fail_if(&self, failure: Failure) -> Result<(), EmailError> {
        if self.failure == Some(failure) {
            Err(EmailError::ProtocolError(format!("injected {:?} failure", failure)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MailSource for FakeMailbox {
    async fn connect(&mut self) -> Result<(), EmailError> {
        self.calls.push("connect".to_string());
        if self.failure == Some(Failure::Connect) {
            return Err(EmailError::AuthenticationFailed("bad credentials".to_string()));
        }
        self.connected = true;
        Ok(())
    }

    async fn select_mailbox(&mut self, mailbox: &str) -> Result<u32, EmailError> {
        self.calls.push(format!("select {}", mailbox));
        self.fail_if(Failure::Select)?;
        if mailbox != self.mailbox {
            return Err(EmailError::FolderNotFound(mailbox.to_string()));
        }
        Ok(self.messages.len() as u32)
    }

    async fn search(&mut self, query: &str) -> Result<Vec<u32>, EmailError> {
        self.calls.push(format!("search {}", query));
        self.fail_if(Failure::Search)?;

        if query == "All" {
            return Ok(self.messages.iter().map(|m| m.seq).collect());
        }

        let sender = query
            .strip_prefix("(FROM ")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| EmailError::ProtocolError(format!("unsupported query {}", query)))?;

        Ok(self
            .messages
            .iter()
            .filter(|m| m.sender.contains(sender))
            .map(|m| m.seq)
            .collect())
    }

    async fn fetch_rfc822(&mut self, seq: u32) -> Result<RawMessage, EmailError> {
        self.calls.push(format!("fetch {}", seq));
        self.fail_if(Failure::Fetch(seq))?;

        let stored = self.messages.iter().find(|m| m.seq == seq);
        Ok(match stored.and_then(|m| m.content.clone()) {
            Some(content) => RawMessage::Literal { seq, content },
            None => RawMessage::Bodiless { seq },
        })
    }

    async fn disconnect(&mut self) -> Result<(), EmailError> {
        self.calls.push("logout".to_string());
        self.logouts += 1;
        self.connected = false;
        self.fail_if(Failure::Logout)
    }
}
