//! IMAP client for connecting to email servers.

use std::future::Future;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use async_imap::Session;
use async_native_tls::TlsConnector;
use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::config::schema::{AccountConfig, AuthSettings};

use super::error::{EmailError, Result};
use super::source::{MailSource, RawMessage};

/// Type alias for the underlying async stream (using async-std compatible TcpStream).
type AsyncTcpStream = async_io::Async<std::net::TcpStream>;

/// Type alias for the TLS stream used by the IMAP session.
type TlsStream = async_native_tls::TlsStream<AsyncTcpStream>;

/// IMAP client for fetching raw messages.
pub struct ImapClient {
    session: Option<Session<TlsStream>>,
    account: AccountConfig,
    timeout: Option<Duration>,
    current_mailbox: Option<String>,
}

impl ImapClient {
    /// Creates a new IMAP client for the given account.
    pub fn new(account: AccountConfig) -> Self {
        Self {
            session: None,
            account,
            timeout: None,
            current_mailbox: None,
        }
    }

    /// Bounds every network round-trip by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the selected mailbox, if any.
    pub fn current_mailbox(&self) -> Option<&str> {
        self.current_mailbox.as_deref()
    }

    /// Checks if the client is currently connected.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn session_mut(&mut self) -> Result<&mut Session<TlsStream>> {
        self.session
            .as_mut()
            .ok_or_else(|| EmailError::ConnectionFailed("Not connected".to_string()))
    }
}

#[async_trait]
impl MailSource for ImapClient {
    async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("Already connected to IMAP server");
            return Ok(());
        }

        if !self.account.use_tls {
            return Err(EmailError::ConfigError(
                "TLS is required for secure email connections".to_string(),
            ));
        }

        let timeout = self.timeout;
        let account = &self.account;
        let tls_stream = with_timeout(timeout, "connect", open_tls_stream(account)).await?;
        let client = async_imap::Client::new(tls_stream);
        let session =
            with_timeout(timeout, "LOGIN", authenticate_password(account, client)).await?;

        info!("Successfully authenticated as {}", self.account.username);
        self.session = Some(session);
        Ok(())
    }

    async fn select_mailbox(&mut self, mailbox: &str) -> Result<u32> {
        let timeout = self.timeout;
        let session = self.session_mut()?;

        info!("Selecting mailbox: {}", mailbox);

        let selected = with_timeout(timeout, "SELECT", async {
            session.select(mailbox).await.map_err(|e| match e {
                async_imap::error::Error::No(_) => EmailError::FolderNotFound(mailbox.to_string()),
                other => EmailError::ProtocolError(other.to_string()),
            })
        })
        .await?;

        debug!("Mailbox '{}' holds {} messages", mailbox, selected.exists);
        self.current_mailbox = Some(mailbox.to_string());
        Ok(selected.exists)
    }

    async fn search(&mut self, query: &str) -> Result<Vec<u32>> {
        let timeout = self.timeout;
        let session = self.session_mut()?;

        debug!("Searching with query: {}", query);

        let found = with_timeout(timeout, "SEARCH", async {
            session
                .search(query)
                .await
                .map_err(|e| EmailError::ProtocolError(e.to_string()))
        })
        .await?;

        // The server's result set is unordered once collected; sequence
        // numbers ascend in mailbox order.
        let mut seqs: Vec<u32> = found.into_iter().collect();
        seqs.sort_unstable();
        debug!("Found {} messages matching search", seqs.len());
        Ok(seqs)
    }

    async fn fetch_rfc822(&mut self, seq: u32) -> Result<RawMessage> {
        let timeout = self.timeout;
        let session = self.session_mut()?;

        debug!("Fetching message {}", seq);

        with_timeout(timeout, "FETCH", async {
            let mut responses = session
                .fetch(seq.to_string(), "RFC822")
                .await
                .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

            // Drain the whole response so the session is ready for the next command.
            let mut content = None;
            while let Some(response) = responses.next().await {
                let fetch = response.map_err(|e| EmailError::ProtocolError(e.to_string()))?;
                if content.is_none() {
                    content = fetch.body().map(<[u8]>::to_vec);
                }
            }

            Ok(match content {
                Some(content) => RawMessage::Literal { seq, content },
                None => RawMessage::Bodiless { seq },
            })
        })
        .await
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            info!("Disconnecting from IMAP server");
            let timeout = self.timeout;
            with_timeout(timeout, "LOGOUT", async {
                session
                    .logout()
                    .await
                    .map_err(|e| EmailError::ProtocolError(e.to_string()))
            })
            .await?;
        }
        self.current_mailbox = None;
        Ok(())
    }
}

impl Drop for ImapClient {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("ImapClient dropped without explicit disconnect - session will be closed");
        }
    }
}

/// Opens the TCP connection and wraps it with TLS.
///
/// The connect itself is awaited, so an enclosing timeout bounds it.
async fn open_tls_stream(account: &AccountConfig) -> Result<TlsStream> {
    let addr = format!("{}:{}", account.host, account.port);
    info!("Connecting to IMAP server at {}", addr);

    let candidates: Vec<SocketAddr> = (account.host.as_str(), account.port)
        .to_socket_addrs()
        .map_err(|e| EmailError::ConnectionFailed(format!("{}: {}", addr, e)))?
        .collect();

    let mut last_error = None;
    let mut tcp_stream = None;
    for candidate in candidates {
        match AsyncTcpStream::connect(candidate).await {
            Ok(stream) => {
                tcp_stream = Some(stream);
                break;
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }
    let tcp_stream = tcp_stream.ok_or_else(|| {
        EmailError::ConnectionFailed(match last_error {
            Some(e) => format!("{}: {}", addr, e),
            None => format!("{}: no addresses resolved", addr),
        })
    })?;

    let tls = TlsConnector::new();
    let tls_stream = tls.connect(&account.host, tcp_stream).await?;
    Ok(tls_stream)
}

/// Authenticates with LOGIN using the resolved password.
async fn authenticate_password(
    account: &AccountConfig,
    client: async_imap::Client<TlsStream>,
) -> Result<Session<TlsStream>> {
    let password = get_password(&account.auth)?;

    client
        .login(&account.username, password.expose_secret())
        .await
        .map_err(|(e, _)| EmailError::AuthenticationFailed(e.to_string()))
}

/// Gets the password from configured sources (direct value, file, or env var).
fn get_password(auth: &AuthSettings) -> Result<SecretString> {
    if auth.password_insecure.is_some() {
        warn!(
            "Using direct password value (passwordInsecure) is not recommended. \
             Consider using passwordEnvVar or passwordFile instead."
        );
    }
    crate::secrets::resolve_secret(
        auth.password_insecure.as_deref(),
        auth.password_file.as_deref(),
        auth.password_env_var.as_deref(),
    )
    .map_err(|e| EmailError::CredentialsNotFound(e.to_string()))
}

/// Runs `fut`, failing with `EmailError::Timeout` if it outlives `limit`.
async fn with_timeout<T, F>(limit: Option<Duration>, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            EmailError::Timeout(format!("{} did not complete within {:?}", operation, limit))
        })?,
        None => fut.await,
    }
}
