use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::email::{FetchRequest, Limit, SearchFilter};

/// Complete configuration for one fetch-and-extract run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Mail account to connect to.
    pub account: AccountConfig,

    /// Mailbox to select (default: "INBOX").
    #[serde(default = "default_mailbox")]
    pub mailbox: String,

    /// Sender filter; "All" selects every message (default: "All").
    #[serde(default)]
    pub sender: SearchFilter,

    /// End index applied to the search results; negative excludes the last N.
    #[serde(default)]
    pub limit: Limit,

    /// Directory attachments are written to.
    pub output_dir: PathBuf,

    /// Create the output directory if it does not exist (default: true).
    #[serde(default = "default_true")]
    pub create_output_dir: bool,

    /// Per-operation network timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl RunConfig {
    /// Creates a configuration with defaults for everything but the account
    /// and output directory.
    pub fn new(account: AccountConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            account,
            mailbox: default_mailbox(),
            sender: SearchFilter::All,
            limit: Limit::Unbounded,
            output_dir: output_dir.into(),
            create_output_dir: true,
            timeout_secs: None,
        }
    }

    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            mailbox: self.mailbox.clone(),
            filter: self.sender.clone(),
            limit: self.limit,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// IMAP account connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    /// IMAP server hostname (e.g., "imap.gmail.com").
    pub host: String,

    /// IMAP server port (default: 993 for IMAPS).
    #[serde(default = "default_imap_port")]
    pub port: u16,

    /// Whether to use TLS (required for security).
    #[serde(default = "default_true")]
    pub use_tls: bool,

    /// Account username (typically the email address).
    pub username: String,

    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthSettings,
}

impl AccountConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_imap_port(),
            use_tls: true,
            username: username.into(),
            auth: AuthSettings::default(),
        }
    }
}

/// Password sources, resolved at connect time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    /// Environment variable containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env_var: Option<String>,

    /// Direct password value (for local testing only).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "passwordInsecure",
        alias = "password"
    )]
    pub password_insecure: Option<String>,

    /// Path to a file containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<String>,
}

fn default_imap_port() -> u16 {
    993
}

fn default_mailbox() -> String {
    "INBOX".to_string()
}

fn default_true() -> bool {
    true
}
