pub mod config;
pub mod email;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod sanitize;
pub mod secrets;

pub use config::{load_config, load_config_from_str, AccountConfig, AuthSettings, RunConfig};
pub use email::{
    extract_pdf_attachments, fetch_messages, EmailError, ExtractError, ExtractionReport,
    FetchRequest, ImapClient, Limit, MailSource, RawMessage, SearchFilter,
};
pub use error::{ConfigError, MailPdfError, Result, StorageError};
pub use pipeline::{run, Pipeline};
pub use secrets::{resolve_secret, SecretError};
