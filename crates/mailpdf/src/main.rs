use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use mailpdf::config::{default_config_path, read_config, validate_config};
use mailpdf::logging::init_logging;
use mailpdf::{AccountConfig, ConfigError, Limit, RunConfig, SearchFilter};

/// Save PDF attachments from an IMAP mailbox into a local directory.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// YAML config file (default: <config dir>/mailpdf/config.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// IMAP server hostname
    #[arg(long)]
    host: Option<String>,

    /// IMAP server port
    #[arg(long)]
    port: Option<u16>,

    /// Account username
    #[arg(short, long)]
    username: Option<String>,

    /// Name of the environment variable holding the password
    #[arg(long)]
    password_env: Option<String>,

    /// File containing the password
    #[arg(long)]
    password_file: Option<String>,

    /// Mailbox to select
    #[arg(short, long)]
    mailbox: Option<String>,

    /// Only fetch messages from this sender ("All" for every message)
    #[arg(short, long)]
    sender: Option<String>,

    /// End index into the search results; negative excludes the last N
    #[arg(short, long, allow_negative_numbers = true)]
    limit: Option<i64>,

    /// Directory attachments are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Fail instead of creating a missing output directory
    #[arg(long)]
    no_create_output_dir: bool,

    /// Per-operation network timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Builds the run configuration from the config file (if any) and flags.
    fn build_config(&self) -> Result<RunConfig, ConfigError> {
        let path = self.config.clone().or_else(default_config_path);

        let mut config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                read_config(&path)?
            }
            None => self.config_from_flags()?,
        };

        self.apply_overrides(&mut config);
        validate_config(&config)?;
        Ok(config)
    }

    fn config_from_flags(&self) -> Result<RunConfig, ConfigError> {
        let required = |value: Option<&str>, flag: &str| {
            value.map(str::to_string).ok_or_else(|| ConfigError::Validation {
                message: format!("{} is required when no config file is used", flag),
            })
        };

        let host = required(self.host.as_deref(), "--host")?;
        let username = required(self.username.as_deref(), "--username")?;
        let output_dir = self
            .output_dir
            .clone()
            .ok_or_else(|| ConfigError::Validation {
                message: "--output-dir is required when no config file is used".to_string(),
            })?;

        Ok(RunConfig::new(AccountConfig::new(host, username), output_dir))
    }

    fn apply_overrides(&self, config: &mut RunConfig) {
        let account = &mut config.account;
        if let Some(host) = &self.host {
            account.host = host.clone();
        }
        if let Some(port) = self.port {
            account.port = port;
        }
        if let Some(username) = &self.username {
            account.username = username.clone();
        }
        if let Some(var) = &self.password_env {
            account.auth.password_env_var = Some(var.clone());
        }
        if let Some(file) = &self.password_file {
            account.auth.password_file = Some(file.clone());
        }

        if let Some(mailbox) = &self.mailbox {
            config.mailbox = mailbox.clone();
        }
        if let Some(sender) = &self.sender {
            config.sender = SearchFilter::from_sender(sender);
        }
        if let Some(limit) = self.limit {
            config.limit = Limit::from_index(limit);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_create_output_dir {
            config.create_output_dir = false;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = Some(secs);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "info" });

    info!("Starting mailpdf v{}", env!("CARGO_PKG_VERSION"));

    let config = match cli.build_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match mailpdf::run(config).await {
        Ok(report) => {
            for failure in &report.failed {
                warn!("Message {}: {}", failure.seq, failure.error);
            }
            info!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
