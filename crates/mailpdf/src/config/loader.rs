use std::path::{Path, PathBuf};

use crate::config::schema::RunConfig;
use crate::email::SearchFilter;
use crate::error::ConfigError;
use crate::secrets::has_secret_source;

const CONFIG_FILE_NAME: &str = "config.yaml";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
    let config = read_config(path)?;

    validate_config(&config)?;

    Ok(config)
}

/// Parses a config file without validating it, so callers can layer
/// overrides on top before calling [`validate_config`].
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(serde_yaml::from_str(&content)?)
}

pub fn load_config_from_str(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = serde_yaml::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Returns `<config dir>/mailpdf/config.yaml` if that file exists.
pub fn default_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("mailpdf").join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

pub fn validate_config(config: &RunConfig) -> Result<(), ConfigError> {
    let account = &config.account;

    if account.host.trim().is_empty() {
        return Err(validation("account.host must not be empty"));
    }

    if account.port == 0 {
        return Err(validation("account.port must not be 0"));
    }

    if !account.use_tls {
        return Err(validation(
            "account.useTls must be true; plaintext IMAP is not supported",
        ));
    }

    if account.username.trim().is_empty() {
        return Err(validation("account.username must not be empty"));
    }

    if !has_secret_source(
        account.auth.password_insecure.as_deref(),
        account.auth.password_file.as_deref(),
        account.auth.password_env_var.as_deref(),
    ) {
        return Err(validation(
            "account.auth needs one of passwordEnvVar, passwordFile or passwordInsecure",
        ));
    }

    if config.mailbox.trim().is_empty() {
        return Err(validation("mailbox must not be empty"));
    }

    if let SearchFilter::From(sender) = &config.sender {
        if sender.is_empty() {
            return Err(validation("sender must not be empty (use \"All\")"));
        }
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(validation("outputDir must not be empty"));
    }

    if config.timeout_secs == Some(0) {
        return Err(validation("timeoutSecs must be greater than 0"));
    }

    Ok(())
}

fn validation(message: &str) -> ConfigError {
    ConfigError::Validation {
        message: message.to_string(),
    }
}
