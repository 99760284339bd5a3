//! Account password resolution.
//!
//! A password can be supplied three ways, checked in this order:
//!
//! 1. **Direct value** - quick local testing (`passwordInsecure: "..."`)
//! 2. **File reference** - Docker secrets style (`passwordFile: /run/secrets/imap`)
//! 3. **Env var reference** - (`passwordEnvVar: MAILPDF_PASSWORD`)
//!
//! Empty strings count as "not configured".

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// The configured place a secret comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource<'a> {
    Direct(&'a str),
    File(&'a str),
    EnvVar(&'a str),
}

impl<'a> SecretSource<'a> {
    /// Picks the highest-priority non-empty source.
    pub fn select(
        direct: Option<&'a str>,
        file_path: Option<&'a str>,
        env_var: Option<&'a str>,
    ) -> Option<Self> {
        let non_empty = |s: Option<&'a str>| s.filter(|s| !s.is_empty());

        non_empty(direct)
            .map(SecretSource::Direct)
            .or_else(|| non_empty(file_path).map(SecretSource::File))
            .or_else(|| non_empty(env_var).map(SecretSource::EnvVar))
    }

    /// Reads the secret. File and env var values are trimmed.
    pub fn resolve(self) -> Result<SecretString> {
        match self {
            SecretSource::Direct(value) => Ok(SecretString::from(value.to_string())),
            SecretSource::File(path) => {
                let expanded = expand_home(path);
                fs::read_to_string(&expanded)
                    .map(|content| SecretString::from(content.trim().to_string()))
                    .map_err(|source| SecretError::FileReadError {
                        path: expanded,
                        source,
                    })
            }
            SecretSource::EnvVar(name) => match std::env::var(name) {
                Ok(value) => Ok(SecretString::from(value.trim().to_string())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            },
        }
    }
}

/// Resolves a secret from the first configured source.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    SecretSource::select(direct, file_path, env_var)
        .ok_or(SecretError::NoSourceProvided)?
        .resolve()
}

/// Checks if at least one secret source is configured (non-empty).
pub fn has_secret_source(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> bool {
    SecretSource::select(direct, file_path, env_var).is_some()
}

/// Expands a leading `~` or `~/` to the user's home directory.
fn expand_home(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return path.to_string(),
    };

    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.to_string_lossy(), rest),
        None => path.to_string(),
    }
}
