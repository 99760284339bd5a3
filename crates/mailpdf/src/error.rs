use std::path::PathBuf;
use thiserror::Error;

use crate::email::EmailError;

#[derive(Error, Debug)]
pub enum MailPdfError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output directory '{0}' does not exist")]
    OutputDirMissing(PathBuf),

    #[error("Output path '{0}' is not a directory")]
    NotADirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, MailPdfError>;
