use std::path::Path;

use tracing::{debug, info, info_span, Instrument};

use crate::config::RunConfig;
use crate::email::{fetch_messages, AttachmentExtractor, ExtractionReport, ImapClient, MailSource};
use crate::error::{Result, StorageError};

pub struct Pipeline {
    config: RunConfig,
    extractor: AttachmentExtractor,
}

impl Pipeline {
    pub fn from_config(config: RunConfig) -> Self {
        let extractor = AttachmentExtractor::new(&config.output_dir);
        Self { config, extractor }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Connects to the configured account and runs the whole batch.
    pub async fn run(&self) -> Result<ExtractionReport> {
        let mut client =
            ImapClient::new(self.config.account.clone()).with_timeout(self.config.timeout());
        self.run_with_source(&mut client).await
    }

    /// Runs the batch against an arbitrary mail source.
    ///
    /// The output directory is checked before any network traffic, so a
    /// bad path fails fast. Fetch errors are fatal; extraction errors are
    /// reported.
    pub async fn run_with_source<S>(&self, source: &mut S) -> Result<ExtractionReport>
    where
        S: MailSource + ?Sized,
    {
        let span = info_span!("run", account = %self.config.account.username);
        self.execute(source).instrument(span).await
    }

    async fn execute<S>(&self, source: &mut S) -> Result<ExtractionReport>
    where
        S: MailSource + ?Sized,
    {
        prepare_output_dir(&self.config.output_dir, self.config.create_output_dir).await?;

        let request = self.config.fetch_request();
        info!(
            "Fetching {} from '{}' (limit: {})",
            request.filter, request.mailbox, request.limit
        );
        let messages = fetch_messages(source, &request).await?;

        Ok(self.extractor.extract(messages))
    }
}

/// Runs one fetch-and-extract batch for `config`.
pub async fn run(config: RunConfig) -> Result<ExtractionReport> {
    Pipeline::from_config(config).run().await
}

async fn prepare_output_dir(dir: &Path, create: bool) -> std::result::Result<(), StorageError> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(StorageError::NotADirectory(dir.to_path_buf())),
        Err(_) if create => {
            debug!("Creating output directory {}", dir.display());
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StorageError::CreateDirectory {
                    path: dir.to_path_buf(),
                    source,
                })
        }
        Err(_) => Err(StorageError::OutputDirMissing(dir.to_path_buf())),
    }
}
