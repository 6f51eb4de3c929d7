//! The batch file of a folder.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{JobBatch, RemoteServer};
use crate::storage::{BatchStore, LocalStorage};

/// Location of the batch file, relative to its folder.
pub const BATCH_FILE_KEY: &str = ".anonapi/batch.yml";

/// Batch kept in `<folder>/.anonapi/batch.yml`.
#[derive(Debug, Clone)]
pub struct BatchFolder {
    storage: LocalStorage,
}

impl BatchFolder {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            storage: LocalStorage::new(folder),
        }
    }

    pub fn folder(&self) -> &Path {
        self.storage.root_dir()
    }

    pub fn batch_path(&self) -> PathBuf {
        self.storage.path(BATCH_FILE_KEY)
    }

    /// Start an empty batch for `server`.
    ///
    /// An existing batch is left untouched unless `overwrite` is set.
    pub async fn init(&self, server: RemoteServer, overwrite: bool) -> Result<JobBatch> {
        if !overwrite && self.has_batch().await {
            return Err(AppError::BatchExists(self.folder().to_path_buf()));
        }
        let batch = JobBatch::new(server);
        self.save(&batch).await?;
        log::info!("Created empty batch in {}", self.folder().display());
        Ok(batch)
    }

    /// Delete the batch file. Fails with `NoBatch` if there is none.
    pub async fn delete(&self) -> Result<()> {
        if !self.storage.remove(BATCH_FILE_KEY).await? {
            return Err(AppError::NoBatch(self.folder().to_path_buf()));
        }
        log::info!("Removed batch in {}", self.folder().display());
        Ok(())
    }
}

#[async_trait]
impl BatchStore for BatchFolder {
    async fn has_batch(&self) -> bool {
        self.storage.exists(BATCH_FILE_KEY).await
    }

    async fn load(&self) -> Result<JobBatch> {
        self.storage
            .read_yaml(BATCH_FILE_KEY)
            .await
            .map_err(|e| {
                AppError::validation(format!(
                    "Could not read batch file {}: {e}",
                    self.batch_path().display()
                ))
            })?
            .ok_or_else(|| AppError::NoBatch(self.folder().to_path_buf()))
    }

    async fn save(&self, batch: &JobBatch) -> Result<()> {
        self.storage.write_yaml(BATCH_FILE_KEY, batch).await?;
        log::debug!(
            "Saved batch with {} jobs to {}",
            batch.len(),
            self.batch_path().display()
        );
        Ok(())
    }
}
