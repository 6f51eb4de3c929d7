//! The mapping file of a folder.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::mapping::{DEFAULT_MAPPING_NAME, Mapping};
use crate::storage::LocalStorage;

/// Mapping kept in `<folder>/anon_mapping.csv`.
#[derive(Debug, Clone)]
pub struct MappingFolder {
    storage: LocalStorage,
}

impl MappingFolder {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            storage: LocalStorage::new(folder),
        }
    }

    pub fn folder(&self) -> &Path {
        self.storage.root_dir()
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.storage.path(DEFAULT_MAPPING_NAME)
    }

    pub async fn has_mapping(&self) -> bool {
        self.storage.exists(DEFAULT_MAPPING_NAME).await
    }

    /// Load and parse the mapping. Fails with `NoMapping` if there is none.
    pub async fn load(&self) -> Result<Mapping> {
        let text = self
            .storage
            .read_text(DEFAULT_MAPPING_NAME)
            .await?
            .ok_or_else(|| AppError::NoMapping(self.folder().to_path_buf()))?;
        Ok(Mapping::parse(&text)?)
    }

    pub async fn save(&self, mapping: &Mapping) -> Result<()> {
        let text = mapping.to_csv_string()?;
        self.storage
            .write_bytes(DEFAULT_MAPPING_NAME, text.as_bytes())
            .await?;
        log::debug!(
            "Saved mapping with {} rows to {}",
            mapping.len(),
            self.mapping_path().display()
        );
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        if !self.storage.remove(DEFAULT_MAPPING_NAME).await? {
            return Err(AppError::NoMapping(self.folder().to_path_buf()));
        }
        Ok(())
    }
}
