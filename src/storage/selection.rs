//! The file selection of a folder.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::FileSelection;
use crate::storage::LocalStorage;

/// File name of a selection inside its folder.
pub const SELECTION_FILE_NAME: &str = "fileselection.txt";

/// Selection kept in `<folder>/fileselection.txt`.
#[derive(Debug, Clone)]
pub struct SelectionFolder {
    storage: LocalStorage,
}

impl SelectionFolder {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            storage: LocalStorage::new(folder),
        }
    }

    pub fn folder(&self) -> &Path {
        self.storage.root_dir()
    }

    pub fn selection_path(&self) -> PathBuf {
        self.storage.path(SELECTION_FILE_NAME)
    }

    pub async fn has_selection(&self) -> bool {
        self.storage.exists(SELECTION_FILE_NAME).await
    }

    /// Load the selection. Fails with `NoSelection` if there is none.
    pub async fn load(&self) -> Result<FileSelection> {
        let selection: FileSelection = self
            .storage
            .read_yaml(SELECTION_FILE_NAME)
            .await?
            .ok_or_else(|| AppError::NoSelection(self.folder().to_path_buf()))?;
        selection.validate()?;
        Ok(selection)
    }

    pub async fn save(&self, selection: &FileSelection) -> Result<()> {
        selection.validate()?;
        self.storage
            .write_yaml(SELECTION_FILE_NAME, selection)
            .await
    }

    pub async fn delete(&self) -> Result<()> {
        if !self.storage.remove(SELECTION_FILE_NAME).await? {
            return Err(AppError::NoSelection(self.folder().to_path_buf()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let folder = SelectionFolder::new(dir.path());

        let selection = FileSelection::new(
            "two files",
            dir.path(),
            vec![PathBuf::from("a/1.dcm"), dir.path().join("b").join("2.dcm")],
        )
        .unwrap();
        folder.save(&selection).await.unwrap();

        let loaded = folder.load().await.unwrap();
        assert_eq!(loaded, selection);
        assert_eq!(loaded.selected_paths[1], PathBuf::from("b").join("2.dcm"));
    }

    #[tokio::test]
    async fn test_refuses_paths_outside_folder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SELECTION_FILE_NAME),
            "description: sneaky\nid: abc\nselected_paths:\n- ../outside.dcm\n",
        )
        .unwrap();

        let folder = SelectionFolder::new(dir.path());
        assert!(folder.load().await.is_err());
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let dir = TempDir::new().unwrap();
        let folder = SelectionFolder::new(dir.path());
        assert!(matches!(folder.delete().await, Err(AppError::NoSelection(_))));
    }
}
