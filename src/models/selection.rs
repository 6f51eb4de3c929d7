//! Explicit file selections used as a job data source.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A list of files, relative to the folder holding the selection file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileSelection {
    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Generated unique identifier
    pub id: String,

    /// Paths relative to the selection file's folder
    #[serde(default)]
    pub selected_paths: Vec<PathBuf>,
}

impl FileSelection {
    /// Create a selection with a fresh ID.
    ///
    /// Absolute paths must lie under `root`; they are stored relative to it.
    pub fn new(description: impl Into<String>, root: &Path, paths: Vec<PathBuf>) -> Result<Self> {
        let mut selection = Self {
            description: description.into(),
            id: Uuid::new_v4().to_string(),
            selected_paths: Vec::with_capacity(paths.len()),
        };
        for path in paths {
            selection.add_path(root, &path)?;
        }
        Ok(selection)
    }

    /// Add one path. Duplicates are skipped.
    pub fn add_path(&mut self, root: &Path, path: &Path) -> Result<()> {
        let relative = relative_within(root, path)?;
        if !self.selected_paths.contains(&relative) {
            self.selected_paths.push(relative);
        }
        Ok(())
    }

    /// Check every stored path stays within the selection's folder.
    pub fn validate(&self) -> Result<()> {
        for path in &self.selected_paths {
            if !is_contained(path) {
                return Err(AppError::validation(format!(
                    "Selected path '{}' is outside the selection folder",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.selected_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_paths.is_empty()
    }

    /// Human readable summary.
    pub fn describe(&self) -> String {
        format!(
            "Selection containing {} files:\nDescription: {}",
            self.selected_paths.len(),
            self.description
        )
    }
}

/// Express `path` relative to `root`, refusing anything outside it.
fn relative_within(root: &Path, path: &Path) -> Result<PathBuf> {
    let relative = if path.is_absolute() {
        path.strip_prefix(root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                AppError::validation(format!(
                    "'{}' is not inside '{}'",
                    path.display(),
                    root.display()
                ))
            })?
    } else {
        path.to_path_buf()
    };

    if !is_contained(&relative) {
        return Err(AppError::validation(format!(
            "'{}' is outside the selection folder",
            path.display()
        )));
    }
    Ok(relative)
}

/// Relative, and never climbs above its starting folder.
fn is_contained(path: &Path) -> bool {
    let mut depth: i32 = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_makes_paths_relative() {
        let root = Path::new("/data/study1");
        let selection = FileSelection::new(
            "study1",
            root,
            vec![
                PathBuf::from("/data/study1/a/1.dcm"),
                PathBuf::from("b/2.dcm"),
                PathBuf::from("b/2.dcm"),
            ],
        )
        .unwrap();

        assert_eq!(
            selection.selected_paths,
            vec![PathBuf::from("a/1.dcm"), PathBuf::from("b/2.dcm")]
        );
        assert!(Uuid::parse_str(&selection.id).is_ok());
    }

    #[test]
    fn test_rejects_paths_outside_folder() {
        let root = Path::new("/data/study1");
        assert!(FileSelection::new("x", root, vec![PathBuf::from("/data/other/1.dcm")]).is_err());
        assert!(FileSelection::new("x", root, vec![PathBuf::from("../other/1.dcm")]).is_err());
        assert!(FileSelection::new("x", root, vec![PathBuf::from("a/../../1.dcm")]).is_err());
    }

    #[test]
    fn test_validate_loaded_selection() {
        let selection: FileSelection = serde_yaml::from_str(
            "description: test\nid: abc\nselected_paths:\n- a/1.dcm\n- ../escape.dcm\n",
        )
        .unwrap();
        assert!(selection.validate().is_err());
    }
}
