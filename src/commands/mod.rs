// src/commands/mod.rs

//! Entry points for the `anon` command groups.
//!
//! Each function does one command and returns the text to show the user.
//! Progress and warnings go through `log`.

pub mod batch;
pub mod create;
pub mod job;
pub mod map;
pub mod select;
pub mod server;
pub mod settings;

use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::{RemoteServer, Settings};
use crate::services::WebApiClient;
use crate::storage::{BatchFolder, MappingFolder, SelectionFolder};

/// Asks the user before bulk changes.
pub trait Confirm {
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Answers yes to everything, for `--yes`.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// State shared by every command of one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub settings_path: PathBuf,
    /// Folder holding the batch, mapping and selection to work on
    pub current_dir: PathBuf,
}

impl Context {
    /// Load settings from `settings_path`, or the default location.
    pub fn load(settings_path: Option<PathBuf>, current_dir: PathBuf) -> Result<Self> {
        let settings_path = match settings_path {
            Some(path) => path,
            None => Settings::default_path()?,
        };
        let settings = Settings::load_or_init(&settings_path)?;
        log::debug!("Loaded settings from {}", settings_path.display());
        Ok(Self {
            settings,
            settings_path,
            current_dir,
        })
    }

    pub fn save_settings(&self) -> Result<()> {
        self.settings.validate()?;
        self.settings.save(&self.settings_path)
    }

    pub fn active_server(&self) -> Result<RemoteServer> {
        self.settings.active_server().cloned()
    }

    /// Named server, or the active one.
    pub fn server_or_active(&self, name: Option<&str>) -> Result<RemoteServer> {
        match name {
            Some(name) => self.settings.server(name).cloned().ok_or_else(|| {
                AppError::settings(format!(
                    "Unknown server '{name}'. Please choose one of {:?}",
                    self.settings.server_names()
                ))
            }),
            None => self.active_server(),
        }
    }

    pub fn api_for(&self, server: &RemoteServer) -> Result<WebApiClient> {
        WebApiClient::for_server(&self.settings, server)
    }

    pub fn batch_folder(&self) -> BatchFolder {
        BatchFolder::new(&self.current_dir)
    }

    pub fn mapping_folder(&self) -> MappingFolder {
        MappingFolder::new(&self.current_dir)
    }

    pub fn selection_folder(&self) -> SelectionFolder {
        SelectionFolder::new(&self.current_dir)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tempfile::TempDir;

    /// Context with fresh settings and an empty working folder.
    pub fn context() -> (TempDir, Context) {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        let ctx = Context::load(Some(dir.path().join("settings.toml")), work).unwrap();
        (dir, ctx)
    }
}
