//! Client settings stored in the user's home directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::RemoteServer;

/// File name of the settings file inside the home directory.
pub const SETTINGS_FILE_NAME: &str = "AnonWebAPIClientSettings.toml";

/// Root client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// User name sent with every API call
    #[serde(default = "defaults::user_name")]
    pub user_name: String,

    /// API token sent with every API call
    #[serde(default = "defaults::user_token")]
    pub user_token: String,

    /// Name of the server commands talk to
    #[serde(default)]
    pub active_server: Option<String>,

    /// HTTP behavior
    #[serde(default)]
    pub client: ClientConfig,

    /// Values used for new jobs unless a mapping says otherwise
    #[serde(default)]
    pub job_defaults: JobDefaults,

    /// All known servers
    #[serde(default)]
    pub servers: Vec<RemoteServer>,
}

impl Settings {
    /// Default location: `~/AnonWebAPIClientSettings.toml`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(SETTINGS_FILE_NAME))
            .ok_or_else(|| AppError::settings("Could not determine home directory"))
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load settings, writing defaults to `path` first if there is no file yet.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let settings = Self::load(path).map_err(|e| {
                AppError::settings(format!("Could not read settings from {}: {e}", path.display()))
            })?;
            settings.validate()?;
            return Ok(settings);
        }

        log::warn!(
            "No settings found at {}. Writing default settings there.",
            path.display()
        );
        let settings = Self::default();
        settings.save(path)?;
        Ok(settings)
    }

    /// Write settings to a TOML file. Writes to a temporary file first,
    /// then renames it over the old one.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Validate settings values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.client.timeout_secs == 0 {
            return Err(AppError::validation("client.timeout_secs must be > 0"));
        }
        if self.client.user_agent.trim().is_empty() {
            return Err(AppError::validation("client.user_agent is empty"));
        }
        for (i, server) in self.servers.iter().enumerate() {
            if server.name.trim().is_empty() {
                return Err(AppError::validation(format!("servers[{i}] has no name")));
            }
            Url::parse(&server.url).map_err(|e| {
                AppError::validation(format!("server '{}' url '{}': {e}", server.name, server.url))
            })?;
            if self.servers[..i].iter().any(|s| s.name == server.name) {
                return Err(AppError::validation(format!(
                    "server name '{}' is used twice",
                    server.name
                )));
            }
        }
        if let Some(active) = &self.active_server {
            if self.server(active).is_none() {
                return Err(AppError::validation(format!(
                    "Active server '{active}' was not found in servers {:?}",
                    self.server_names()
                )));
            }
        }
        Ok(())
    }

    /// Look up a server by name.
    pub fn server(&self, name: &str) -> Option<&RemoteServer> {
        self.servers.iter().find(|s| s.name == name)
    }

    pub fn server_names(&self) -> Vec<&str> {
        self.servers.iter().map(|s| s.name.as_str()).collect()
    }

    /// The active server. Commands read this once and pass it down.
    pub fn active_server(&self) -> Result<&RemoteServer> {
        let name = self.active_server.as_deref().ok_or_else(|| {
            AppError::settings(format!(
                "No active server. Activate one with 'anon server activate <NAME>'. Available: {:?}",
                self.server_names()
            ))
        })?;
        self.server(name)
            .ok_or_else(|| AppError::settings(format!("Unknown active server '{name}'")))
    }

    /// Add a server. Names must be unique.
    pub fn add_server(&mut self, server: RemoteServer) -> Result<()> {
        if self.server(&server.name).is_some() {
            return Err(AppError::validation(format!(
                "A server named '{}' already exists",
                server.name
            )));
        }
        Url::parse(&server.url)?;
        self.servers.push(server);
        Ok(())
    }

    /// Remove a server; deactivates it if it was active.
    pub fn remove_server(&mut self, name: &str) -> Result<RemoteServer> {
        let pos = self
            .servers
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| self.unknown_server(name))?;
        if self.active_server.as_deref() == Some(name) {
            self.active_server = None;
        }
        Ok(self.servers.remove(pos))
    }

    /// Make the named server active.
    pub fn activate(&mut self, name: &str) -> Result<()> {
        if self.server(name).is_none() {
            return Err(self.unknown_server(name));
        }
        self.active_server = Some(name.to_string());
        Ok(())
    }

    fn unknown_server(&self, name: &str) -> AppError {
        AppError::settings(format!(
            "Unknown server '{name}'. Please choose one of {:?}",
            self.server_names()
        ))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_name: defaults::user_name(),
            user_token: defaults::user_token(),
            active_server: Some("test".to_string()),
            client: ClientConfig::default(),
            job_defaults: JobDefaults::default(),
            servers: defaults::servers(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Reject servers whose certificate cannot be verified
    #[serde(default = "defaults::validate_https")]
    pub validate_https: bool,

    /// Number of jobs shown by `server jobs`
    #[serde(default = "defaults::job_list_limit")]
    pub job_list_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            validate_https: defaults::validate_https(),
            job_list_limit: defaults::job_list_limit(),
        }
    }
}

/// Job parameters applied when a mapping does not set them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct JobDefaults {
    #[serde(default)]
    pub project_name: Option<String>,

    #[serde(default)]
    pub destination_path: Option<String>,
}

mod defaults {
    use crate::models::RemoteServer;

    pub fn user_name() -> String {
        "username".into()
    }
    pub fn user_token() -> String {
        "token".into()
    }
    pub fn user_agent() -> String {
        concat!("anonapi/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn validate_https() -> bool {
        true
    }
    pub fn job_list_limit() -> usize {
        50
    }
    pub fn servers() -> Vec<RemoteServer> {
        vec![RemoteServer::new("test", "https://hostname_of_api")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn validate_default_settings_ok() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_active_server() {
        let mut settings = Settings::default();
        settings.active_server = Some("nope".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.client.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE_NAME);

        let mut settings = Settings::default();
        settings
            .add_server(RemoteServer::new("p01", "https://p01/api"))
            .unwrap();
        settings.activate("p01").unwrap();
        settings.job_defaults.project_name = Some("Wetenschap-Algemeen".to_string());
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.active_server().unwrap().url, "https://p01/api");
    }

    #[test]
    fn test_save_replaces_file_without_leftovers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config").join(SETTINGS_FILE_NAME);

        Settings::default().save(&path).unwrap();
        let mut settings = Settings::default();
        settings.user_name = "kees".to_string();
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap().user_name, "kees");
        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(SETTINGS_FILE_NAME)]);
    }

    #[test]
    fn test_load_or_init_writes_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE_NAME);

        let settings = Settings::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_remove_active_server_deactivates() {
        let mut settings = Settings::default();
        settings.remove_server("test").unwrap();
        assert!(settings.active_server.is_none());
        assert!(settings.active_server().is_err());
        assert!(settings.remove_server("test").is_err());
    }

    #[test]
    fn test_add_server_rejects_duplicates() {
        let mut settings = Settings::default();
        let result = settings.add_server(RemoteServer::new("test", "https://other"));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
user_name = "kees"
user_token = "abc"

[[servers]]
name = "p01"
url = "https://p01/api"
"#,
        )
        .unwrap();
        assert_eq!(settings.client.timeout_secs, 30);
        assert!(settings.active_server.is_none());
        assert!(settings.validate().is_ok());
    }
}
