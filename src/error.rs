// src/error.rs

//! Unified error handling for the anonymization client.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result of a single remote API call.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML state file could not be read or written
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Remote API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Mapping file could not be parsed
    #[error(transparent)]
    MappingParse(#[from] MappingParseError),

    /// No batch file in the given folder
    #[error("No batch defined in {}", .0.display())]
    NoBatch(PathBuf),

    /// A batch file already exists in the given folder
    #[error("Cannot init: a batch already exists in {}", .0.display())]
    BatchExists(PathBuf),

    /// No mapping file in the given folder
    #[error("No mapping defined in {}", .0.display())]
    NoMapping(PathBuf),

    /// No file selection in the given folder
    #[error("No file selection defined in {}", .0.display())]
    NoSelection(PathBuf),

    /// Settings error
    #[error("Settings error: {0}")]
    Settings(String),

    /// Input validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A batch-wide action failed for some jobs
    #[error("Could not {action} {failed} of {total} jobs:\n{details}")]
    BatchAction {
        action: String,
        failed: usize,
        total: usize,
        details: String,
    },

    /// Jobs were created but could not be added to the batch
    #[error("Created jobs {job_ids} but could not add them to the batch: {message}")]
    NotRecorded { job_ids: String, message: String },

    /// Job creation stopped after a remote failure
    #[error("Error creating job for source {source_id}: {message}")]
    JobCreation { source_id: String, message: String },
}

impl AppError {
    /// Create a settings error.
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Created jobs that are missing from the batch.
    pub fn not_recorded(job_ids: &[String], message: impl fmt::Display) -> Self {
        Self::NotRecorded {
            job_ids: job_ids.join(", "),
            message: message.to_string(),
        }
    }

    /// Create a job creation error for the given source.
    pub fn job_creation(source_id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::JobCreation {
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }
}

/// Failure of a single remote API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Server could not be reached, or the request timed out
    #[error("Could not connect to {url}: {message}")]
    Connection { url: String, message: String },

    /// 401 or 403
    #[error("Server '{url}' returned {status} - your credentials do not seem to work")]
    Unauthorized { url: String, status: u16 },

    /// 404
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// 400, with the server's message passed through
    #[error("API returns errors: {message}")]
    Rejected { message: String },

    /// 5xx or any other unexpected status
    #[error("Unexpected response from {url}: code {status}, {message}")]
    Server {
        url: String,
        status: u16,
        message: String,
    },

    /// Response body was not what the endpoint promises
    #[error("Could not parse response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl ApiError {
    /// Build a connection error from a transport failure.
    pub fn connection(url: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Connection {
            url: url.into(),
            message: err.to_string(),
        }
    }

    /// Build an invalid-response error.
    pub fn invalid_response(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

/// A mapping file that could not be parsed, with the 1-based line at fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Mapping line {line}: {message}")]
pub struct MappingParseError {
    pub line: usize,
    pub message: String,
}

impl MappingParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_error_mentions_line() {
        let err = MappingParseError::new(7, "unknown option 'projct'");
        assert_eq!(err.to_string(), "Mapping line 7: unknown option 'projct'");
    }

    #[test]
    fn api_error_converts_into_app_error() {
        let err: AppError = ApiError::Rejected {
            message: "job_id missing".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Api(ApiError::Rejected { .. })));
        assert_eq!(err.to_string(), "API returns errors: job_id missing");
    }
}
