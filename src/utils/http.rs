// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::ClientConfig;

/// Create a configured asynchronous HTTP client.
///
/// Every request is bounded by the configured timeout; a server that does not
/// answer surfaces as a connection error instead of hanging.
pub fn create_async_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(!config.validate_https)
        .build()
        .map_err(|e| AppError::settings(format!("Cannot build HTTP client: {e}")))?;
    Ok(client)
}
