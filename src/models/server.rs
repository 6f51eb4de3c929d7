//! Remote anonymization server entry.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// An anonymization server reachable through the web API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteServer {
    /// Short keyword identifying the server (e.g., "p01")
    pub name: String,

    /// Base URL of the web API
    pub url: String,
}

impl RemoteServer {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// URL of a named API function on this server.
    ///
    /// An empty function name gives the API root, which answers with the
    /// API documentation.
    pub fn endpoint(&self, function: &str) -> Result<Url> {
        let base = if self.url.ends_with('/') {
            Url::parse(&self.url)?
        } else {
            Url::parse(&format!("{}/", self.url))?
        };
        Ok(base.join(function)?)
    }
}

impl fmt::Display for RemoteServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.url)
    }
}
