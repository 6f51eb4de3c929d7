//! A batch: job IDs tracked together for one server.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};
use crate::models::RemoteServer;

/// Largest number of IDs a single range token may expand to.
pub const MAX_RANGE_SPAN: u64 = 10_000;

/// Job IDs created on one server, kept in insertion order without duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobBatch {
    #[serde(default, deserialize_with = "ids_as_strings")]
    pub job_ids: Vec<String>,
    pub server: RemoteServer,
}

impl JobBatch {
    /// Create an empty batch for the given server.
    pub fn new(server: RemoteServer) -> Self {
        Self {
            job_ids: Vec::new(),
            server,
        }
    }

    /// Add IDs and ranges like `"5-7"`. Returns the IDs that were new.
    pub fn add<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<Vec<String>> {
        let ids = expand_job_ids(tokens)?;
        Ok(self.add_ids(ids))
    }

    /// Remove IDs and ranges like `"5-7"`. Returns the IDs that were present.
    pub fn remove<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<Vec<String>> {
        let ids: HashSet<String> = expand_job_ids(tokens)?.into_iter().collect();
        let removed: Vec<String> = self
            .job_ids
            .iter()
            .filter(|id| ids.contains(*id))
            .cloned()
            .collect();
        self.job_ids.retain(|id| !ids.contains(id));
        Ok(removed)
    }

    /// Append already-validated IDs, skipping ones already present.
    pub fn add_ids(&mut self, ids: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut seen: HashSet<String> = self.job_ids.iter().cloned().collect();
        let mut added = Vec::new();
        for id in ids {
            if seen.insert(id.clone()) {
                self.job_ids.push(id.clone());
                added.push(id);
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.job_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.job_ids.is_empty()
    }
}

/// Hand-edited batch files may list IDs as plain numbers.
fn ids_as_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    let ids = Vec::<Id>::deserialize(deserializer)?;
    Ok(ids
        .into_iter()
        .map(|id| match id {
            Id::Number(n) => n.to_string(),
            Id::Text(s) => s,
        })
        .collect())
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)-(\d+)$").expect("valid range regex"))
}

/// Expand job ID tokens into single IDs.
///
/// `"12"` gives one ID, `"5-7"` gives `5, 6, 7`. Anything else is rejected.
pub fn expand_job_ids<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for token in tokens {
        let token = token.as_ref().trim();
        if let Some(caps) = range_pattern().captures(token) {
            let start = parse_id(&caps[1], token)?;
            let end = parse_id(&caps[2], token)?;
            if start > end {
                return Err(AppError::validation(format!(
                    "'{token}' is a reversed range. Did you mean {end}-{start}?"
                )));
            }
            if end - start >= MAX_RANGE_SPAN {
                return Err(AppError::validation(format!(
                    "'{token}' spans more than {MAX_RANGE_SPAN} job IDs"
                )));
            }
            ids.extend((start..=end).map(|id| id.to_string()));
        } else if token.contains('-') {
            return Err(AppError::validation(format!(
                "'{token}' looks like a range (with a '-'), but cannot be expanded"
            )));
        } else {
            ids.push(parse_id(token, token)?.to_string());
        }
    }
    Ok(ids)
}

fn parse_id(value: &str, token: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| AppError::validation(format!("'{token}' is not a job ID")))
}
