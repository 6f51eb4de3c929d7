//! Job information as returned by the web API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Job status strings used by the API server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Active,
    Uploaded,
    Done,
    Error,
    Inactive,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "ACTIVE",
            JobStatus::Uploaded => "UPLOADED",
            JobStatus::Done => "DONE",
            JobStatus::Error => "ERROR",
            JobStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(JobStatus::Active),
            "UPLOADED" => Ok(JobStatus::Uploaded),
            "DONE" => Ok(JobStatus::Done),
            "ERROR" => Ok(JobStatus::Error),
            "INACTIVE" => Ok(JobStatus::Inactive),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

/// Info on a single job.
///
/// Core fields are always sent by the server; the `source_*` and
/// `destination_path` fields only come with extended queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobInfo {
    pub job_id: i64,
    pub date: String,
    pub user_name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "count_or_null")]
    pub files_downloaded: u64,
    #[serde(default, deserialize_with = "count_or_null")]
    pub files_processed: u64,

    #[serde(default)]
    pub destination_path: Option<String>,
    #[serde(default)]
    pub source_anonymizedpatientid: Option<String>,
    #[serde(default)]
    pub source_anonymizedpatientname: Option<String>,
    #[serde(default)]
    pub source_path: Option<String>,
    #[serde(default)]
    pub source_instance_id: Option<String>,
    #[serde(default)]
    pub source_pims_keyfile_id: Option<i64>,
}

impl JobInfo {
    /// Pseudonym actually used by the job, if the server reported one.
    pub fn pseudonym(&self) -> Option<&str> {
        fn non_blank(s: &Option<String>) -> Option<&str> {
            s.as_deref().filter(|s| !s.trim().is_empty())
        }
        non_blank(&self.source_anonymizedpatientname)
            .or_else(|| non_blank(&self.source_anonymizedpatientid))
    }

    /// Error message, ignoring the blank placeholder written on reset.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// Where a new job reads its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    /// UNC path of a folder or file selection file
    Path(String),
    /// Study in PACS, either a bare StudyInstanceUID or `accession_number:<value>`
    Pacs { instance_id: String },
}

/// A fully validated request to create one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub source: JobSource,
    pub destination_path: String,
    pub project_name: String,
    pub anonymized_name: String,
    pub anonymized_id: String,
    pub description: String,
    pub pims_keyfile_id: Option<String>,
}

impl JobRequest {
    /// Form fields of the `create_job` call.
    pub fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = match &self.source {
            JobSource::Path(path) => vec![
                ("source_type", "PATH".to_string()),
                ("source_path", path.clone()),
            ],
            JobSource::Pacs { instance_id } => vec![
                ("source_type", "WADO".to_string()),
                ("source_name", "IDC_WADO".to_string()),
                ("source_instance_id", instance_id.clone()),
            ],
        };
        form.extend([
            ("destination_type", "PATH".to_string()),
            ("destination_path", self.destination_path.clone()),
            ("project_name", self.project_name.clone()),
            ("anonymizedpatientname", self.anonymized_name.clone()),
            ("anonymizedpatientid", self.anonymized_id.clone()),
            ("description", self.description.clone()),
        ]);
        if let Some(key) = &self.pims_keyfile_id {
            form.push(("pims_keyfile_id", key.clone()));
        }
        form
    }

    /// Short label for log lines and errors.
    pub fn source_label(&self) -> &str {
        match &self.source {
            JobSource::Path(path) => path,
            JobSource::Pacs { instance_id } => instance_id,
        }
    }
}

/// The server sends `null` for jobs that never started downloading.
fn count_or_null<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}
