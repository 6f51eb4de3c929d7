//! Per-row job parameters and their validation.

use crate::error::{AppError, Result};
use crate::models::{JobRequest, JobSource};
use crate::utils::path::{is_relative_path, is_unc_path, join_windows};

use super::SourceIdentifier;

/// Everything known about one job before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParameters {
    pub source: SourceIdentifier,
    pub patient_id: String,
    pub patient_name: String,
    pub description: String,
    pub project: Option<String>,
    pub destination_path: Option<String>,
    pub root_source_path: Option<String>,
    pub pims_key: Option<String>,
}

impl JobParameters {
    /// Check the parameters and turn them into a request the server accepts.
    pub fn validate(&self) -> Result<JobRequest> {
        let fail = |message: String| AppError::validation(format!("{}: {message}", self.source));

        let project_name = self.project.clone().ok_or_else(|| {
            fail("no project given. Set 'project' in the mapping options or a default project".into())
        })?;

        let destination_path = self.destination_path.clone().ok_or_else(|| {
            fail("no destination given. Set 'destination_path' in the mapping options or a default destination".into())
        })?;
        if !is_unc_path(&destination_path) {
            return Err(fail(format!(
                "destination '{destination_path}' is not a UNC path like \\\\server\\share\\folder"
            )));
        }

        let source = if self.source.is_path() {
            JobSource::Path(self.absolute_source_path().map_err(fail)?)
        } else {
            JobSource::Pacs {
                instance_id: self.source.instance_id(),
            }
        };

        let (anonymized_id, anonymized_name) =
            match (self.patient_id.trim(), self.patient_name.trim()) {
                ("", "") => return Err(fail("no patient_id or patient_name given".into())),
                ("", name) => (name.to_string(), name.to_string()),
                (id, "") => (id.to_string(), id.to_string()),
                (id, name) => (id.to_string(), name.to_string()),
            };

        Ok(JobRequest {
            source,
            destination_path,
            project_name,
            anonymized_name,
            anonymized_id,
            description: self.description.clone(),
            pims_keyfile_id: self.pims_key.clone(),
        })
    }

    fn absolute_source_path(&self) -> std::result::Result<String, String> {
        let value = self.source.value();
        let path = if is_relative_path(value) {
            let root = self.root_source_path.as_deref().ok_or_else(|| {
                format!("'{value}' is a relative path but no 'root_source_path' option is set")
            })?;
            join_windows(root, value)
        } else {
            value.to_string()
        };
        if !is_unc_path(&path) {
            return Err(format!(
                "source path '{path}' is not a UNC path like \\\\server\\share\\folder"
            ));
        }
        Ok(path)
    }
}
