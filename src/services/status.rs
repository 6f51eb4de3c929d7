// src/services/status.rs

//! Status of every job in a batch.
//!
//! One lookup per job ID, in batch order. A lookup that fails becomes an
//! UNKNOWN row holding the error; the other lookups carry on.

use comfy_table::Table;

use crate::error::ApiError;
use crate::models::{JobBatch, JobInfo, JobStatus};
use crate::services::JobApi;
use crate::utils::table;

const UNKNOWN: &str = "UNKNOWN";

/// Status of one job, or the reason it could not be looked up.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub job_id: String,
    pub lookup: Result<JobInfo, ApiError>,
}

impl StatusRow {
    pub fn status(&self) -> Option<JobStatus> {
        self.lookup.as_ref().ok().map(|info| info.status)
    }

    /// Status name, `UNKNOWN` for failed lookups.
    pub fn status_label(&self) -> &'static str {
        self.status().map(|s| s.as_str()).unwrap_or(UNKNOWN)
    }

    /// Job error, or the lookup error for failed lookups.
    pub fn error(&self) -> Option<String> {
        match &self.lookup {
            Ok(info) => info.error_message().map(str::to_string),
            Err(e) => Some(e.to_string()),
        }
    }
}

/// Number of jobs with one status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCount {
    pub status: &'static str,
    pub count: usize,
    pub percentage: f64,
}

/// Outcome of looking up every job in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTable {
    pub rows: Vec<StatusRow>,
    pub extended: bool,
}

impl StatusTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.rows.iter().filter(|r| r.lookup.is_err()).count()
    }

    /// IDs of jobs that have the given status.
    pub fn ids_with_status(&self, status: JobStatus) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.status() == Some(status))
            .map(|r| r.job_id.clone())
            .collect()
    }

    /// Count and share per status, in a fixed status order.
    pub fn summary(&self) -> Vec<StatusCount> {
        let total = self.rows.len();
        let labels = [
            JobStatus::Active,
            JobStatus::Uploaded,
            JobStatus::Done,
            JobStatus::Error,
            JobStatus::Inactive,
        ]
        .map(|s| s.as_str());

        labels
            .into_iter()
            .chain([UNKNOWN])
            .filter_map(|label| {
                let count = self
                    .rows
                    .iter()
                    .filter(|r| r.status_label() == label)
                    .count();
                (count > 0).then(|| StatusCount {
                    status: label,
                    count,
                    percentage: count as f64 * 100.0 / total as f64,
                })
            })
            .collect()
    }

    /// One line per job.
    pub fn render(&self) -> Table {
        let mut headers = vec!["job_id", "status", "downloaded", "processed", "user"];
        if self.extended {
            headers.push("pseudonym");
        }
        headers.push("error");

        let mut out = table::create_table(&headers);
        for row in &self.rows {
            let mut cells = vec![row.job_id.clone(), row.status_label().to_string()];
            match &row.lookup {
                Ok(info) => cells.extend([
                    info.files_downloaded.to_string(),
                    info.files_processed.to_string(),
                    info.user_name.clone(),
                ]),
                Err(_) => cells.extend([String::new(), String::new(), String::new()]),
            }
            if self.extended {
                let pseudonym = row.lookup.as_ref().ok().and_then(JobInfo::pseudonym);
                cells.push(pseudonym.unwrap_or_default().to_string());
            }
            cells.push(row.error().unwrap_or_default());
            out.add_row(cells);
        }
        out
    }

    /// Count and percentage per status.
    pub fn render_summary(&self) -> Table {
        let mut out = table::create_table(&["status", "count", "percentage"]);
        for count in self.summary() {
            out.add_row(vec![
                count.status.to_string(),
                count.count.to_string(),
                format!("{:.1}%", count.percentage),
            ]);
        }
        out
    }
}

/// Look up every job in `batch`, keeping failed lookups as UNKNOWN rows.
pub async fn reconcile(api: &dyn JobApi, batch: &JobBatch, extended: bool) -> StatusTable {
    let mut rows = Vec::with_capacity(batch.len());
    for job_id in &batch.job_ids {
        let lookup = api.get_job(job_id).await;
        if let Err(e) = &lookup {
            log::warn!("Could not get status of job {job_id}: {e}");
        }
        rows.push(StatusRow {
            job_id: job_id.clone(),
            lookup,
        });
    }

    let table = StatusTable { rows, extended };
    log::debug!(
        "Looked up {} jobs on {}, {} failed",
        table.len(),
        api.server().name,
        table.failures()
    );
    table
}
