//! `anon job ...`: single jobs on the active server.

use crate::commands::Confirm;
use crate::commands::server::job_table;
use crate::error::{AppError, Result};
use crate::models::{JobInfo, expand_job_ids};
use crate::services::JobApi;
use crate::utils::table;

/// Everything the server knows about one job.
pub async fn info(api: &dyn JobApi, job_id: &str) -> Result<String> {
    let job = api.get_job(job_id).await?;
    Ok(format!(
        "Job {} on {}:\n{}",
        job.job_id,
        api.server().name,
        describe(&job)
    ))
}

/// Extended info for several jobs. Accepts ranges like `5-7`.
pub async fn list(api: &dyn JobApi, tokens: &[String]) -> Result<String> {
    let ids = expand_job_ids(tokens)?;
    if ids.is_empty() {
        return Err(AppError::validation("No job IDs given"));
    }
    let jobs = api.get_jobs_extended(&ids).await?;
    let missing: Vec<&String> = ids
        .iter()
        .filter(|id| !jobs.iter().any(|j| j.job_id.to_string() == **id))
        .collect();

    let mut text = job_table(&jobs).to_string();
    if !missing.is_empty() {
        text.push_str(&format!("\nNot found: {missing:?}"));
    }
    Ok(text)
}

pub async fn cancel(api: &dyn JobApi, job_id: &str, confirm: &dyn Confirm) -> Result<String> {
    if !confirm.confirm(&format!("Cancel job {job_id} on {}?", api.server().name))? {
        return Ok("Cancelled nothing".to_string());
    }
    api.cancel_job(job_id).await?;
    Ok(format!("Cancelled job {job_id} on {}", api.server().name))
}

pub async fn reset(api: &dyn JobApi, job_id: &str, confirm: &dyn Confirm) -> Result<String> {
    if !confirm.confirm(&format!("Reset job {job_id} on {}?", api.server().name))? {
        return Ok("Reset nothing".to_string());
    }
    api.reset_job(job_id).await?;
    Ok(format!("Reset job {job_id} on {}", api.server().name))
}

fn describe(job: &JobInfo) -> String {
    let optional = |v: &Option<String>| v.clone().unwrap_or_default();
    let rows = [
        ("status", job.status.to_string()),
        ("error", job.error_message().unwrap_or_default().to_string()),
        ("date", job.date.clone()),
        ("user", job.user_name.clone()),
        ("project", optional(&job.project_name)),
        ("description", optional(&job.description)),
        ("priority", job.priority.map(|p| p.to_string()).unwrap_or_default()),
        ("files downloaded", job.files_downloaded.to_string()),
        ("files processed", job.files_processed.to_string()),
        ("source", optional(&job.source_path) + &optional(&job.source_instance_id)),
        ("destination", optional(&job.destination_path)),
        ("pseudonym", job.pseudonym().unwrap_or_default().to_string()),
    ];
    table::key_value_table(&rows).to_string()
}
