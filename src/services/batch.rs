// src/services/batch.rs

//! Actions on every job in a batch.

use std::fmt;

use crate::error::{ApiError, AppError, Result};
use crate::models::{JobBatch, JobStatus};
use crate::services::{JobApi, reconcile};

/// Single-job operation applied to many jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Cancel,
    Reset,
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchAction::Cancel => f.write_str("cancel"),
            BatchAction::Reset => f.write_str("reset"),
        }
    }
}

/// Per-job results of a batch action.
#[derive(Debug, Default)]
pub struct ActionOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, ApiError)>,
}

impl ActionOutcome {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Fails when any job failed, listing each failure.
    pub fn into_result(self, action: BatchAction) -> Result<Self> {
        if self.failed.is_empty() {
            return Ok(self);
        }
        let details = self
            .failed
            .iter()
            .map(|(id, e)| format!("job {id}: {e}"))
            .collect::<Vec<_>>()
            .join("\n");
        Err(AppError::BatchAction {
            action: action.to_string(),
            failed: self.failed.len(),
            total: self.total(),
            details,
        })
    }
}

/// Apply `action` to each job. Every job is tried; failures are collected.
pub async fn apply(api: &dyn JobApi, job_ids: &[String], action: BatchAction) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    for job_id in job_ids {
        let result = match action {
            BatchAction::Cancel => api.cancel_job(job_id).await,
            BatchAction::Reset => api.reset_job(job_id).await,
        };
        match result {
            Ok(()) => outcome.succeeded.push(job_id.clone()),
            Err(e) => {
                log::warn!("Could not {action} job {job_id}: {e}");
                outcome.failed.push((job_id.clone(), e));
            }
        }
    }
    outcome
}

/// Cancel every job in the batch.
pub async fn cancel_batch(api: &dyn JobApi, batch: &JobBatch) -> Result<ActionOutcome> {
    apply(api, &batch.job_ids, BatchAction::Cancel)
        .await
        .into_result(BatchAction::Cancel)
}

/// Reset every job in the batch.
pub async fn reset_batch(api: &dyn JobApi, batch: &JobBatch) -> Result<ActionOutcome> {
    apply(api, &batch.job_ids, BatchAction::Reset)
        .await
        .into_result(BatchAction::Reset)
}

/// Jobs in the batch that currently have status ERROR.
pub async fn error_job_ids(api: &dyn JobApi, batch: &JobBatch) -> Vec<String> {
    let table = reconcile(api, batch, false).await;
    if table.failures() > 0 {
        log::warn!(
            "Status of {} jobs is unknown; they are not reset",
            table.failures()
        );
    }
    table.ids_with_status(JobStatus::Error)
}

/// Reset only the jobs in the batch that have status ERROR.
///
/// Statuses are looked up at call time, so a job that left ERROR after an
/// earlier `error_job_ids` is not reset.
pub async fn reset_errors(api: &dyn JobApi, batch: &JobBatch) -> Result<ActionOutcome> {
    let ids = error_job_ids(api, batch).await;
    apply(api, &ids, BatchAction::Reset)
        .await
        .into_result(BatchAction::Reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RemoteServer;
    use crate::services::mock::MockApi;

    fn batch(ids: &[&str]) -> JobBatch {
        let mut batch = JobBatch::new(RemoteServer::new("test", "https://hostname_of_api"));
        batch.add(ids).unwrap();
        batch
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let api = MockApi::new()
            .with_job(1, JobStatus::Active)
            .with_job(2, JobStatus::Done);

        let outcome = cancel_batch(&api, &batch(&["1", "2"])).await.unwrap();
        assert_eq!(outcome.succeeded, vec!["1", "2"]);
        assert_eq!(api.status_of(1), Some(JobStatus::Inactive));
        assert_eq!(api.status_of(2), Some(JobStatus::Inactive));
    }

    #[tokio::test]
    async fn test_failures_collected_after_trying_all() {
        let api = MockApi::new()
            .with_job(1, JobStatus::Error)
            .with_job(2, JobStatus::Error)
            .with_job(3, JobStatus::Error)
            .failing_action("2");

        let err = reset_batch(&api, &batch(&["1-3"])).await.unwrap_err();
        assert!(matches!(err, AppError::BatchAction { failed: 1, total: 3, .. }));
        assert!(err.to_string().contains("job 2: API returns errors: job 2 is locked"));
        assert_eq!(api.status_of(1), Some(JobStatus::Active));
        assert_eq!(api.status_of(3), Some(JobStatus::Active));
    }

    #[tokio::test]
    async fn test_reset_errors_only() {
        let api = MockApi::new()
            .with_job(1, JobStatus::Error)
            .with_job(2, JobStatus::Done)
            .with_job(3, JobStatus::Error)
            .failing_lookup("4");

        let outcome = reset_errors(&api, &batch(&["1-4"])).await.unwrap();
        assert_eq!(outcome.succeeded, vec!["1", "3"]);
        assert_eq!(api.status_of(2), Some(JobStatus::Done));
    }

    #[tokio::test]
    async fn test_unknown_job_is_rejected() {
        let api = MockApi::new();
        let outcome = apply(&api, &["99".to_string()], BatchAction::Cancel).await;
        assert_eq!(outcome.failed.len(), 1);
        assert!(outcome.failed[0].1.to_string().contains("99 not found"));
    }
}
