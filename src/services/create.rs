// src/services/create.rs

//! Creating jobs from a mapping.

use crate::error::{AppError, Result};
use crate::mapping::Mapping;
use crate::models::{JobBatch, JobDefaults, JobRequest, RemoteServer};
use crate::services::JobApi;
use crate::storage::BatchStore;

/// What a create run did.
#[derive(Debug, Clone, Default)]
pub struct CreateOutcome {
    /// One validated request per mapping row
    pub requests: Vec<JobRequest>,
    /// IDs the server returned, in mapping order
    pub created_ids: Vec<String>,
    /// Whether the created IDs were written to the folder's batch
    pub recorded: bool,
}

/// Validate every row of `mapping` into a job request.
///
/// Nothing is sent when any row is invalid.
pub fn validate_mapping(mapping: &Mapping, defaults: &JobDefaults) -> Result<Vec<JobRequest>> {
    mapping
        .job_parameters(defaults)
        .iter()
        .enumerate()
        .map(|(i, params)| {
            params.validate().map_err(|e| {
                let message = match e {
                    AppError::Validation(message) => message,
                    other => other.to_string(),
                };
                AppError::validation(format!("mapping row {}: {message}", i + 1))
            })
        })
        .collect()
}

/// Create one job per mapping row and add the new IDs to the folder's batch.
///
/// The batch is read before anything is sent. Creation stops at the first
/// failed call; IDs created before that are still recorded, then the failure
/// is returned.
pub async fn create_from_mapping(
    api: &dyn JobApi,
    store: &dyn BatchStore,
    mapping: &Mapping,
    defaults: &JobDefaults,
    dry_run: bool,
) -> Result<CreateOutcome> {
    let requests = validate_mapping(mapping, defaults)?;
    let target = batch_for(api.server(), store).await?;
    let mut outcome = CreateOutcome {
        requests,
        ..CreateOutcome::default()
    };

    if dry_run {
        for request in &outcome.requests {
            log::info!(
                "Dry run: would create job for {} as {}",
                request.source_label(),
                request.anonymized_name
            );
        }
        return Ok(outcome);
    }

    let mut failure = None;
    for request in &outcome.requests {
        match api.create_job(request).await {
            Ok(job_id) => {
                log::info!("Created job {job_id} for {}", request.source_label());
                outcome.created_ids.push(job_id);
            }
            Err(e) => {
                failure = Some(AppError::job_creation(request.source_label(), e));
                break;
            }
        }
    }

    if let Some(mut batch) = target {
        if !outcome.created_ids.is_empty() {
            let added = batch.add_ids(outcome.created_ids.iter().cloned());
            store
                .save(&batch)
                .await
                .map_err(|e| AppError::not_recorded(&outcome.created_ids, e))?;
            log::info!("Added {} jobs to batch", added.len());
            outcome.recorded = true;
        }
    }

    match failure {
        Some(e) => {
            log::error!(
                "Stopped after creating {} of {} jobs: {:?}",
                outcome.created_ids.len(),
                outcome.requests.len(),
                outcome.created_ids
            );
            Err(e)
        }
        None => Ok(outcome),
    }
}

/// The batch new jobs on `server` should go into.
///
/// Starts a new batch when the folder has none. Returns `None`, with a
/// warning, when the existing batch belongs to another server. A batch file
/// that cannot be read is an error.
pub async fn batch_for(server: &RemoteServer, store: &dyn BatchStore) -> Result<Option<JobBatch>> {
    if !store.has_batch().await {
        return Ok(Some(JobBatch::new(server.clone())));
    }
    let batch = store.load().await?;
    if batch.server.url != server.url {
        log::warn!(
            "Batch is for server {} but jobs will be created on {}. New jobs are not added to the batch",
            batch.server,
            server
        );
        return Ok(None);
    }
    Ok(Some(batch))
}
