//! Integration tests for the mapping -> jobs -> batch workflow of one folder.

use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use anonapi::error::{ApiError, ApiResult, AppError};
use anonapi::mapping::Mapping;
use anonapi::models::{JobDefaults, JobInfo, JobRequest, JobSource, RemoteServer};
use anonapi::services::{self, JobApi};
use anonapi::storage::{BatchFolder, BatchStore, MappingFolder};

const MAPPING: &str = "\
## Description ##
Two studies from PACS
## Options ##
project,Wetenschap-Algemeen
destination_path,\\\\server\\share\\output
## Mapping ##
source,patient_id,patient_name,description
accession_number:123.456,001,Patient1,first
study_instance_uid:9.9,002,Patient2,second
";

/// Server that only counts and answers create calls.
struct RecordingApi {
    server: RemoteServer,
    created: Mutex<Vec<JobRequest>>,
}

impl RecordingApi {
    fn new() -> Self {
        Self {
            server: RemoteServer::new("p01", "https://anon.example.org/sandbox"),
            created: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl JobApi for RecordingApi {
    fn server(&self) -> &RemoteServer {
        &self.server
    }

    async fn server_status(&self) -> ApiResult<()> {
        Ok(())
    }

    async fn get_job(&self, job_id: &str) -> ApiResult<JobInfo> {
        Err(ApiError::Rejected {
            message: format!("{job_id} not found"),
        })
    }

    async fn get_jobs_extended(&self, _job_ids: &[String]) -> ApiResult<Vec<JobInfo>> {
        Ok(Vec::new())
    }

    async fn get_jobs(&self, _limit: usize) -> ApiResult<Vec<JobInfo>> {
        Ok(Vec::new())
    }

    async fn cancel_job(&self, _job_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn reset_job(&self, _job_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn create_job(&self, request: &JobRequest) -> ApiResult<String> {
        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        Ok((500 + created.len()).to_string())
    }
}

/// Creating from a saved mapping makes one job per row and starts a batch
#[tokio::test]
async fn test_create_from_saved_mapping_fills_new_batch() {
    let dir = TempDir::new().unwrap();
    let mapping_folder = MappingFolder::new(dir.path());
    let batch_folder = BatchFolder::new(dir.path());

    mapping_folder
        .save(&Mapping::parse(MAPPING).unwrap())
        .await
        .unwrap();
    assert!(!batch_folder.has_batch().await);

    let api = RecordingApi::new();
    let mapping = mapping_folder.load().await.unwrap();
    let outcome = services::create_from_mapping(
        &api,
        &batch_folder,
        &mapping,
        &JobDefaults::default(),
        false,
    )
    .await
    .unwrap();

    assert_eq!(outcome.created_ids, vec!["501", "502"]);
    assert!(outcome.recorded);

    let created = api.created.lock().unwrap().clone();
    assert_eq!(created.len(), 2);
    assert_eq!(
        created[0].source,
        JobSource::Pacs {
            instance_id: "accession_number:123.456".to_string()
        }
    );
    assert_eq!(created[1].anonymized_name, "Patient2");
    assert!(created.iter().all(|r| r.project_name == "Wetenschap-Algemeen"));

    let batch = batch_folder.load().await.unwrap();
    assert_eq!(batch.server, api.server);
    assert_eq!(batch.job_ids, vec!["501", "502"]);
}

/// A dry run sends nothing and writes no batch
#[tokio::test]
async fn test_dry_run_leaves_folder_alone() {
    let dir = TempDir::new().unwrap();
    let batch_folder = BatchFolder::new(dir.path());
    let api = RecordingApi::new();

    let mapping = Mapping::parse(MAPPING).unwrap();
    let outcome = services::create_from_mapping(
        &api,
        &batch_folder,
        &mapping,
        &JobDefaults::default(),
        true,
    )
    .await
    .unwrap();

    assert_eq!(outcome.requests.len(), 2);
    assert!(outcome.created_ids.is_empty());
    assert!(api.created.lock().unwrap().is_empty());
    assert!(!batch_folder.has_batch().await);
}

/// Initializing over an existing batch fails and keeps the file as it was
#[tokio::test]
async fn test_init_over_existing_batch_keeps_file() {
    let dir = TempDir::new().unwrap();
    let batch_folder = BatchFolder::new(dir.path());
    let server = RemoteServer::new("p01", "https://anon.example.org/sandbox");

    let mut batch = batch_folder.init(server.clone(), false).await.unwrap();
    batch.add(&["12", "14-15"]).unwrap();
    batch_folder.save(&batch).await.unwrap();
    let before = std::fs::read(batch_folder.batch_path()).unwrap();

    let other = RemoteServer::new("p02", "https://other.example.org");
    let err = batch_folder.init(other, false).await.unwrap_err();
    assert!(matches!(err, AppError::BatchExists(_)));

    let after = std::fs::read(batch_folder.batch_path()).unwrap();
    assert_eq!(before, after);
    assert_eq!(
        batch_folder.load().await.unwrap().job_ids,
        vec!["12", "14", "15"]
    );
}
