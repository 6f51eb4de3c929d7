//! In-memory `JobApi` for service tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::models::{JobInfo, JobRequest, JobStatus, RemoteServer};
use crate::services::JobApi;

pub struct MockApi {
    server: RemoteServer,
    jobs: Mutex<BTreeMap<i64, JobInfo>>,
    failing_lookups: HashSet<String>,
    failing_actions: HashSet<String>,
    failing_create: Option<usize>,
    lookups: Mutex<Vec<String>>,
    created: Mutex<Vec<JobRequest>>,
    next_id: Mutex<i64>,
}

pub fn job(job_id: i64, status: JobStatus) -> JobInfo {
    JobInfo {
        job_id,
        date: "2020-01-01T00:00:00".to_string(),
        user_name: "tester".to_string(),
        status,
        error: (status == JobStatus::Error).then(|| "something broke".to_string()),
        description: None,
        project_name: Some("Wetenschap-Algemeen".to_string()),
        priority: None,
        files_downloaded: 3,
        files_processed: 2,
        destination_path: None,
        source_anonymizedpatientid: Some(format!("{job_id:03}")),
        source_anonymizedpatientname: Some(format!("Patient{job_id}")),
        source_path: None,
        source_instance_id: None,
        source_pims_keyfile_id: None,
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            server: RemoteServer::new("test", "https://hostname_of_api"),
            jobs: Mutex::new(BTreeMap::new()),
            failing_lookups: HashSet::new(),
            failing_actions: HashSet::new(),
            failing_create: None,
            lookups: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            next_id: Mutex::new(1000),
        }
    }

    pub fn with_job(self, job_id: i64, status: JobStatus) -> Self {
        self.jobs.lock().unwrap().insert(job_id, job(job_id, status));
        self
    }

    /// `get_job` for this ID fails with a connection error.
    pub fn failing_lookup(mut self, job_id: &str) -> Self {
        self.failing_lookups.insert(job_id.to_string());
        self
    }

    /// Cancel and reset for this ID are rejected.
    pub fn failing_action(mut self, job_id: &str) -> Self {
        self.failing_actions.insert(job_id.to_string());
        self
    }

    /// The create call with this 0-based index is rejected.
    pub fn failing_create(mut self, index: usize) -> Self {
        self.failing_create = Some(index);
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<JobRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn status_of(&self, job_id: i64) -> Option<JobStatus> {
        self.jobs.lock().unwrap().get(&job_id).map(|j| j.status)
    }

    fn find(&self, job_id: &str) -> ApiResult<i64> {
        let id = job_id.parse::<i64>().ok();
        match id {
            Some(id) if self.jobs.lock().unwrap().contains_key(&id) => Ok(id),
            _ => Err(ApiError::Rejected {
                message: format!(r#"{{"errors": {{"job_id": "{job_id} not found"}}}}"#),
            }),
        }
    }

    fn check_action(&self, job_id: &str) -> ApiResult<i64> {
        if self.failing_actions.contains(job_id) {
            return Err(ApiError::Rejected {
                message: format!("job {job_id} is locked"),
            });
        }
        self.find(job_id)
    }

    fn set_status(&self, id: i64, status: JobStatus) {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
            job.status = status;
            if status == JobStatus::Active {
                job.error = Some(" ".to_string());
                job.files_downloaded = 0;
                job.files_processed = 0;
            }
        }
    }
}

#[async_trait]
impl JobApi for MockApi {
    fn server(&self) -> &RemoteServer {
        &self.server
    }

    async fn server_status(&self) -> ApiResult<()> {
        Ok(())
    }

    async fn get_job(&self, job_id: &str) -> ApiResult<JobInfo> {
        self.lookups.lock().unwrap().push(job_id.to_string());
        if self.failing_lookups.contains(job_id) {
            return Err(ApiError::connection(&self.server.url, "connection refused"));
        }
        let id = self.find(job_id)?;
        let jobs = self.jobs.lock().unwrap();
        jobs.get(&id)
            .cloned()
            .ok_or_else(|| ApiError::invalid_response(&self.server.url, "vanished"))
    }

    async fn get_jobs_extended(&self, job_ids: &[String]) -> ApiResult<Vec<JobInfo>> {
        let jobs = self.jobs.lock().unwrap();
        Ok(job_ids
            .iter()
            .filter_map(|id| id.parse::<i64>().ok())
            .filter_map(|id| jobs.get(&id).cloned())
            .collect())
    }

    async fn get_jobs(&self, limit: usize) -> ApiResult<Vec<JobInfo>> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs.values().rev().take(limit).cloned().collect())
    }

    async fn cancel_job(&self, job_id: &str) -> ApiResult<()> {
        let id = self.check_action(job_id)?;
        self.set_status(id, JobStatus::Inactive);
        Ok(())
    }

    async fn reset_job(&self, job_id: &str) -> ApiResult<()> {
        let id = self.check_action(job_id)?;
        self.set_status(id, JobStatus::Active);
        Ok(())
    }

    async fn create_job(&self, request: &JobRequest) -> ApiResult<String> {
        let index = self.created.lock().unwrap().len();
        if self.failing_create == Some(index) {
            return Err(ApiError::Rejected {
                message: r#"{"errors": {"project_name": "unknown project"}}"#.to_string(),
            });
        }
        self.created.lock().unwrap().push(request.clone());

        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        self.jobs
            .lock()
            .unwrap()
            .insert(id, job(id, JobStatus::Active));
        Ok(id.to_string())
    }
}
