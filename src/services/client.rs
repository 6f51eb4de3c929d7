// src/services/client.rs

//! Web API client for the anonymization server.
//!
//! Every call is a single HTTPS request to a named function below the server
//! URL, carrying `user_name` and an `Authorization: Token <token>` header.
//! Responses are JSON. There is no retry; a failed call is reported once.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::error::{ApiError, ApiResult, Result};
use crate::models::{ClientConfig, JobInfo, JobRequest, RemoteServer, Settings};
use crate::utils::http::create_async_client;

/// Remote job operations on one server.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// The server this API talks to.
    fn server(&self) -> &RemoteServer;

    /// Succeeds when the server answers like an anonymization API.
    async fn server_status(&self) -> ApiResult<()>;

    /// Core info on one job.
    async fn get_job(&self, job_id: &str) -> ApiResult<JobInfo>;

    /// Extended info, including source and destination, for several jobs.
    ///
    /// Jobs the server does not know are left out.
    async fn get_jobs_extended(&self, job_ids: &[String]) -> ApiResult<Vec<JobInfo>>;

    /// Most recent jobs, newest first.
    async fn get_jobs(&self, limit: usize) -> ApiResult<Vec<JobInfo>>;

    /// Stop a job. The server marks it INACTIVE.
    async fn cancel_job(&self, job_id: &str) -> ApiResult<()>;

    /// Set a job back to ACTIVE with counters and error cleared.
    async fn reset_job(&self, job_id: &str) -> ApiResult<()>;

    /// Create a job and return its ID.
    async fn create_job(&self, request: &JobRequest) -> ApiResult<String>;
}

/// `JobApi` over HTTPS.
pub struct WebApiClient {
    client: Client,
    server: RemoteServer,
    user_name: String,
    token: String,
}

impl WebApiClient {
    /// Create a client for `server` with the given credentials.
    pub fn new(
        server: RemoteServer,
        user_name: impl Into<String>,
        token: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            server,
            user_name: user_name.into(),
            token: token.into(),
        })
    }

    /// Create a client for a server using the credentials in settings.
    pub fn for_server(settings: &Settings, server: &RemoteServer) -> Result<Self> {
        Self::new(
            server.clone(),
            &settings.user_name,
            &settings.user_token,
            &settings.client,
        )
    }

    fn url(&self, function: &str) -> ApiResult<String> {
        self.server
            .endpoint(function)
            .map(|u| u.to_string())
            .map_err(|e| ApiError::connection(&self.server.url, e))
    }

    fn with_user(&self, params: &[(&str, String)]) -> Vec<(String, String)> {
        let mut all: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        if !params.iter().any(|(k, _)| *k == "user_name") {
            all.push(("user_name".to_string(), self.user_name.clone()));
        }
        all
    }

    async fn get(&self, function: &str, params: &[(&str, String)]) -> ApiResult<Value> {
        let url = self.url(function)?;
        log::debug!("GET {url}");
        let request = self
            .client
            .get(&url)
            .query(&self.with_user(params))
            .header(AUTHORIZATION, format!("Token {}", self.token));
        self.send(&url, request).await
    }

    async fn post(&self, function: &str, params: &[(&str, String)]) -> ApiResult<Value> {
        let url = self.url(function)?;
        log::debug!("POST {url}");
        let request = self
            .client
            .post(&url)
            .form(&self.with_user(params))
            .header(AUTHORIZATION, format!("Token {}", self.token));
        self.send(&url, request).await
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> ApiResult<Value> {
        let (status, body) = self.fetch(url, request).await?;
        interpret_response(url, status, &body)
    }

    async fn fetch(&self, url: &str, request: reqwest::RequestBuilder) -> ApiResult<(u16, String)> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::connection(url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::connection(url, e))?;
        Ok((status, body))
    }
}

#[async_trait]
impl JobApi for WebApiClient {
    fn server(&self) -> &RemoteServer {
        &self.server
    }

    async fn server_status(&self) -> ApiResult<()> {
        let url = self.url("")?;
        log::debug!("GET {url}");
        let request = self
            .client
            .get(&url)
            .query(&self.with_user(&[]))
            .header(AUTHORIZATION, format!("Token {}", self.token));
        let (status, body) = self.fetch(&url, request).await?;
        root_status(&url, status, &body)
    }

    async fn get_job(&self, job_id: &str) -> ApiResult<JobInfo> {
        let value = self.get("get_job", &[("job_id", job_id.to_string())]).await?;
        parse_job_info(&self.url("get_job")?, value)
    }

    async fn get_jobs_extended(&self, job_ids: &[String]) -> ApiResult<Vec<JobInfo>> {
        let function = "get_jobs_list_extended";
        let params: Vec<(&str, String)> = job_ids.iter().map(|id| ("job_ids", id.clone())).collect();
        let value = self.get(function, &params).await?;
        let mut jobs = parse_job_list(&self.url(function)?, value)?;
        jobs.sort_by_key(|job| {
            job_ids
                .iter()
                .position(|id| *id == job.job_id.to_string())
                .unwrap_or(usize::MAX)
        });
        Ok(jobs)
    }

    async fn get_jobs(&self, limit: usize) -> ApiResult<Vec<JobInfo>> {
        let value = self.get("get_jobs", &[("limit", limit.to_string())]).await?;
        let mut jobs = parse_job_list(&self.url("get_jobs")?, value)?;
        jobs.sort_by(|a, b| b.job_id.cmp(&a.job_id));
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn cancel_job(&self, job_id: &str) -> ApiResult<()> {
        self.post("cancel_job", &[("job_id", job_id.to_string())])
            .await?;
        log::info!("Cancelled job {job_id} on {}", self.server.name);
        Ok(())
    }

    async fn reset_job(&self, job_id: &str) -> ApiResult<()> {
        self.post(
            "modify_job",
            &[
                ("job_id", job_id.to_string()),
                ("status", "ACTIVE".to_string()),
                ("files_downloaded", "0".to_string()),
                ("files_processed", "0".to_string()),
                ("error", " ".to_string()),
            ],
        )
        .await?;
        log::info!("Reset job {job_id} on {}", self.server.name);
        Ok(())
    }

    async fn create_job(&self, request: &JobRequest) -> ApiResult<String> {
        let value = self.post("create_job", &request.form()).await?;
        created_job_id(&self.url("create_job")?, &value)
    }
}

/// Turn an HTTP status and body into the call's JSON result or a typed error.
pub fn interpret_response(url: &str, status: u16, body: &str) -> ApiResult<Value> {
    let parse = || -> ApiResult<Value> {
        serde_json::from_str(body).map_err(|e| {
            ApiError::invalid_response(url, format!("response was not JSON ({e}). Is this a web API url?"))
        })
    };
    match status {
        200 => parse(),
        404 if has_documentation(body) => Err(ApiError::NotFound {
            message: format!("'{url}' is not a function of this API"),
        }),
        404 => Err(ApiError::NotFound {
            message: match body.trim() {
                "" => format!("'{url}'"),
                text => format!("'{url}': {text}"),
            },
        }),
        401 | 403 => Err(ApiError::Unauthorized {
            url: url.to_string(),
            status,
        }),
        400 => Err(ApiError::Rejected {
            message: body.trim().to_string(),
        }),
        405 => Err(ApiError::Server {
            url: url.to_string(),
            status,
            message: "method not allowed. Probably GET where POST is needed, or vice versa"
                .to_string(),
        }),
        _ => Err(ApiError::Server {
            url: url.to_string(),
            status,
            message: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("unknown reason")
                .to_string(),
        }),
    }
}

/// The API answers 404 on unknown functions, with its documentation as JSON.
fn has_documentation(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .map(|value| value.get("documentation").is_some())
        .unwrap_or(false)
}

/// The API root is not a function, so an online API answers it with a
/// documented 404. Any other 404 means the url does not point at the API.
pub fn root_status(url: &str, status: u16, body: &str) -> ApiResult<()> {
    match status {
        404 if has_documentation(body) => Ok(()),
        404 => Err(ApiError::invalid_response(
            url,
            "404 without API documentation. Is this a web API url?",
        )),
        _ => interpret_response(url, status, body).map(|_| ()),
    }
}

fn parse_job_info(url: &str, value: Value) -> ApiResult<JobInfo> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::invalid_response(url, format!("not a job: {e}")))
}

/// Job lists come as an object keyed by job ID, or as a plain list.
fn parse_job_list(url: &str, value: Value) -> ApiResult<Vec<JobInfo>> {
    let items: Vec<Value> = match value {
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Array(items) => items,
        other => {
            return Err(ApiError::invalid_response(
                url,
                format!("expected a list of jobs, got {other}"),
            ));
        }
    };
    items
        .into_iter()
        .map(|item| parse_job_info(url, item))
        .collect()
}

fn created_job_id(url: &str, value: &Value) -> ApiResult<String> {
    match value.get("job_id") {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ApiError::invalid_response(
            url,
            format!("no job_id in create_job response: {value}"),
        )),
    }
}
