//! HTTP job backend for the dataset collection API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{JobBackend, JobError, JobStatus, TriggerRequest, TriggerResponse};

pub const DEFAULT_DATASET_API_BASE: &str = "https://api.brightdata.com";

/// Per-request limit for backend calls. A stalled call fails as
/// `JobError::Transport` instead of holding up the poll loop.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Dataset API client: `datasets/v3/{trigger, progress, snapshot}` with bearer auth.
#[derive(Debug, Clone)]
pub struct DatasetClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    request_timeout: Duration,
}

impl DatasetClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_DATASET_API_BASE.to_string(),
            api_key: api_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Limit for each trigger, progress and download request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides the API base (e.g. a mock server in tests). A trailing `/` is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, JobError> {
        let res = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .query(query)
            .send()
            .await
            .map_err(|e| JobError::Transport(e.to_string()))?;
        read_json(res).await
    }
}

async fn read_json(res: reqwest::Response) -> Result<Value, JobError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(JobError::Status {
            status: status.as_u16(),
            body,
        });
    }
    res.json()
        .await
        .map_err(|e| JobError::Decode(e.to_string()))
}

#[async_trait]
impl JobBackend for DatasetClient {
    async fn trigger(&self, request: &TriggerRequest) -> Result<TriggerResponse, JobError> {
        let mut query = vec![
            ("dataset_id", request.dataset_id.as_str()),
            ("include_errors", "true"),
        ];
        if let Some(kind) = request.job_kind.as_deref() {
            query.push(("type", kind));
        }
        if let Some(mode) = request.discovery_mode.as_deref() {
            query.push(("discover_by", mode));
        }

        let res = self
            .http
            .post(format!("{}/datasets/v3/trigger", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .query(&query)
            .json(&request.records)
            .send()
            .await
            .map_err(|e| JobError::Transport(e.to_string()))?;
        let body = read_json(res).await?;
        serde_json::from_value(body).map_err(|e| JobError::Decode(e.to_string()))
    }

    async fn progress(&self, job_id: &str) -> Result<JobStatus, JobError> {
        let url = format!("{}/datasets/v3/progress/{}", self.base_url, job_id);
        let body = self.get_json(&url, &[]).await?;
        let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
        Ok(JobStatus::parse(status))
    }

    async fn download(&self, job_id: &str) -> Result<Vec<Value>, JobError> {
        let url = format!("{}/datasets/v3/snapshot/{}", self.base_url, job_id);
        match self.get_json(&url, &[("format", "json")]).await? {
            Value::Array(records) => Ok(records),
            other => Ok(vec![other]),
        }
    }
}
