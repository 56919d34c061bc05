//! Backend seam for asynchronous jobs.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::JobStatus;

/// Transport or decode failure talking to the job backend.
#[derive(Debug, Error)]
pub enum JobError {
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("decode error: {0}")]
    Decode(String),
}

/// What to start: dataset, optional job kind / discovery mode, and input records.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRequest {
    pub dataset_id: String,
    /// Job kind, e.g. `discover_new`. Omitted for plain collection jobs.
    pub job_kind: Option<String>,
    /// Discovery mode, e.g. `keyword`.
    pub discovery_mode: Option<String>,
    pub records: Vec<Value>,
}

impl TriggerRequest {
    /// A collection job over `records` (one per input URL, keyword, ...).
    pub fn new(dataset_id: impl Into<String>, records: Vec<Value>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            job_kind: None,
            discovery_mode: None,
            records,
        }
    }

    /// Marks the job as a discovery job (`discover_new`) using `mode`.
    pub fn discover_new_by(mut self, mode: impl Into<String>) -> Self {
        self.job_kind = Some("discover_new".to_string());
        self.discovery_mode = Some(mode.into());
        self
    }
}

/// Trigger response. A missing id means the job was not started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TriggerResponse {
    #[serde(default, rename = "snapshot_id", alias = "job_id")]
    pub job_id: Option<String>,
}

/// The three calls of the trigger/poll/download protocol.
#[async_trait]
pub trait JobBackend: Send + Sync {
    async fn trigger(&self, request: &TriggerRequest) -> Result<TriggerResponse, JobError>;

    async fn progress(&self, job_id: &str) -> Result<JobStatus, JobError>;

    /// Downloads the finished job's records.
    async fn download(&self, job_id: &str) -> Result<Vec<Value>, JobError>;
}
