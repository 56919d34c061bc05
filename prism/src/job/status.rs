//! Job status and the per-job polling record.

use std::fmt;

use serde::Serialize;

/// Status reported by the progress endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    /// Triggered, not yet polled.
    Pending,
    Running,
    Ready,
    Failed,
    Canceled,
    /// Any other status string, or a progress request that failed.
    Unknown(String),
}

impl JobStatus {
    /// Parses a status string case-insensitively. `cancelled` is accepted as `Canceled`.
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "ready" => JobStatus::Ready,
            "failed" => JobStatus::Failed,
            "canceled" | "cancelled" => JobStatus::Canceled,
            _ => JobStatus::Unknown(status.to_string()),
        }
    }

    /// True for `Ready`, `Failed` and `Canceled`: polling stops.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Failed | JobStatus::Canceled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => f.write_str("pending"),
            JobStatus::Running => f.write_str("running"),
            JobStatus::Ready => f.write_str("ready"),
            JobStatus::Failed => f.write_str("failed"),
            JobStatus::Canceled => f.write_str("canceled"),
            JobStatus::Unknown(s) => write!(f, "unknown({})", s),
        }
    }
}

/// One trigger/poll/download cycle, owned by the poller while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsyncJob {
    pub job_id: String,
    pub status: JobStatus,
    pub attempts_made: u32,
}

impl AsyncJob {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            attempts_made: 0,
        }
    }
}
