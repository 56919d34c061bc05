//! Bounded trigger/poll/download loop.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::{AsyncJob, JobBackend, JobStatus, TriggerRequest, TriggerResponse};

pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(5);

/// Polling budget. Worst-case wait is `(max_poll_attempts - 1) * poll_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_poll_attempts: u32,
    /// Constant delay between progress checks.
    pub poll_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            poll_delay: DEFAULT_POLL_DELAY,
        }
    }
}

/// How one job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Ready { job: AsyncJob, records: Vec<Value> },
    /// The trigger call failed or returned no job id.
    NotTriggered,
    Failed(AsyncJob),
    Canceled(AsyncJob),
    /// The attempt budget ran out before the job became ready.
    TimedOut(AsyncJob),
    /// The job was ready but the download failed.
    DownloadFailed(AsyncJob),
}

impl JobOutcome {
    /// Records for `Ready`, `None` for every other outcome.
    pub fn into_records(self) -> Option<Vec<Value>> {
        match self {
            JobOutcome::Ready { records, .. } => Some(records),
            _ => None,
        }
    }

    pub fn job(&self) -> Option<&AsyncJob> {
        match self {
            JobOutcome::Ready { job, .. }
            | JobOutcome::Failed(job)
            | JobOutcome::Canceled(job)
            | JobOutcome::TimedOut(job)
            | JobOutcome::DownloadFailed(job) => Some(job),
            JobOutcome::NotTriggered => None,
        }
    }
}

/// Runs jobs against a [`JobBackend`] within a [`PollConfig`] budget.
///
/// The trigger is never retried. Progress is checked up to `max_poll_attempts` times,
/// sleeping `poll_delay` between checks (not before the first, not after the last).
#[derive(Clone)]
pub struct JobPoller {
    backend: Arc<dyn JobBackend>,
    config: PollConfig,
}

impl std::fmt::Debug for JobPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPoller")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JobPoller {
    pub fn new(backend: Arc<dyn JobBackend>, config: PollConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Triggers `request`, polls until a terminal status or the budget runs out, and
    /// downloads on `Ready`.
    pub async fn run(&self, request: &TriggerRequest) -> JobOutcome {
        let job_id = match self.backend.trigger(request).await {
            Ok(TriggerResponse { job_id: Some(id) }) if !id.is_empty() => id,
            Ok(_) => {
                tracing::warn!(dataset = %request.dataset_id, "Trigger response has no job id");
                return JobOutcome::NotTriggered;
            }
            Err(error) => {
                tracing::warn!(dataset = %request.dataset_id, %error, "Trigger failed");
                return JobOutcome::NotTriggered;
            }
        };

        let mut job = AsyncJob::new(job_id);
        tracing::info!(job_id = %job.job_id, records = request.records.len(), "Job triggered");

        for attempt in 1..=self.config.max_poll_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.config.poll_delay).await;
            }
            job.attempts_made = attempt;
            job.status = match self.backend.progress(&job.job_id).await {
                Ok(status) => status,
                Err(error) => JobStatus::Unknown(error.to_string()),
            };
            tracing::debug!(job_id = %job.job_id, attempt, status = %job.status, "Polled job");

            match job.status {
                JobStatus::Ready => return self.download(job).await,
                JobStatus::Failed => {
                    tracing::warn!(job_id = %job.job_id, "Job failed");
                    return JobOutcome::Failed(job);
                }
                JobStatus::Canceled => {
                    tracing::warn!(job_id = %job.job_id, "Job canceled");
                    return JobOutcome::Canceled(job);
                }
                _ => {}
            }
        }

        tracing::warn!(
            job_id = %job.job_id,
            attempts = job.attempts_made,
            "Job not ready within poll budget"
        );
        JobOutcome::TimedOut(job)
    }

    async fn download(&self, job: AsyncJob) -> JobOutcome {
        match self.backend.download(&job.job_id).await {
            Ok(records) => {
                tracing::info!(job_id = %job.job_id, records = records.len(), "Job downloaded");
                JobOutcome::Ready { job, records }
            }
            Err(error) => {
                tracing::warn!(job_id = %job.job_id, %error, "Download failed");
                JobOutcome::DownloadFailed(job)
            }
        }
    }

    /// Downloaded records, or `None` if the job was not triggered, failed, was
    /// canceled, timed out or could not be downloaded.
    pub async fn trigger_and_download(&self, request: &TriggerRequest) -> Option<Vec<Value>> {
        self.run(request).await.into_records()
    }
}
