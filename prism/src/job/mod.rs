//! Asynchronous backend jobs: trigger, poll progress, download.
//!
//! The data-collection backend runs searches as jobs with unpredictable latency.
//! [`JobPoller`] turns that into a bounded wait: at most `max_poll_attempts`
//! progress checks, `poll_delay` apart. "Still running" and a failed progress
//! request are treated the same way; both just use up an attempt.
//!
//! - [`JobBackend`]: the three backend calls; [`DatasetClient`] is the HTTP implementation.
//! - [`JobPoller`]: the protocol. [`JobPoller::run`] reports a [`JobOutcome`];
//!   [`JobPoller::trigger_and_download`] collapses every non-ready outcome to `None`.

mod backend;
mod dataset;
mod poller;
mod status;

pub use backend::{JobBackend, JobError, TriggerRequest, TriggerResponse};
pub use dataset::{DatasetClient, DEFAULT_DATASET_API_BASE, DEFAULT_REQUEST_TIMEOUT};
pub use poller::{JobOutcome, JobPoller, PollConfig};
pub use status::{AsyncJob, JobStatus};
