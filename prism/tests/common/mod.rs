//! Shared fakes for integration tests: scripted job backends and a canned web search.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use prism::{
    EngineResults, JobBackend, JobError, JobStatus, SearchEngine, TriggerRequest,
    TriggerResponse, WebSearch,
};

/// Backend that plays back a fixed list of progress statuses for a single job.
///
/// Once the script runs out, the last status repeats.
pub struct ScriptedBackend {
    job_id: Option<String>,
    statuses: Mutex<VecDeque<Result<JobStatus, String>>>,
    last: Mutex<Result<JobStatus, String>>,
    records: Vec<Value>,
    pub triggers: AtomicUsize,
    pub polls: AtomicUsize,
    pub downloads: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(statuses: Vec<JobStatus>, records: Vec<Value>) -> Self {
        Self::with_results(statuses.into_iter().map(Ok).collect(), records)
    }

    /// `Err(msg)` entries make that progress call fail with a transport error.
    pub fn with_results(statuses: Vec<Result<JobStatus, String>>, records: Vec<Value>) -> Self {
        let last = statuses.last().cloned().unwrap_or(Ok(JobStatus::Running));
        Self {
            job_id: Some("s_test".to_string()),
            statuses: Mutex::new(statuses.into()),
            last: Mutex::new(last),
            records,
            triggers: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
        }
    }

    /// Trigger responses carry no job id.
    pub fn without_job_id(mut self) -> Self {
        self.job_id = None;
        self
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn triggers(&self) -> usize {
        self.triggers.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn trigger(&self, _request: &TriggerRequest) -> Result<TriggerResponse, JobError> {
        self.triggers.fetch_add(1, Ordering::SeqCst);
        Ok(TriggerResponse {
            job_id: self.job_id.clone(),
        })
    }

    async fn progress(&self, _job_id: &str) -> Result<JobStatus, JobError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        let status = match next {
            Some(s) => s,
            None => self.last.lock().unwrap().clone(),
        };
        status.map_err(JobError::Transport)
    }

    async fn download(&self, _job_id: &str) -> Result<Vec<Value>, JobError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

/// Backend serving one ready job per dataset id; unknown datasets get no job id.
///
/// Records every trigger request so tests can check what was asked for.
#[derive(Default)]
pub struct DatasetBackend {
    datasets: HashMap<String, Vec<Value>>,
    pub requests: Mutex<Vec<TriggerRequest>>,
}

impl DatasetBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, dataset_id: &str, records: Vec<Value>) -> Self {
        self.datasets.insert(dataset_id.to_string(), records);
        self
    }

    pub fn triggered_datasets(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.dataset_id.clone())
            .collect()
    }
}

#[async_trait]
impl JobBackend for DatasetBackend {
    async fn trigger(&self, request: &TriggerRequest) -> Result<TriggerResponse, JobError> {
        self.requests.lock().unwrap().push(request.clone());
        let job_id = self
            .datasets
            .contains_key(&request.dataset_id)
            .then(|| request.dataset_id.clone());
        Ok(TriggerResponse { job_id })
    }

    async fn progress(&self, _job_id: &str) -> Result<JobStatus, JobError> {
        Ok(JobStatus::Ready)
    }

    async fn download(&self, job_id: &str) -> Result<Vec<Value>, JobError> {
        Ok(self.datasets.get(job_id).cloned().unwrap_or_default())
    }
}

/// Web search with canned results per engine; engines without results return `None`.
#[derive(Default)]
pub struct CannedSearch {
    results: HashMap<&'static str, EngineResults>,
    pub calls: AtomicUsize,
}

impl CannedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, engine: SearchEngine, results: EngineResults) -> Self {
        self.results.insert(engine.as_str(), results);
        self
    }
}

#[async_trait]
impl WebSearch for CannedSearch {
    async fn search(&self, engine: SearchEngine, _query: &str) -> Option<EngineResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.get(engine.as_str()).cloned()
    }
}

pub fn organic(titles: &[&str]) -> EngineResults {
    EngineResults {
        knowledge: json!({}),
        organic: titles
            .iter()
            .enumerate()
            .map(|(i, t)| json!({"title": t, "link": format!("https://example.com/{}", i)}))
            .collect(),
    }
}
