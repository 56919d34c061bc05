//! One-shot engine search through the direct request endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::job::{DEFAULT_DATASET_API_BASE, DEFAULT_REQUEST_TIMEOUT};
use crate::state::EngineResults;

pub const DEFAULT_SERP_ZONE: &str = "ai_agent";

/// Why an engine search produced nothing. Logged, then turned into absence.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request could not be sent, the connection failed, or it timed out.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("search API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not JSON or did not have the engine result shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Web-search engine to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    Google,
    Bing,
}

impl SearchEngine {
    fn base_url(&self) -> &'static str {
        match self {
            SearchEngine::Google => "https://www.google.com/search",
            SearchEngine::Bing => "https://www.bing.com/search",
        }
    }

    /// Engine result page URL for `query`, asking for parsed JSON output.
    pub fn search_url(&self, query: &str) -> String {
        let q: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{}?q={}&brd_json=1", self.base_url(), q)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::Bing => "bing",
        }
    }
}

/// Engine search seam.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Results for `query` on `engine`, or `None` if the request failed.
    async fn search(&self, engine: SearchEngine, query: &str) -> Option<EngineResults>;
}

/// Engine search over `POST {base}/request` with bearer auth.
#[derive(Debug, Clone)]
pub struct SerpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    zone: String,
    request_timeout: Duration,
}

impl SerpClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_DATASET_API_BASE.to_string(),
            api_key: api_key.into(),
            zone: DEFAULT_SERP_ZONE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = zone.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Like [`WebSearch::search`], keeping the reason a search produced nothing.
    pub async fn try_search(
        &self,
        engine: SearchEngine,
        query: &str,
    ) -> Result<EngineResults, SearchError> {
        let body = json!({
            "zone": self.zone,
            "url": engine.search_url(query),
            "format": "raw",
        });
        let res = self
            .http
            .post(format!("{}/request", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        res.json::<EngineResults>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl WebSearch for SerpClient {
    async fn search(&self, engine: SearchEngine, query: &str) -> Option<EngineResults> {
        match self.try_search(engine, query).await {
            Ok(results) => {
                tracing::debug!(
                    engine = engine.as_str(),
                    organic = results.organic.len(),
                    "Engine search done"
                );
                Some(results)
            }
            Err(error) => {
                tracing::warn!(engine = engine.as_str(), %error, "Engine search failed");
                None
            }
        }
    }
}
