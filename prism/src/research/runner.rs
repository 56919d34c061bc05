//! One compiled research graph, reused for every question.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::RunError;
use crate::graph::{CompilationError, CompiledStateGraph, StageEvent};
use crate::job::{DatasetClient, JobPoller};
use crate::llm::ChatOpenAI;
use crate::settings::Settings;
use crate::sources::{DiscussionClient, SerpClient};
use crate::state::ResearchState;

use super::stages::{build_research_graph, ResearchDeps};

/// Answers questions with the research graph.
///
/// Cheap to clone. Each `run` owns its own [`ResearchState`]; concurrent runs share
/// nothing but the injected clients.
#[derive(Debug, Clone)]
pub struct ResearchRunner {
    graph: CompiledStateGraph<ResearchState>,
}

impl ResearchRunner {
    pub fn new(deps: ResearchDeps) -> Result<Self, CompilationError> {
        Ok(Self {
            graph: build_research_graph(&deps)?,
        })
    }

    /// Production clients: dataset API for jobs and engine search, OpenAI for analysis.
    pub fn from_settings(settings: &Settings) -> Result<Self, CompilationError> {
        let backend = DatasetClient::new(settings.api_key.clone())
            .with_base_url(&settings.api_base)
            .with_request_timeout(settings.request_timeout);
        let poller = JobPoller::new(Arc::new(backend), settings.poll);
        let discussions = DiscussionClient::new(
            poller,
            settings.posts_dataset_id.clone(),
            settings.comments_dataset_id.clone(),
        );
        let web_search = SerpClient::new(settings.api_key.clone())
            .with_base_url(&settings.api_base)
            .with_zone(&settings.serp_zone)
            .with_request_timeout(settings.request_timeout);
        let llm = ChatOpenAI::new(settings.model.clone());

        let deps = ResearchDeps::new(Arc::new(web_search), Arc::new(discussions), Arc::new(llm))
            .with_search_options(settings.search.clone())
            .with_detail_options(settings.details.clone());
        Self::new(deps)
    }

    pub fn graph(&self) -> &CompiledStateGraph<ResearchState> {
        &self.graph
    }

    /// Runs the pipeline for `question`.
    ///
    /// `Ok` with `final_answer == None` means no answer could be produced; `Err` means
    /// an analysis or synthesis call failed.
    pub async fn run(&self, question: &str) -> Result<ResearchState, RunError> {
        tracing::info!(question, "Research run");
        self.graph.invoke(ResearchState::new(question)).await
    }

    /// Like [`run`](Self::run), reporting stage progress on `events`.
    pub async fn run_with_events(
        &self,
        question: &str,
        events: mpsc::Sender<StageEvent>,
    ) -> Result<ResearchState, RunError> {
        tracing::info!(question, "Research run");
        self.graph
            .invoke_with_events(ResearchState::new(question), events)
            .await
    }
}
