//! Research stages and graph wiring.

use std::sync::Arc;

use async_trait::async_trait;

use crate::analysis::{prompts, Analyzer};
use crate::error::StageError;
use crate::graph::{CompilationError, CompiledStateGraph, ErrorPolicy, Stage, StateGraph};
use crate::llm::LlmClient;
use crate::sources::{
    DiscussionClient, DiscussionSearchOptions, PostDetailOptions, SearchEngine, WebSearch,
};
use crate::state::{ResearchState, ResearchUpdate, SearchResult, Source};

use super::stage_names::*;

/// Everything the research graph talks to, injected once at build time.
#[derive(Clone)]
pub struct ResearchDeps {
    pub web_search: Arc<dyn WebSearch>,
    pub discussions: Arc<DiscussionClient>,
    pub llm: Arc<dyn LlmClient>,
    pub search_options: DiscussionSearchOptions,
    pub detail_options: PostDetailOptions,
}

impl ResearchDeps {
    /// Deps with default discussion search and detail options.
    pub fn new(
        web_search: Arc<dyn WebSearch>,
        discussions: Arc<DiscussionClient>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            web_search,
            discussions,
            llm,
            search_options: DiscussionSearchOptions::default(),
            detail_options: PostDetailOptions::default(),
        }
    }

    pub fn with_search_options(mut self, options: DiscussionSearchOptions) -> Self {
        self.search_options = options;
        self
    }

    pub fn with_detail_options(mut self, options: PostDetailOptions) -> Self {
        self.detail_options = options;
        self
    }
}

struct EngineSearchStage {
    web_search: Arc<dyn WebSearch>,
    engine: SearchEngine,
    source: Source,
}

#[async_trait]
impl Stage<ResearchState> for EngineSearchStage {
    async fn run(&self, state: ResearchState) -> Result<ResearchUpdate, StageError> {
        Ok(match self.web_search.search(self.engine, &state.question).await {
            Some(results) => ResearchUpdate::search(self.source, SearchResult::Engine(results)),
            None => ResearchUpdate::default(),
        })
    }
}

struct DiscussionSearchStage {
    discussions: Arc<DiscussionClient>,
    options: DiscussionSearchOptions,
}

#[async_trait]
impl Stage<ResearchState> for DiscussionSearchStage {
    async fn run(&self, state: ResearchState) -> Result<ResearchUpdate, StageError> {
        Ok(match self.discussions.search(&state.question, &self.options).await {
            Some(results) => {
                ResearchUpdate::search(Source::Reddit, SearchResult::Discussion(results))
            }
            None => ResearchUpdate::default(),
        })
    }
}

struct SelectUrlsStage {
    analyzer: Analyzer,
}

#[async_trait]
impl Stage<ResearchState> for SelectUrlsStage {
    async fn run(&self, state: ResearchState) -> Result<ResearchUpdate, StageError> {
        let urls = self
            .analyzer
            .select_urls(&state.question, state.discussion_results())
            .await;
        Ok(ResearchUpdate::selection(urls))
    }
}

struct RetrievePostsStage {
    discussions: Arc<DiscussionClient>,
    options: PostDetailOptions,
}

#[async_trait]
impl Stage<ResearchState> for RetrievePostsStage {
    async fn run(&self, state: ResearchState) -> Result<ResearchUpdate, StageError> {
        Ok(
            match self
                .discussions
                .retrieve_details(state.selected_urls(), &self.options)
                .await
            {
                Some(details) => ResearchUpdate::post_details(details),
                None => ResearchUpdate::default(),
            },
        )
    }
}

struct AnalyzeStage {
    analyzer: Analyzer,
    source: Source,
}

#[async_trait]
impl Stage<ResearchState> for AnalyzeStage {
    async fn run(&self, state: ResearchState) -> Result<ResearchUpdate, StageError> {
        let question = state.question.as_str();
        let messages = match self.source {
            Source::Google => {
                prompts::google_analysis_messages(question, state.engine_results(Source::Google))
            }
            Source::Bing => {
                prompts::bing_analysis_messages(question, state.engine_results(Source::Bing))
            }
            Source::Reddit => prompts::reddit_analysis_messages(
                question,
                state.discussion_results(),
                state.post_details.as_ref(),
            ),
        };
        let text = self.analyzer.analyze(&messages).await?;
        Ok(ResearchUpdate::analysis(self.source, text))
    }
}

struct SynthesizeStage {
    analyzer: Analyzer,
}

#[async_trait]
impl Stage<ResearchState> for SynthesizeStage {
    async fn run(&self, state: ResearchState) -> Result<ResearchUpdate, StageError> {
        let messages = prompts::synthesis_messages(
            &state.question,
            state.analysis(Source::Google),
            state.analysis(Source::Bing),
            state.analysis(Source::Reddit),
        );
        let answer = self.analyzer.analyze(&messages).await?;
        Ok(ResearchUpdate::answer(answer))
    }
}

/// Builds and compiles the research graph over `deps`.
pub fn build_research_graph(
    deps: &ResearchDeps,
) -> Result<CompiledStateGraph<ResearchState>, CompilationError> {
    let analyzer = Analyzer::new(Arc::clone(&deps.llm));
    let searches = [GOOGLE_SEARCH, BING_SEARCH, REDDIT_SEARCH];
    let analyses = [
        ANALYZE_GOOGLE_RESULTS,
        ANALYZE_BING_RESULTS,
        ANALYZE_REDDIT_RESULTS,
    ];

    let mut graph = StateGraph::<ResearchState>::new();
    graph
        .add_stage_with_policy(
            GOOGLE_SEARCH,
            [] as [&str; 0],
            Arc::new(EngineSearchStage {
                web_search: Arc::clone(&deps.web_search),
                engine: SearchEngine::Google,
                source: Source::Google,
            }),
            ErrorPolicy::Isolate,
        )?
        .add_stage_with_policy(
            BING_SEARCH,
            [] as [&str; 0],
            Arc::new(EngineSearchStage {
                web_search: Arc::clone(&deps.web_search),
                engine: SearchEngine::Bing,
                source: Source::Bing,
            }),
            ErrorPolicy::Isolate,
        )?
        .add_stage_with_policy(
            REDDIT_SEARCH,
            [] as [&str; 0],
            Arc::new(DiscussionSearchStage {
                discussions: Arc::clone(&deps.discussions),
                options: deps.search_options.clone(),
            }),
            ErrorPolicy::Isolate,
        )?
        .add_stage_with_policy(
            SELECT_REDDIT_URLS,
            searches,
            Arc::new(SelectUrlsStage {
                analyzer: analyzer.clone(),
            }),
            ErrorPolicy::Isolate,
        )?
        .add_stage_with_policy(
            RETRIEVE_REDDIT_POSTS,
            [SELECT_REDDIT_URLS],
            Arc::new(RetrievePostsStage {
                discussions: Arc::clone(&deps.discussions),
                options: deps.detail_options.clone(),
            }),
            ErrorPolicy::Isolate,
        )?;

    for (name, source) in analyses.iter().zip(Source::ALL) {
        graph.add_stage(
            *name,
            [RETRIEVE_REDDIT_POSTS],
            Arc::new(AnalyzeStage {
                analyzer: analyzer.clone(),
                source,
            }),
        )?;
    }

    graph.add_stage(
        SYNTHESIZE_ANALYSES,
        analyses,
        Arc::new(SynthesizeStage { analyzer }),
    )?;

    graph.compile()
}
