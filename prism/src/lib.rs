//! # Prism
//!
//! Answers one question from three sources. Two web-search engines and a
//! discussion platform are queried in parallel, each source's raw results are
//! analyzed by a language model, and the analyses are synthesized into one answer.
//!
//! ## Design principles
//!
//! - **Single state type**: one [`ResearchState`] flows through every stage of a run.
//! - **Partial updates**: a stage reads a snapshot of the state and returns a
//!   [`ResearchUpdate`]; the executor merges it with write-once field semantics.
//! - **Dependencies are the synchronization**: a stage is scheduled once every
//!   stage it depends on is terminal. Stages writing disjoint fields run concurrently,
//!   so the state needs no locks.
//! - **Absence is data**: a source that times out or fails writes nothing; downstream
//!   stages render it as empty input.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Stage`], [`ErrorPolicy`], [`StageEvent`].
//! - [`channels`]: [`NamedBarrierValue`] (fan-in), [`StateUpdater`], write-once merge helpers.
//! - [`state`]: [`ResearchState`], [`ResearchUpdate`], search and comment records.
//! - [`job`]: [`JobPoller`] trigger/poll/download protocol, [`JobBackend`], [`DatasetClient`].
//! - [`sources`]: [`SerpClient`] engine search, [`DiscussionClient`] post search and detail retrieval.
//! - [`llm`]: [`LlmClient`] trait, [`ChatOpenAI`], [`MockLlm`].
//! - [`analysis`]: [`Analyzer`] and prompt assembly.
//! - [`research`]: stage wiring, [`build_research_graph`], [`ResearchRunner`].
//! - [`settings`]: [`Settings`] loaded from the environment.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use prism::{ResearchRunner, Settings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_env()?;
//! let runner = ResearchRunner::from_settings(&settings)?;
//! let state = runner.run("best budget laptop 2024").await?;
//! println!("{}", state.final_answer.as_deref().unwrap_or("no answer generated"));
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod channels;
pub mod error;
pub mod graph;
pub mod job;
pub mod llm;
pub mod message;
pub mod research;
pub mod settings;
pub mod sources;
pub mod state;

pub use analysis::{Analyzer, UrlSelection};
pub use channels::{
    write_once, ChannelError, FieldBasedUpdater, MergeUpdater, NamedBarrierValue, StateUpdater,
};
pub use error::{RunError, StageError};
pub use graph::{
    generate_dot, generate_text, CompilationError, CompiledStateGraph, ErrorPolicy, FnStage,
    GraphState, Stage, StageEvent, StateGraph,
};
pub use job::{
    AsyncJob, DatasetClient, JobBackend, JobError, JobOutcome, JobPoller, JobStatus, PollConfig,
    TriggerRequest, TriggerResponse,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, OutputSchema};
pub use message::Message;
pub use research::{build_research_graph, stage_names, ResearchDeps, ResearchRunner};
pub use settings::{Settings, SettingsError};
pub use sources::{
    DiscussionClient, DiscussionSearchOptions, PostDetailOptions, SearchEngine, SearchError,
    SerpClient, WebSearch,
};
pub use state::{
    DiscussionPost, DiscussionResults, EngineResults, PostComment, PostDetailResult,
    ResearchState, ResearchUpdate, SearchResult, Source,
};
