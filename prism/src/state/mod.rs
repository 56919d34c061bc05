//! Research state threaded through every stage of a run.
//!
//! # Main types
//!
//! - [`ResearchState`]: question, per-source search results, URL selection, post
//!   details, per-source analyses, final answer, and the conversation transcript.
//! - [`ResearchUpdate`]: the partial update one stage returns; merged with
//!   write-once semantics by [`GraphState::apply`](crate::graph::GraphState::apply).
//! - [`SearchResult`], [`PostDetailResult`] and their records.
//!
//! # Example
//!
//! ```rust
//! use prism::{ResearchState, ResearchUpdate, Source};
//! use prism::graph::GraphState;
//!
//! let mut state = ResearchState::new("best budget laptop 2024");
//! state.apply(ResearchUpdate::analysis(Source::Google, "Google says...")).unwrap();
//! assert_eq!(state.analysis(Source::Google), Some("Google says..."));
//! assert!(state.apply(ResearchUpdate::analysis(Source::Google, "again")).is_err());
//! ```

mod records;
mod research_state;

pub use records::{
    DiscussionPost, DiscussionResults, EngineResults, PostComment, PostDetailResult, SearchResult,
    Source,
};
pub use research_state::{ResearchState, ResearchUpdate};
