//! The research pipeline: three searches, URL selection, comment retrieval, three
//! analyses, synthesis.
//!
//! ```text
//! google_search, bing_search, reddit_search      (concurrent)
//!   -> select_reddit_urls                          (waits for all three)
//!   -> retrieve_reddit_posts
//!   -> analyze_{google,bing,reddit}_results        (concurrent)
//!   -> synthesize_analyses                         (waits for all three)
//! ```
//!
//! Searches, selection and retrieval are isolated: a failure there leaves their field
//! absent. Analysis and synthesis failures fail the run.

mod runner;
mod stages;

pub use runner::ResearchRunner;
pub use stages::{build_research_graph, ResearchDeps};

/// Stage names used in the research graph.
pub mod stage_names {
    pub const GOOGLE_SEARCH: &str = "google_search";
    pub const BING_SEARCH: &str = "bing_search";
    pub const REDDIT_SEARCH: &str = "reddit_search";
    pub const SELECT_REDDIT_URLS: &str = "select_reddit_urls";
    pub const RETRIEVE_REDDIT_POSTS: &str = "retrieve_reddit_posts";
    pub const ANALYZE_GOOGLE_RESULTS: &str = "analyze_google_results";
    pub const ANALYZE_BING_RESULTS: &str = "analyze_bing_results";
    pub const ANALYZE_REDDIT_RESULTS: &str = "analyze_reddit_results";
    pub const SYNTHESIZE_ANALYSES: &str = "synthesize_analyses";
}
