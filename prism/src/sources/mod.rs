//! Source clients: engine search and discussion search / detail retrieval.
//!
//! Every call returns `Option`: `None` is "this source produced nothing", never an
//! error. Failures are logged where they happen.

mod discussion;
mod serp;

pub use discussion::{
    parse_comments, parse_posts, DiscussionClient, DiscussionSearchOptions, PostDetailOptions,
};
pub use serp::{SearchEngine, SearchError, SerpClient, WebSearch, DEFAULT_SERP_ZONE};
