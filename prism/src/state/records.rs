//! Search and comment records stored in [`ResearchState`](super::ResearchState).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the three information sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Google,
    Bing,
    Reddit,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Google, Source::Bing, Source::Reddit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Google => "google",
            Source::Bing => "bing",
            Source::Reddit => "reddit",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine search response: knowledge panel (or `{}`) and organic entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResults {
    #[serde(default = "empty_object")]
    pub knowledge: Value,
    #[serde(default)]
    pub organic: Vec<Value>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Default for EngineResults {
    fn default() -> Self {
        Self {
            knowledge: empty_object(),
            organic: Vec::new(),
        }
    }
}

/// A discussion post found by keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscussionPost {
    pub title: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscussionResults {
    pub posts: Vec<DiscussionPost>,
    pub total_found: usize,
}

impl DiscussionResults {
    /// Wraps posts, setting `total_found` to their count.
    pub fn from_posts(posts: Vec<DiscussionPost>) -> Self {
        let total_found = posts.len();
        Self { posts, total_found }
    }
}

/// Result of one source search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchResult {
    Engine(EngineResults),
    Discussion(DiscussionResults),
}

/// A comment retrieved for one of the selected posts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostComment {
    pub comment_id: String,
    pub content: String,
    pub date_posted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostDetailResult {
    pub comments: Vec<PostComment>,
    pub total_retrieved: usize,
}

impl PostDetailResult {
    pub fn from_comments(comments: Vec<PostComment>) -> Self {
        let total_retrieved = comments.len();
        Self {
            comments,
            total_retrieved,
        }
    }
}
