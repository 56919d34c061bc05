//! Discussion platform: keyword post search and comment retrieval, both as backend jobs.

use serde_json::{json, Value};

use crate::job::{JobPoller, TriggerRequest};
use crate::state::{DiscussionPost, DiscussionResults, PostComment, PostDetailResult};

/// Options for the keyword post search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionSearchOptions {
    pub date_range: String,
    pub sort_order: String,
    pub post_count: u32,
}

impl Default for DiscussionSearchOptions {
    fn default() -> Self {
        Self {
            date_range: "All time".to_string(),
            sort_order: "Hot".to_string(),
            post_count: 30,
        }
    }
}

/// Options for comment retrieval on selected posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetailOptions {
    pub days_back: u32,
    pub load_all_replies: bool,
    /// `None` leaves the limit to the backend.
    pub comment_limit: Option<u32>,
}

impl Default for PostDetailOptions {
    fn default() -> Self {
        Self {
            days_back: 10,
            load_all_replies: false,
            comment_limit: None,
        }
    }
}

/// Discussion search and detail retrieval on top of a [`JobPoller`].
#[derive(Debug, Clone)]
pub struct DiscussionClient {
    poller: JobPoller,
    posts_dataset_id: String,
    comments_dataset_id: String,
}

impl DiscussionClient {
    pub fn new(
        poller: JobPoller,
        posts_dataset_id: impl Into<String>,
        comments_dataset_id: impl Into<String>,
    ) -> Self {
        Self {
            poller,
            posts_dataset_id: posts_dataset_id.into(),
            comments_dataset_id: comments_dataset_id.into(),
        }
    }

    /// Posts matching `keyword`, or `None` when the job produced no records.
    pub async fn search(
        &self,
        keyword: &str,
        options: &DiscussionSearchOptions,
    ) -> Option<DiscussionResults> {
        let request = TriggerRequest::new(
            self.posts_dataset_id.clone(),
            vec![json!({
                "keyword": keyword,
                "date": options.date_range,
                "sort_by": options.sort_order,
                "num_of_posts": options.post_count,
            })],
        )
        .discover_new_by("keyword");

        let records = self.poller.trigger_and_download(&request).await?;
        if records.is_empty() {
            return None;
        }
        Some(DiscussionResults::from_posts(parse_posts(&records)))
    }

    /// Comments for every URL in `urls`, fetched as a single job.
    ///
    /// Returns `None` without contacting the backend when `urls` is empty.
    pub async fn retrieve_details(
        &self,
        urls: &[String],
        options: &PostDetailOptions,
    ) -> Option<PostDetailResult> {
        if urls.is_empty() {
            tracing::debug!("No URLs selected; skipping comment retrieval");
            return None;
        }

        let comment_limit = options
            .comment_limit
            .map(|n| n.to_string())
            .unwrap_or_default();
        let records = urls
            .iter()
            .map(|url| {
                json!({
                    "url": url,
                    "days_back": options.days_back,
                    "load_all_replies": options.load_all_replies,
                    "comment_limit": comment_limit,
                })
            })
            .collect();
        let request = TriggerRequest::new(self.comments_dataset_id.clone(), records);

        let records = self.poller.trigger_and_download(&request).await?;
        if records.is_empty() {
            return None;
        }
        Some(PostDetailResult::from_comments(parse_comments(&records)))
    }
}

fn text_field(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Raw post records to `{title, url, description}`; missing fields become empty.
pub fn parse_posts(records: &[Value]) -> Vec<DiscussionPost> {
    records
        .iter()
        .map(|r| DiscussionPost {
            title: text_field(r, "title"),
            url: text_field(r, "url"),
            description: text_field(r, "description"),
        })
        .collect()
}

/// Raw comment records to [`PostComment`]s (`comment` is the comment text).
pub fn parse_comments(records: &[Value]) -> Vec<PostComment> {
    records
        .iter()
        .map(|r| PostComment {
            comment_id: text_field(r, "comment_id"),
            content: text_field(r, "comment"),
            date_posted: r
                .get("date_posted")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect()
}
