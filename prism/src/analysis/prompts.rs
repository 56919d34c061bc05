//! Prompt assembly for each analysis stage.
//!
//! Each builder returns `[system, user]`. Absent inputs render as empty text, so a
//! source that produced nothing is still analyzed (the model is told there is no data).

use serde::Serialize;

use crate::message::Message;
use crate::state::{DiscussionResults, EngineResults, PostDetailResult};

const URL_SELECTION_SYSTEM: &str = "You are a research assistant. Given a user question and a list of \
discussion posts, pick the posts whose full comment threads are most likely to help answer the \
question. Only choose URLs that appear in the list.";

const ENGINE_ANALYSIS_SYSTEM: &str = "You are a research analyst. Summarize what the search results \
below say about the user's question: key facts, recurring recommendations, and notable sources. \
If the results are empty, say that this source returned nothing useful.";

const DISCUSSION_ANALYSIS_SYSTEM: &str = "You are a research analyst focusing on community \
discussions. Using the posts and comments below, summarize real user experiences, opinions and \
points of disagreement that bear on the user's question. If there is no data, say so.";

const SYNTHESIS_SYSTEM: &str = "You combine several source analyses into one answer. Merge the \
analyses below into a single clear response to the user's question, note where sources agree or \
conflict, and do not invent facts missing from the analyses.";

/// Pretty JSON for `value`, or empty text when absent.
fn render<T: Serialize>(value: Option<&T>) -> String {
    value
        .and_then(|v| serde_json::to_string_pretty(v).ok())
        .unwrap_or_default()
}

pub fn url_selection_messages(question: &str, results: &DiscussionResults) -> Vec<Message> {
    let listing = results
        .posts
        .iter()
        .map(|p| format!("- {}\n  URL: {}\n  {}", p.title, p.url, p.description))
        .collect::<Vec<_>>()
        .join("\n");
    vec![
        Message::system(URL_SELECTION_SYSTEM),
        Message::user(format!("Question: {}\n\nPosts:\n{}", question, listing)),
    ]
}

fn engine_messages(engine: &str, question: &str, results: Option<&EngineResults>) -> Vec<Message> {
    vec![
        Message::system(ENGINE_ANALYSIS_SYSTEM),
        Message::user(format!(
            "Question: {}\n\n{} search results:\n{}",
            question,
            engine,
            render(results)
        )),
    ]
}

pub fn google_analysis_messages(question: &str, results: Option<&EngineResults>) -> Vec<Message> {
    engine_messages("Google", question, results)
}

pub fn bing_analysis_messages(question: &str, results: Option<&EngineResults>) -> Vec<Message> {
    engine_messages("Bing", question, results)
}

pub fn reddit_analysis_messages(
    question: &str,
    results: Option<&DiscussionResults>,
    details: Option<&PostDetailResult>,
) -> Vec<Message> {
    vec![
        Message::system(DISCUSSION_ANALYSIS_SYSTEM),
        Message::user(format!(
            "Question: {}\n\nPosts:\n{}\n\nComments from selected posts:\n{}",
            question,
            render(results),
            render(details)
        )),
    ]
}

pub fn synthesis_messages(
    question: &str,
    google: Option<&str>,
    bing: Option<&str>,
    reddit: Option<&str>,
) -> Vec<Message> {
    vec![
        Message::system(SYNTHESIS_SYSTEM),
        Message::user(format!(
            "Question: {}\n\nGoogle analysis:\n{}\n\nBing analysis:\n{}\n\nReddit analysis:\n{}",
            question,
            google.unwrap_or_default(),
            bing.unwrap_or_default(),
            reddit.unwrap_or_default()
        )),
    ]
}
