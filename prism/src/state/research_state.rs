//! [`ResearchState`] and its partial update type.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::channels::{write_once, write_once_entry, ChannelError};
use crate::graph::GraphState;
use crate::message::Message;

use super::records::{
    DiscussionResults, EngineResults, PostDetailResult, SearchResult, Source,
};

/// State for one research run.
///
/// Every field except `question` and `conversation` starts absent and is written by
/// exactly one stage. An absent field after the run is a valid outcome (the source
/// produced nothing), not an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResearchState {
    pub question: String,
    pub search_results: BTreeMap<Source, SearchResult>,
    pub selected_urls: Option<Vec<String>>,
    pub post_details: Option<PostDetailResult>,
    pub analyses: BTreeMap<Source, String>,
    pub final_answer: Option<String>,
    /// Append-only transcript: the user question, then the final answer.
    pub conversation: Vec<Message>,
}

impl ResearchState {
    /// Seeds a run with `question`; the conversation starts with the user message.
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            conversation: vec![Message::user(question.clone())],
            question,
            ..Default::default()
        }
    }

    /// Engine results for `source`, if that search produced any.
    pub fn engine_results(&self, source: Source) -> Option<&EngineResults> {
        match self.search_results.get(&source) {
            Some(SearchResult::Engine(r)) => Some(r),
            _ => None,
        }
    }

    /// Discussion search results, if the discussion search produced any.
    pub fn discussion_results(&self) -> Option<&DiscussionResults> {
        self.search_results.values().find_map(|r| match r {
            SearchResult::Discussion(d) => Some(d),
            _ => None,
        })
    }

    pub fn analysis(&self, source: Source) -> Option<&str> {
        self.analyses.get(&source).map(String::as_str)
    }

    /// Selected URLs, empty when selection has not run or chose nothing.
    pub fn selected_urls(&self) -> &[String] {
        self.selected_urls.as_deref().unwrap_or_default()
    }
}

/// Partial update returned by a research stage. Unset fields are not written.
#[derive(Debug, Clone, Default)]
pub struct ResearchUpdate {
    pub search_result: Option<(Source, SearchResult)>,
    pub selected_urls: Option<Vec<String>>,
    pub post_details: Option<PostDetailResult>,
    pub analysis: Option<(Source, String)>,
    pub final_answer: Option<String>,
    /// Appended to `conversation`.
    pub messages: Vec<Message>,
}

impl ResearchUpdate {
    pub fn search(source: Source, result: SearchResult) -> Self {
        Self {
            search_result: Some((source, result)),
            ..Default::default()
        }
    }

    pub fn selection(urls: Vec<String>) -> Self {
        Self {
            selected_urls: Some(urls),
            ..Default::default()
        }
    }

    pub fn post_details(details: PostDetailResult) -> Self {
        Self {
            post_details: Some(details),
            ..Default::default()
        }
    }

    pub fn analysis(source: Source, text: impl Into<String>) -> Self {
        Self {
            analysis: Some((source, text.into())),
            ..Default::default()
        }
    }

    /// Final answer plus the assistant message carrying it.
    pub fn answer(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            messages: vec![Message::assistant(text.clone())],
            final_answer: Some(text),
            ..Default::default()
        }
    }

    /// True when applying this update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.search_result.is_none()
            && self.selected_urls.is_none()
            && self.post_details.is_none()
            && self.analysis.is_none()
            && self.final_answer.is_none()
            && self.messages.is_empty()
    }
}

impl GraphState for ResearchState {
    type Update = ResearchUpdate;

    fn apply(&mut self, update: ResearchUpdate) -> Result<(), ChannelError> {
        if let Some((source, result)) = update.search_result {
            write_once_entry(&mut self.search_results, source, result, "search_results")?;
        }
        write_once(&mut self.selected_urls, update.selected_urls, "selected_urls")?;
        write_once(&mut self.post_details, update.post_details, "post_details")?;
        if let Some((source, text)) = update.analysis {
            write_once_entry(&mut self.analyses, source, text, "analyses")?;
        }
        write_once(&mut self.final_answer, update.final_answer, "final_answer")?;
        self.conversation.extend(update.messages);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_seeds_user_message() {
        let state = ResearchState::new("q?");
        assert_eq!(state.question, "q?");
        assert_eq!(state.conversation, vec![Message::user("q?")]);
        assert!(state.final_answer.is_none());
        assert!(state.selected_urls().is_empty());
    }

    /// **Scenario**: Updates for different sources land side by side; accessors pick by source.
    #[test]
    fn search_results_are_keyed_by_source() {
        let mut state = ResearchState::new("q");
        state
            .apply(ResearchUpdate::search(
                Source::Google,
                SearchResult::Engine(EngineResults::default()),
            ))
            .unwrap();
        state
            .apply(ResearchUpdate::search(
                Source::Reddit,
                SearchResult::Discussion(DiscussionResults::default()),
            ))
            .unwrap();
        assert!(state.engine_results(Source::Google).is_some());
        assert!(state.engine_results(Source::Bing).is_none());
        assert!(state.engine_results(Source::Reddit).is_none());
        assert!(state.discussion_results().is_some());
    }

    /// **Scenario**: A second write to a write-once field fails and keeps the first value.
    #[test]
    fn second_write_is_rejected() {
        let mut state = ResearchState::new("q");
        state
            .apply(ResearchUpdate::selection(vec!["a".into()]))
            .unwrap();
        let err = state
            .apply(ResearchUpdate::selection(vec![]))
            .unwrap_err();
        assert!(matches!(err, ChannelError::AlreadyWritten(ref f) if f == "selected_urls"));
        assert_eq!(state.selected_urls(), ["a".to_string()]);
    }

    /// **Scenario**: The answer update writes final_answer and appends the assistant message.
    #[test]
    fn answer_appends_assistant_message() {
        let mut state = ResearchState::new("q");
        state.apply(ResearchUpdate::answer("done")).unwrap();
        assert_eq!(state.final_answer.as_deref(), Some("done"));
        assert_eq!(state.conversation.len(), 2);
        assert_eq!(state.conversation[1], Message::assistant("done"));
    }

    #[test]
    fn empty_update_changes_nothing() {
        let update = ResearchUpdate::default();
        assert!(update.is_empty());
        let mut state = ResearchState::new("q");
        state.apply(update).unwrap();
        assert_eq!(state.conversation.len(), 1);
    }

    #[test]
    fn state_serializes_sources_as_keys() {
        let mut state = ResearchState::new("q");
        state.apply(ResearchUpdate::analysis(Source::Bing, "b")).unwrap();
        let v = serde_json::to_value(&state).unwrap();
        assert_eq!(v["analyses"]["bing"], "b");
        assert_eq!(v["conversation"][0]["role"], "user");
    }
}
