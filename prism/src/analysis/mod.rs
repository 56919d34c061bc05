//! Analyzer: model calls over one source's raw results, URL selection, and synthesis.
//!
//! Free-text analyses return the model's reply verbatim and propagate errors. URL
//! selection is structured (`selected_urls: [string]`) and degrades to an empty list
//! on any failure, so a bad selection never stops the rest of the run.

pub mod prompts;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StageError;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::DiscussionResults;

pub use crate::llm::OutputSchema;

/// Structured reply of the URL selection call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UrlSelection {
    pub selected_urls: Vec<String>,
}

impl UrlSelection {
    pub fn schema() -> OutputSchema {
        OutputSchema::string_list(
            "UrlSelection",
            "selected_urls",
            "Discussion post URLs that contain valuable information for answering the user's question.",
        )
    }
}

/// Runs analysis prompts against an injected [`LlmClient`].
#[derive(Clone)]
pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer").finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Picks the discussion posts worth reading in full.
    ///
    /// Returns an empty list, without calling the model, when there are no posts. A
    /// model error or malformed reply is logged and also yields an empty list.
    pub async fn select_urls(
        &self,
        question: &str,
        results: Option<&DiscussionResults>,
    ) -> Vec<String> {
        let Some(results) = results.filter(|r| !r.posts.is_empty()) else {
            return Vec::new();
        };

        let messages = prompts::url_selection_messages(question, results);
        let reply = match self
            .llm
            .invoke_structured(&messages, &UrlSelection::schema())
            .await
        {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(%error, "URL selection failed; continuing with no URLs");
                return Vec::new();
            }
        };
        match serde_json::from_value::<UrlSelection>(reply) {
            Ok(selection) => {
                tracing::info!(
                    selected = selection.selected_urls.len(),
                    "Selected discussion URLs"
                );
                selection.selected_urls
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    "URL selection reply has the wrong shape; continuing with no URLs"
                );
                Vec::new()
            }
        }
    }

    /// Free-text analysis: the model's reply to `messages`, verbatim.
    pub async fn analyze(&self, messages: &[Message]) -> Result<String, StageError> {
        let response = self.llm.invoke(messages).await?;
        if let Some(usage) = response.usage {
            tracing::debug!(total_tokens = usage.total_tokens, "Analysis usage");
        }
        Ok(response.content)
    }
}
