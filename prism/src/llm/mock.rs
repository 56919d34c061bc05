//! Mock LLM for tests.
//!
//! Returns a fixed reply, a reply computed from the prompt, or always fails.
//! Counts calls so tests can assert a stage did (or did not) reach the model.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::StageError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

type Responder = Box<dyn Fn(&[Message]) -> Result<String, StageError> + Send + Sync>;

enum Reply {
    Fixed(String),
    Computed(Responder),
    Fail(String),
}

/// Mock LLM with a configurable reply.
pub struct MockLlm {
    reply: Reply,
    calls: AtomicUsize,
}

impl std::fmt::Debug for MockLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlm")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl MockLlm {
    /// Always replies with `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self::from_reply(Reply::Fixed(content.into()))
    }

    /// Replies with whatever `responder` returns for the prompt.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&[Message]) -> Result<String, StageError> + Send + Sync + 'static,
    {
        Self::from_reply(Reply::Computed(Box::new(responder)))
    }

    /// Every call fails with `StageError::ExecutionFailed(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_reply(Reply::Fail(message.into()))
    }

    fn from_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `invoke` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = match &self.reply {
            Reply::Fixed(content) => content.clone(),
            Reply::Computed(responder) => responder(messages)?,
            Reply::Fail(message) => return Err(StageError::ExecutionFailed(message.clone())),
        };
        Ok(LlmResponse {
            content,
            usage: None,
        })
    }
}
