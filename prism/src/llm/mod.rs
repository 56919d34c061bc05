//! LLM client abstraction for the analysis stages.
//!
//! Stages never reach for a global model client: an `Arc<dyn LlmClient>` is passed
//! in when the research graph is built. [`ChatOpenAI`] talks to the OpenAI Chat
//! Completions API; [`MockLlm`] returns canned replies in tests.
//!
//! # Structured output
//!
//! [`LlmClient::invoke_structured`] asks for a JSON object matching an
//! [`OutputSchema`]. The default implementation appends the schema to the prompt,
//! calls [`invoke`](LlmClient::invoke) and parses the reply (a fenced ```` ```json ````
//! block is accepted). Replies that are not a JSON object with every required field
//! are `StageError::MalformedOutput`.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::StageError;
use crate::message::Message;

/// Token usage for one LLM call (prompt + completion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LlmUsage {
    /// Tokens in the prompt (input).
    pub prompt_tokens: u32,
    /// Tokens in the completion (output).
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from an LLM completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Token usage for this call, when the provider reports it.
    pub usage: Option<LlmUsage>,
}

/// Declared shape of a structured reply: a name and a JSON Schema for an object.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Object with one required field holding an ordered list of strings.
    pub fn string_list(name: impl Into<String>, field: &str, description: &str) -> Self {
        Self::new(
            name,
            json!({
                "type": "object",
                "properties": {
                    field: {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": description,
                    }
                },
                "required": [field],
            }),
        )
    }

    /// Names listed under `required`.
    pub fn required_fields(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn instruction(&self) -> String {
        format!(
            "Respond only with a JSON object named {} that matches this JSON Schema, with no other text:\n{}",
            self.name, self.schema
        )
    }

    /// Parses a model reply against this schema's required fields.
    pub fn parse_reply(&self, reply: &str) -> Result<Value, StageError> {
        let body = strip_code_fence(reply);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| StageError::MalformedOutput(format!("{}: {}", self.name, e)))?;
        let Some(object) = value.as_object() else {
            return Err(StageError::MalformedOutput(format!(
                "{}: expected a JSON object",
                self.name
            )));
        };
        if let Some(missing) = self
            .required_fields()
            .into_iter()
            .find(|f| !object.contains_key(*f))
        {
            return Err(StageError::MalformedOutput(format!(
                "{}: missing field {}",
                self.name, missing
            )));
        }
        Ok(value)
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// LLM client: given messages, returns the assistant's reply.
///
/// Implementations: `ChatOpenAI` (real API), `MockLlm` (tests).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, StageError>;

    /// Invoke one turn expecting a JSON object that matches `schema`.
    async fn invoke_structured(
        &self,
        messages: &[Message],
        schema: &OutputSchema,
    ) -> Result<Value, StageError> {
        let mut prompt = messages.to_vec();
        prompt.push(Message::system(schema.instruction()));
        let response = self.invoke(&prompt).await?;
        schema.parse_reply(&response.content)
    }
}
