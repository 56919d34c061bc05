//! Stage and run error types.
//!
//! [`StageError`] is what a single stage returns; [`RunError`] is what the run
//! boundary ([`CompiledStateGraph::invoke`](crate::graph::CompiledStateGraph::invoke))
//! reports when a run cannot complete.

use thiserror::Error;

use crate::channels::ChannelError;

/// Stage execution error.
///
/// Returned by `Stage::run` and by LLM clients. Whether it aborts the run depends on
/// the stage's [`ErrorPolicy`](crate::graph::ErrorPolicy).
#[derive(Debug, Error)]
pub enum StageError {
    /// Execution failed with a message (e.g. LLM provider error, request build failure).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The model returned output that does not match the declared schema.
    #[error("malformed structured output: {0}")]
    MalformedOutput(String),
}

/// Run-level error: the run could not produce a final state.
///
/// Distinct from a run that completes with `final_answer` absent.
#[derive(Debug, Error)]
pub enum RunError {
    /// A stage with `ErrorPolicy::Propagate` failed.
    #[error("stage {stage} failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: StageError,
    },

    /// The task running a stage panicked or was aborted.
    #[error("stage {stage} panicked: {message}")]
    StagePanicked { stage: String, message: String },

    /// A stage's update could not be merged (e.g. two stages wrote the same field).
    #[error("merging output of stage {stage} failed: {source}")]
    Merge {
        stage: String,
        #[source]
        source: ChannelError,
    },

    /// The scheduler ran out of eligible stages before every stage was terminal.
    #[error("run ended with stages never scheduled: {0:?}")]
    Incomplete(Vec<String>),
}

impl RunError {
    /// Name of the stage the error is attributed to, when there is one.
    pub fn stage(&self) -> Option<&str> {
        match self {
            RunError::StageFailed { stage, .. }
            | RunError::StagePanicked { stage, .. }
            | RunError::Merge { stage, .. } => Some(stage),
            RunError::Incomplete(_) => None,
        }
    }
}
