//! Progress events emitted by `CompiledStateGraph::invoke_with_events`.

use serde::Serialize;

/// Lifecycle of one stage within a run.
///
/// Every scheduled stage emits `Started` followed by exactly one of `Completed`,
/// `Isolated` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageEvent {
    Started { stage: String },
    /// The stage's update was merged into the state.
    Completed { stage: String },
    /// The stage failed under `ErrorPolicy::Isolate`; the run continues.
    Isolated { stage: String, error: String },
    /// The stage failed under `ErrorPolicy::Propagate`; the run will report an error.
    Failed { stage: String, error: String },
}

impl StageEvent {
    pub fn stage(&self) -> &str {
        match self {
            StageEvent::Started { stage }
            | StageEvent::Completed { stage }
            | StageEvent::Isolated { stage, .. }
            | StageEvent::Failed { stage, .. } => stage,
        }
    }

    /// True for `Completed`, `Isolated` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StageEvent::Started { .. })
    }
}
