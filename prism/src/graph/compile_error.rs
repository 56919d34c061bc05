//! Graph construction and compilation errors.
//!
//! Returned by `StateGraph::add_stage` when a registration would make the graph
//! invalid, and by `StateGraph::compile` for an empty graph.

use thiserror::Error;

/// Error when building or compiling a state graph.
///
/// Dependencies must be registered before the stages that name them, so every graph
/// that passes registration is acyclic.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A dependency names a stage that has not been registered via `add_stage`.
    #[error("stage {stage} depends on unknown stage: {dependency}")]
    StageNotFound { stage: String, dependency: String },

    /// A stage with this name is already registered.
    #[error("duplicate stage: {0}")]
    DuplicateStage(String),

    /// The stage lists itself as a dependency.
    #[error("stage depends on itself: {0}")]
    Cycle(String),

    /// `compile` was called before any stage was registered.
    #[error("graph has no stages")]
    EmptyGraph,
}
