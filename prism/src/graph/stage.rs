//! Stage trait: one named unit of work in a StateGraph.
//!
//! Receives a snapshot of the state `S`, returns a partial update `S::Update`.
//! Used by `StateGraph::add_stage` and `CompiledStateGraph::invoke`.

use std::future::Future;

use async_trait::async_trait;

use crate::error::StageError;

use super::GraphState;

/// One step in a graph: state snapshot in, partial update out.
///
/// The snapshot contains every field written by the stage's transitive dependencies.
/// The stage must only write fields no concurrently running stage writes.
#[async_trait]
pub trait Stage<S>: Send + Sync
where
    S: GraphState,
{
    async fn run(&self, state: S) -> Result<S::Update, StageError>;
}

/// What the executor does when a stage returns `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Fail the run with `RunError::StageFailed` once in-flight stages finish.
    #[default]
    Propagate,
    /// Log the error, treat the stage as terminal without writing, and keep going.
    Isolate,
}

/// Adapts an async closure into a [`Stage`].
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use prism::graph::{FnStage, Stage};
/// use prism::{ResearchState, ResearchUpdate};
///
/// let noop: Arc<dyn Stage<ResearchState>> =
///     Arc::new(FnStage::new(|_state: ResearchState| async move {
///         Ok::<_, prism::StageError>(ResearchUpdate::default())
///     }));
/// ```
pub struct FnStage<F> {
    f: F,
}

impl<F> FnStage<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<S, F, Fut> Stage<S> for FnStage<F>
where
    S: GraphState,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S::Update, StageError>> + Send + 'static,
{
    async fn run(&self, state: S) -> Result<S::Update, StageError> {
        (self.f)(state).await
    }
}
