//! State types that can flow through a [`StateGraph`](super::StateGraph).

use std::fmt::Debug;

use crate::channels::ChannelError;

/// A run state that stages read and update through partial updates.
///
/// Stages receive a clone of the state and return `Self::Update`; the executor merges
/// updates one at a time, in completion order. Implementations decide the per-field
/// strategy (write-once, append, replace) in [`apply`](GraphState::apply).
pub trait GraphState: Clone + Send + Sync + Debug + 'static {
    /// Partial update produced by one stage.
    type Update: Send + Debug + 'static;

    /// Merges one stage's update into `self`.
    ///
    /// Returning an error aborts the run with `RunError::Merge`.
    fn apply(&mut self, update: Self::Update) -> Result<(), ChannelError>;
}
