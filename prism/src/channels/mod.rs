//! Channels: fan-in tracking and state merge strategies.
//!
//! - [`NamedBarrierValue`]: available once every expected name has been seen. The
//!   executor keeps one per stage, keyed by dependency names, to know when a
//!   fan-in stage becomes eligible.
//! - [`StateUpdater`]: how a stage's partial update is merged into the run state.
//!   [`MergeUpdater`] (default) delegates to [`GraphState::apply`](crate::graph::GraphState::apply);
//!   [`FieldBasedUpdater`] wraps a closure.
//! - [`write_once`] / [`write_once_entry`]: field-level write-once helpers used by
//!   state types to implement `apply`.

mod error;
mod named_barrier;
mod updater;

pub use error::ChannelError;
pub use named_barrier::NamedBarrierValue;
pub use updater::{
    boxed_updater, write_once, write_once_entry, BoxedStateUpdater, FieldBasedUpdater,
    MergeUpdater, StateUpdater,
};
