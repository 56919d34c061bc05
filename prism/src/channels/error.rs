//! Channel-related errors.

use thiserror::Error;

/// Errors raised while merging updates or tracking barriers.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Invalid update operation (e.g. a barrier name that was never expected).
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// A write-once field received a second write.
    #[error("field already written: {0}")]
    AlreadyWritten(String),
}
