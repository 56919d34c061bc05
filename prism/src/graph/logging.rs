//! Structured logging for graph execution events.

use crate::error::{RunError, StageError};

/// Log stage execution start.
pub fn log_stage_start(stage: &str) {
    tracing::debug!(stage = stage, "Starting stage");
}

/// Log a stage whose update was merged.
pub fn log_stage_complete(stage: &str) {
    tracing::debug!(stage = stage, "Stage complete");
}

/// Log a stage failure. Isolated failures are warnings; propagated ones are errors.
pub fn log_stage_failed(stage: &str, error: &StageError, isolated: bool) {
    if isolated {
        tracing::warn!(stage = stage, %error, "Stage failed; continuing without its output");
    } else {
        tracing::error!(stage = stage, %error, "Stage failed");
    }
}

/// Log graph execution start.
pub fn log_graph_start(stage_count: usize) {
    tracing::info!(stage_count, "Starting graph execution");
}

/// Log graph execution completion.
pub fn log_graph_complete() {
    tracing::info!("Graph execution complete");
}

/// Log graph execution error.
pub fn log_graph_error(error: &RunError) {
    tracing::error!(%error, "Graph execution error");
}
