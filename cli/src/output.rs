//! Rendering of run results and stage progress for the terminal.

use prism::{ResearchState, StageEvent};

pub const NO_ANSWER: &str = "no answer generated";

/// The answer to print; a missing or blank answer becomes [`NO_ANSWER`].
pub fn answer_text(state: &ResearchState) -> &str {
    state
        .final_answer
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(NO_ANSWER)
}

/// The whole final state as JSON. Compact (one line) unless `pretty`.
pub fn state_json(state: &ResearchState, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(state)
    } else {
        serde_json::to_string(state)
    }
}

/// One progress line for `--verbose`.
pub fn format_event(event: &StageEvent) -> String {
    match event {
        StageEvent::Started { stage } => format!("-> {}", stage),
        StageEvent::Completed { stage } => format!("ok {}", stage),
        StageEvent::Isolated { stage, error } => format!("-- {} (skipped: {})", stage, error),
        StageEvent::Failed { stage, error } => format!("!! {} failed: {}", stage, error),
    }
}
