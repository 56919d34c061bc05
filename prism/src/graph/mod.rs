//! Stage graph: named stages with declared dependencies, compiled and invoked as a DAG.
//!
//! [`StateGraph`]: register stages with `add_stage`, then `compile` and `invoke`
//! with an initial state. Stages whose dependencies are all terminal run
//! concurrently; fan-in stages wait for every dependency.

mod compile_error;
mod compiled;
mod event;
mod graph_state;
mod logging;
mod stage;
mod state_graph;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use event::StageEvent;
pub use graph_state::GraphState;
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_stage_complete, log_stage_failed,
    log_stage_start,
};
pub use stage::{ErrorPolicy, FnStage, Stage};
pub use state_graph::StateGraph;
pub use visualization::{generate_dot, generate_text};
