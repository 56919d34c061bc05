//! Graph visualization utilities.
//!
//! Exports a compiled graph's structure as Graphviz DOT or plain text for
//! debugging and the `prism graph` command.

use super::{CompiledStateGraph, ErrorPolicy, GraphState};

/// Generate Graphviz DOT format representation of the graph.
///
/// Edges point from a dependency to the stage waiting on it. Stages with
/// `ErrorPolicy::Isolate` are drawn dashed.
pub fn generate_dot<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: GraphState,
{
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box];\n\n");

    for id in graph.stage_ids() {
        if graph.policy(id) == Some(ErrorPolicy::Isolate) {
            dot.push_str(&format!("  \"{}\" [style=dashed];\n", id));
        } else {
            dot.push_str(&format!("  \"{}\";\n", id));
        }
    }

    dot.push('\n');

    for id in graph.stage_ids() {
        for dep in graph.dependencies(id).unwrap_or_default() {
            dot.push_str(&format!("  \"{}\" -> \"{}\";\n", dep, id));
        }
    }

    dot.push_str("}\n");
    dot
}

/// Generate a simple text representation of the graph structure.
pub fn generate_text<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: GraphState,
{
    let ids = graph.stage_ids();
    let mut text = String::from("Graph Structure:\n");
    text.push_str(&format!("Stages: {}\n", ids.len()));
    text.push_str("\nExecution Order:\n");
    for id in ids {
        let deps = graph.dependencies(id).unwrap_or_default();
        let mut line = if deps.is_empty() {
            format!("  {} (no dependencies)", id)
        } else {
            format!("  {} <- {}", id, deps.join(", "))
        };
        if graph.policy(id) == Some(ErrorPolicy::Isolate) {
            line.push_str(" [isolated]");
        }
        text.push_str(&line);
        text.push('\n');
    }
    text
}
