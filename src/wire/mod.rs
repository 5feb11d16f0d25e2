//! The JSON format graph generators emit, and conversion to and from [`WorkflowGraph`].
//!
//! A document looks like `{ "nodes": [...], "edges": [...] }` with camelCase field names.
//! Node fields the model does not name (`branches`, `expresses`, layout hints, ...) are kept in
//! the node's property bag and written back unchanged.

mod convert;
mod raw;

use crate::error::WireError;
use crate::graph::{IntoWorkflow, WorkflowGraph};
use raw::RawWorkflow;
use serde_json::Value;
use tracing::debug;

pub use convert::{expression_from_json, expression_to_json, property_from_json, property_to_json};

const FENCE: &str = "```";

/// Strips a surrounding markdown code fence from a model response.
///
/// The content runs from the line after the opening fence up to the last fence. Unfenced text is
/// returned trimmed, and blank input yields `{}`.
pub fn extract_json_block(response: &str) -> &str {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return "{}";
    }
    if trimmed.starts_with(FENCE) {
        if let (Some(first_newline), Some(last_fence)) = (trimmed.find('\n'), trimmed.rfind(FENCE)) {
            if last_fence > first_newline {
                return trimmed[first_newline + 1..last_fence].trim();
            }
        }
    }
    trimmed
}

/// Parses a workflow document, fenced or bare, into the graph model.
pub fn parse_workflow(text: &str) -> Result<WorkflowGraph, WireError> {
    let json = extract_json_block(text);
    let raw: RawWorkflow = serde_json::from_str(json)?;
    let graph = raw.into_workflow()?;
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "parsed workflow document"
    );
    Ok(graph)
}

/// Parses an already-decoded JSON value.
pub fn workflow_from_value(value: Value) -> Result<WorkflowGraph, WireError> {
    let raw: RawWorkflow = serde_json::from_value(value)?;
    Ok(raw.into_workflow()?)
}

pub fn to_json(graph: &WorkflowGraph) -> Value {
    // Serializing plain maps, strings and values cannot fail.
    serde_json::to_value(RawWorkflow::from(graph)).unwrap_or(Value::Null)
}

pub fn to_json_string(graph: &WorkflowGraph) -> Result<String, WireError> {
    Ok(serde_json::to_string(&RawWorkflow::from(graph))?)
}

pub fn to_json_string_pretty(graph: &WorkflowGraph) -> Result<String, WireError> {
    Ok(serde_json::to_string_pretty(&RawWorkflow::from(graph))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_block() {
        let response = "```json\n{\"nodes\": []}\n```";
        assert_eq!(extract_json_block(response), "{\"nodes\": []}");
    }

    #[test]
    fn bare_json_is_trimmed() {
        assert_eq!(extract_json_block("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn blank_input_is_empty_object() {
        assert_eq!(extract_json_block("   \n"), "{}");
    }

    #[test]
    fn unterminated_fence_is_left_alone() {
        assert_eq!(extract_json_block("```json"), "```json");
    }

    #[test]
    fn fenced_response_parses() {
        let graph = parse_workflow("```\n{\"nodes\": [{\"id\": \"a\", \"kind\": \"start\"}], \"edges\": []}\n```").unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].kind, "start");
    }
}
