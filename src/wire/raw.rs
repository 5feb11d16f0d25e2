use super::convert::{expression_from_json, expression_to_json, property_from_json, property_to_json};
use crate::error::WorkflowConversionError;
use crate::graph::{
    DEFAULT_SOURCE_PORT, DEFAULT_TARGET_PORT, Edge, IntoWorkflow, Node, VariableBinding, WorkflowGraph,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

// --- JSON structs (generator output format) ---
// Identifier fields are read as raw values so that a missing or odd-typed id reaches the
// validator as a diagnostic instead of failing deserialization.

#[derive(Deserialize, Serialize, Debug, Default)]
pub(crate) struct RawWorkflow {
    #[serde(default)]
    nodes: Option<Vec<RawNode>>,
    #[serde(default)]
    edges: Option<Vec<RawEdge>>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_ports: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_ports: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_params: Option<Vec<RawBinding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_params: Option<Vec<RawBinding>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    data_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_expr: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawEdge {
    #[serde(default)]
    source_node_id: Option<Value>,
    #[serde(default)]
    target_node_id: Option<Value>,
    #[serde(default)]
    source_port: Option<String>,
    #[serde(default)]
    target_port: Option<String>,
}

/// Reads an identifier-like field. Missing and null become the empty string.
fn scalar_string(field: &str, value: Option<Value>) -> Result<String, WorkflowConversionError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        Some(other) => Err(WorkflowConversionError::ValidationError(format!(
            "field '{}' must be a string, found {}",
            field, other
        ))),
    }
}

fn convert_binding(raw: RawBinding) -> Result<VariableBinding, WorkflowConversionError> {
    Ok(VariableBinding {
        code: scalar_string("code", raw.code)?,
        id: scalar_string("id", raw.id)?,
        data_type: raw.data_type,
        value_expr: raw.value_expr.filter(|v| !v.is_null()).map(expression_from_json),
        extra: raw.extra,
    })
}

fn convert_bindings(raw: Option<Vec<RawBinding>>) -> Result<Vec<VariableBinding>, WorkflowConversionError> {
    raw.unwrap_or_default().into_iter().map(convert_binding).collect()
}

fn convert_node(raw: RawNode) -> Result<Node, WorkflowConversionError> {
    let id = scalar_string("id", raw.id)?;
    let kind = scalar_string("kind", raw.kind)?;
    let mut node = Node::new(id, kind);
    node.name = raw.name;
    if let Some(ports) = raw.input_ports {
        node.input_ports = ports;
    }
    if let Some(ports) = raw.output_ports {
        node.output_ports = ports;
    }
    node.input_params = convert_bindings(raw.input_params)?;
    node.output_params = convert_bindings(raw.output_params)?;
    node.properties = raw
        .extra
        .into_iter()
        .map(|(key, value)| {
            let property = property_from_json(Some(&key), value);
            (key, property)
        })
        .collect();
    Ok(node)
}

fn convert_edge(raw: RawEdge) -> Result<Edge, WorkflowConversionError> {
    Ok(Edge {
        source_node_id: scalar_string("sourceNodeId", raw.source_node_id)?,
        target_node_id: scalar_string("targetNodeId", raw.target_node_id)?,
        source_port: raw.source_port.unwrap_or_else(|| DEFAULT_SOURCE_PORT.to_string()),
        target_port: raw.target_port.unwrap_or_else(|| DEFAULT_TARGET_PORT.to_string()),
    })
}

impl IntoWorkflow for RawWorkflow {
    fn into_workflow(self) -> Result<WorkflowGraph, WorkflowConversionError> {
        let raw_nodes = self.nodes.unwrap_or_else(|| {
            warn!("workflow document has no 'nodes' array");
            Vec::new()
        });
        let raw_edges = self.edges.unwrap_or_else(|| {
            warn!("workflow document has no 'edges' array");
            Vec::new()
        });

        let nodes = raw_nodes
            .into_iter()
            .map(convert_node)
            .collect::<Result<Vec<_>, _>>()?;
        let edges = raw_edges
            .into_iter()
            .map(convert_edge)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkflowGraph::new(nodes, edges))
    }
}

fn binding_to_raw(binding: &VariableBinding) -> RawBinding {
    RawBinding {
        code: Some(Value::String(binding.code.clone())),
        id: Some(Value::String(binding.id.clone())),
        data_type: binding.data_type.clone(),
        value_expr: binding.value_expr.as_ref().map(expression_to_json),
        extra: binding.extra.clone(),
    }
}

impl From<&WorkflowGraph> for RawWorkflow {
    fn from(graph: &WorkflowGraph) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|node| RawNode {
                id: Some(Value::String(node.id.clone())),
                kind: Some(Value::String(node.kind.clone())),
                name: node.name.clone(),
                input_ports: Some(node.input_ports.clone()),
                output_ports: Some(node.output_ports.clone()),
                input_params: Some(node.input_params.iter().map(binding_to_raw).collect()),
                output_params: Some(node.output_params.iter().map(binding_to_raw).collect()),
                extra: node
                    .properties
                    .iter()
                    .map(|(k, v)| (k.clone(), property_to_json(v)))
                    .collect(),
            })
            .collect();
        let edges = graph
            .edges
            .iter()
            .map(|edge| RawEdge {
                source_node_id: Some(Value::String(edge.source_node_id.clone())),
                target_node_id: Some(Value::String(edge.target_node_id.clone())),
                source_port: Some(edge.source_port.clone()),
                target_port: Some(edge.target_port.clone()),
            })
            .collect();
        RawWorkflow {
            nodes: Some(nodes),
            edges: Some(edges),
        }
    }
}
