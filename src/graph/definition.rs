use super::expression::Expression;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Port an edge leaves from when the generated document does not name one.
pub const DEFAULT_SOURCE_PORT: &str = "output";
/// Port an edge arrives at when the generated document does not name one.
pub const DEFAULT_TARGET_PORT: &str = "input";

/// All nodes and edges produced by a single generation attempt.
///
/// The graph is owned by the caller for the duration of one validation/repair call.
/// The repairer mutates it in place, so callers that need the original should clone first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl WorkflowGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Finds the first node carrying `id`.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }
}

/// A single step of the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: String,
    pub name: Option<String>,
    pub input_ports: Vec<String>,
    pub output_ports: Vec<String>,
    pub input_params: Vec<VariableBinding>,
    pub output_params: Vec<VariableBinding>,
    /// Kind-specific fields such as `branches` on a selector or `expresses` on a batch assignment.
    pub properties: BTreeMap<String, Property>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            input_ports: vec![DEFAULT_TARGET_PORT.to_string()],
            output_ports: vec![DEFAULT_SOURCE_PORT.to_string()],
            input_params: Vec::new(),
            output_params: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_input_param(mut self, binding: VariableBinding) -> Self {
        self.input_params.push(binding);
        self
    }

    pub fn with_output_param(mut self, binding: VariableBinding) -> Self {
        self.output_params.push(binding);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Property) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// The pointer other nodes use when they reference a variable this node wrote.
    pub fn node_code(&self) -> String {
        node_code(&self.kind, &self.id)
    }
}

/// Derives the `nodeCode` pointer for a node: `<kind>_<id>`.
///
/// Downstream tooling splits this string back into kind and id, so the format is fixed.
pub fn node_code(kind: &str, node_id: &str) -> String {
    format!("{}_{}", kind, node_id)
}

/// A control edge. Edges define the parent → child relation between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source_node_id: String,
    pub target_node_id: String,
    pub source_port: String,
    pub target_port: String,
}

impl Edge {
    pub fn new(source_node_id: impl Into<String>, target_node_id: impl Into<String>) -> Self {
        Self {
            source_node_id: source_node_id.into(),
            target_node_id: target_node_id.into(),
            source_port: DEFAULT_SOURCE_PORT.to_string(),
            target_port: DEFAULT_TARGET_PORT.to_string(),
        }
    }

    pub fn with_ports(mut self, source_port: impl Into<String>, target_port: impl Into<String>) -> Self {
        self.source_port = source_port.into();
        self.target_port = target_port.into();
        self
    }
}

/// A named variable declared on a node's input or output side.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBinding {
    /// Human-facing name. Not guaranteed unique.
    pub code: String,
    /// Globally unique key, conventionally `<ownerNodeId>_<code>`.
    pub id: String,
    pub data_type: Option<Value>,
    pub value_expr: Option<Expression>,
    /// Fields the engine does not interpret, kept for round-tripping.
    pub extra: Map<String, Value>,
}

impl VariableBinding {
    pub fn new(code: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            id: id.into(),
            data_type: None,
            value_expr: None,
            extra: Map::new(),
        }
    }

    /// Builds a binding whose id follows the `<ownerNodeId>_<code>` convention.
    pub fn conventional(owner_node_id: &str, code: impl Into<String>) -> Self {
        let code = code.into();
        let id = conventional_id(owner_node_id, &code);
        Self::new(code, id)
    }

    pub fn with_type(mut self, data_type: Value) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn with_value_expr(mut self, expr: Expression) -> Self {
        self.value_expr = Some(expr);
        self
    }
}

pub fn conventional_id(owner_node_id: &str, code: &str) -> String {
    format!("{}_{}", owner_node_id, code)
}

/// A value in a node's kind-specific property bag.
///
/// Expression-shaped values are recognised so the engine can walk them; anything else is
/// carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Expression(Expression),
    List(Vec<Property>),
    Record(BTreeMap<String, Property>),
    Opaque(Value),
}

impl Property {
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Property)>,
    {
        Property::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Property::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Property]> {
        match self {
            Property::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a field when this property is a record.
    pub fn get(&self, key: &str) -> Option<&Property> {
        match self {
            Property::Record(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Property::Opaque(Value::Null))
    }
}

impl From<Expression> for Property {
    fn from(expr: Expression) -> Self {
        Property::Expression(expr)
    }
}
