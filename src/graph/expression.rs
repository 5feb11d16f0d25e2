use serde_json::{Map, Value};
use std::fmt;

/// `kind` tag of a variable reference on the wire.
pub const NODE_VARIABLE: &str = "nodeVariable";
/// `kind` tags of expressions that nest sub-expressions.
pub const COMPOSITE_KINDS: [&str; 2] = ["logic", "compare"];

/// An expression found in a binding or a node's property bag.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    NodeVariableRef(NodeVariableRef),
    Composite(CompositeExpression),
    /// Any structured value in an expression position whose shape the engine does not know.
    Unrecognized(Value),
}

/// A constant such as `stringConst` or `numberConst`. Opaque to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: String,
    pub value: Value,
    pub extra: Map<String, Value>,
}

/// A pointer to a variable binding owned by another (or the same) node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeVariableRef {
    /// Derived pointer `<kind>_<nodeId>` of the node the read resolves to.
    pub node_code: Option<String>,
    /// The binding `code` as written at the point of reference. A display hint only.
    pub variable: Option<String>,
    /// The binding `id` being referenced. Authoritative.
    pub variable_id: Option<String>,
    pub extra: Map<String, Value>,
}

impl NodeVariableRef {
    /// The referenced id, if present and non-empty.
    pub fn target_id(&self) -> Option<&str> {
        self.variable_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A logic or compare expression. Operands may sit in an ordered list, in a left/right pair, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeExpression {
    pub kind: String,
    pub operator: Option<String>,
    pub operands: Vec<Expression>,
    pub left: Option<Box<Expression>>,
    pub right: Option<Box<Expression>>,
    pub extra: Map<String, Value>,
}

impl CompositeExpression {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            operator: None,
            operands: Vec::new(),
            left: None,
            right: None,
            extra: Map::new(),
        }
    }
}

impl Expression {
    pub fn node_variable(
        node_code: impl Into<String>,
        variable: impl Into<String>,
        variable_id: impl Into<String>,
    ) -> Self {
        Expression::NodeVariableRef(NodeVariableRef {
            node_code: Some(node_code.into()),
            variable: Some(variable.into()),
            variable_id: Some(variable_id.into()),
            extra: Map::new(),
        })
    }

    pub fn literal(kind: impl Into<String>, value: Value) -> Self {
        Expression::Literal(Literal {
            kind: kind.into(),
            value,
            extra: Map::new(),
        })
    }

    pub fn string_const(value: impl Into<String>) -> Self {
        Self::literal("stringConst", Value::String(value.into()))
    }

    /// `logic` expression over an ordered operand list.
    pub fn logic(operator: impl Into<String>, operands: Vec<Expression>) -> Self {
        let mut composite = CompositeExpression::new("logic");
        composite.operator = Some(operator.into());
        composite.operands = operands;
        Expression::Composite(composite)
    }

    /// `compare` expression over a left/right pair.
    pub fn compare(operator: impl Into<String>, left: Expression, right: Expression) -> Self {
        let mut composite = CompositeExpression::new("compare");
        composite.operator = Some(operator.into());
        composite.left = Some(Box::new(left));
        composite.right = Some(Box::new(right));
        Expression::Composite(composite)
    }

    pub fn as_node_variable(&self) -> Option<&NodeVariableRef> {
        match self {
            Expression::NodeVariableRef(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn as_node_variable_mut(&mut self) -> Option<&mut NodeVariableRef> {
        match self {
            Expression::NodeVariableRef(reference) => Some(reference),
            _ => None,
        }
    }

    /// Counts the variable references in this expression tree.
    pub fn reference_count(&self) -> usize {
        match self {
            Expression::NodeVariableRef(_) => 1,
            Expression::Composite(c) => {
                c.operands.iter().map(Expression::reference_count).sum::<usize>()
                    + c.left.as_deref().map_or(0, Expression::reference_count)
                    + c.right.as_deref().map_or(0, Expression::reference_count)
            }
            Expression::Literal(_) | Expression::Unrecognized(_) => 0,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(lit) => write!(f, "{}", lit.value),
            Expression::NodeVariableRef(r) => write!(
                f,
                "{}.{}",
                r.node_code.as_deref().unwrap_or("?"),
                r.variable.as_deref().or(r.variable_id.as_deref()).unwrap_or("?")
            ),
            Expression::Composite(c) => {
                let op = c.operator.as_deref().unwrap_or(c.kind.as_str());
                let mut parts: Vec<String> = c.operands.iter().map(ToString::to_string).collect();
                if let Some(left) = &c.left {
                    parts.push(left.to_string());
                }
                if let Some(right) = &c.right {
                    parts.push(right.to_string());
                }
                write!(f, "({})", parts.join(&format!(" {} ", op)))
            }
            Expression::Unrecognized(_) => write!(f, "<unrecognized>"),
        }
    }
}
