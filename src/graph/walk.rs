//! Generic traversal over every expression a node carries.
//!
//! Visitors receive a location path (`outputParams[0].valueExpr`,
//! `branches[1].conditionExpr.expresses[0]`, ...) alongside each expression, so diagnostics can
//! point at the exact spot without knowing anything about the node's kind.

use super::definition::{Node, Property, VariableBinding};
use super::expression::{Expression, NodeVariableRef};

/// Visits every expression in `node`, parents before their operands.
pub fn for_each_expression<F>(node: &Node, mut visitor: F)
where
    F: FnMut(&str, &Expression),
{
    visit_bindings("inputParams", &node.input_params, &mut visitor);
    visit_bindings("outputParams", &node.output_params, &mut visitor);
    for (key, property) in &node.properties {
        visit_property(key, property, &mut visitor);
    }
}

/// Mutable counterpart of [`for_each_expression`].
pub fn for_each_expression_mut<F>(node: &mut Node, visitor: F)
where
    F: FnMut(&str, &mut Expression),
{
    walk_node_mut(node, None, visitor);
}

/// Like [`for_each_expression_mut`] but leaves the property named `skipped` alone.
pub fn for_each_expression_mut_except<F>(node: &mut Node, skipped: &str, visitor: F)
where
    F: FnMut(&str, &mut Expression),
{
    walk_node_mut(node, Some(skipped), visitor);
}

/// Visits every variable reference in `node`.
pub fn for_each_node_variable<F>(node: &Node, mut visitor: F)
where
    F: FnMut(&str, &NodeVariableRef),
{
    for_each_expression(node, |path, expr| {
        if let Expression::NodeVariableRef(reference) = expr {
            visitor(path, reference);
        }
    });
}

/// Visits `expr` and all of its nested operands.
pub fn walk_expression<F>(path: &str, expr: &Expression, visitor: &mut F)
where
    F: FnMut(&str, &Expression),
{
    visitor(path, expr);
    if let Expression::Composite(composite) = expr {
        for (i, operand) in composite.operands.iter().enumerate() {
            walk_expression(&format!("{}.expresses[{}]", path, i), operand, visitor);
        }
        if let Some(left) = &composite.left {
            walk_expression(&format!("{}.leftExpress", path), left, visitor);
        }
        if let Some(right) = &composite.right {
            walk_expression(&format!("{}.rightExpress", path), right, visitor);
        }
    }
}

pub fn walk_expression_mut<F>(path: &str, expr: &mut Expression, visitor: &mut F)
where
    F: FnMut(&str, &mut Expression),
{
    visitor(path, expr);
    if let Expression::Composite(composite) = expr {
        for (i, operand) in composite.operands.iter_mut().enumerate() {
            walk_expression_mut(&format!("{}.expresses[{}]", path, i), operand, visitor);
        }
        if let Some(left) = composite.left.as_deref_mut() {
            walk_expression_mut(&format!("{}.leftExpress", path), left, visitor);
        }
        if let Some(right) = composite.right.as_deref_mut() {
            walk_expression_mut(&format!("{}.rightExpress", path), right, visitor);
        }
    }
}

fn visit_bindings<F>(section: &str, bindings: &[VariableBinding], visitor: &mut F)
where
    F: FnMut(&str, &Expression),
{
    for (i, binding) in bindings.iter().enumerate() {
        if let Some(expr) = &binding.value_expr {
            walk_expression(&format!("{}[{}].valueExpr", section, i), expr, visitor);
        }
    }
}

fn visit_property<F>(path: &str, property: &Property, visitor: &mut F)
where
    F: FnMut(&str, &Expression),
{
    match property {
        Property::Expression(expr) => walk_expression(path, expr, visitor),
        Property::List(items) => {
            for (i, item) in items.iter().enumerate() {
                visit_property(&format!("{}[{}]", path, i), item, visitor);
            }
        }
        Property::Record(fields) => {
            for (key, value) in fields {
                visit_property(&format!("{}.{}", path, key), value, visitor);
            }
        }
        Property::Opaque(_) => {}
    }
}

fn walk_node_mut<F>(node: &mut Node, skipped: Option<&str>, mut visitor: F)
where
    F: FnMut(&str, &mut Expression),
{
    visit_bindings_mut("inputParams", &mut node.input_params, &mut visitor);
    visit_bindings_mut("outputParams", &mut node.output_params, &mut visitor);
    for (key, property) in node.properties.iter_mut() {
        if skipped == Some(key.as_str()) {
            continue;
        }
        visit_property_mut(key, property, &mut visitor);
    }
}

fn visit_bindings_mut<F>(section: &str, bindings: &mut [VariableBinding], visitor: &mut F)
where
    F: FnMut(&str, &mut Expression),
{
    for (i, binding) in bindings.iter_mut().enumerate() {
        if let Some(expr) = binding.value_expr.as_mut() {
            walk_expression_mut(&format!("{}[{}].valueExpr", section, i), expr, visitor);
        }
    }
}

fn visit_property_mut<F>(path: &str, property: &mut Property, visitor: &mut F)
where
    F: FnMut(&str, &mut Expression),
{
    match property {
        Property::Expression(expr) => walk_expression_mut(path, expr, visitor),
        Property::List(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                visit_property_mut(&format!("{}[{}]", path, i), item, visitor);
            }
        }
        Property::Record(fields) => {
            for (key, value) in fields.iter_mut() {
                visit_property_mut(&format!("{}.{}", path, key), value, visitor);
            }
        }
        Property::Opaque(_) => {}
    }
}
