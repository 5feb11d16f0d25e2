//! Common test utilities for building workflow graphs.
use kensa::graph::kind::{BATCH_ASSIGN_VALUE, END, SELECTOR, START, VARIABLE_DEF};
use kensa::graph::{conventional_id, for_each_node_variable, node_code};
use kensa::prelude::*;
use serde_json::{Value, json};

/// A reference to `code` as declared by the node `owner_id` of kind `owner_kind`.
#[allow(dead_code)]
pub fn var_ref(owner_kind: &str, owner_id: &str, code: &str) -> Expression {
    Expression::node_variable(
        node_code(owner_kind, owner_id),
        code,
        conventional_id(owner_id, code),
    )
}

#[allow(dead_code)]
pub fn definition(id: &str, codes: &[&str]) -> Node {
    codes.iter().fold(Node::new(id, VARIABLE_DEF), |node, code| {
        node.with_output_param(VariableBinding::conventional(id, *code))
    })
}

/// One `{ leftExpress, rightExpress }` entry of a batch assignment.
#[allow(dead_code)]
pub fn assignment(target: Expression, value: Expression) -> Property {
    Property::record([
        ("leftExpress", Property::Expression(target)),
        ("rightExpress", Property::Expression(value)),
    ])
}

#[allow(dead_code)]
pub fn batch_assign(id: &str, assignments: Vec<Property>) -> Node {
    Node::new(id, BATCH_ASSIGN_VALUE).with_property("expresses", Property::List(assignments))
}

#[allow(dead_code)]
pub fn selector(id: &str, conditions: Vec<Expression>) -> Node {
    let branches = conditions
        .into_iter()
        .map(|condition| Property::record([("conditionExpr", Property::Expression(condition))]))
        .collect();
    Node::new(id, SELECTOR).with_property("branches", Property::List(branches))
}

/// An `end` node whose input params read the given expressions.
#[allow(dead_code)]
pub fn end_reading(id: &str, reads: Vec<(&str, Expression)>) -> Node {
    reads.into_iter().fold(Node::new(id, END), |node, (code, expr)| {
        node.with_input_param(VariableBinding::conventional(id, code).with_value_expr(expr))
    })
}

/// Links the nodes into a single chain in the order given.
#[allow(dead_code)]
pub fn chain(nodes: Vec<Node>) -> WorkflowGraph {
    let edges = nodes
        .windows(2)
        .map(|pair| Edge::new(pair[0].id.clone(), pair[1].id.clone()))
        .collect();
    WorkflowGraph::new(nodes, edges)
}

/// A minimal valid graph: `start -> end`.
#[allow(dead_code)]
pub fn start_end() -> WorkflowGraph {
    chain(vec![Node::new("start_1", START), Node::new("end_1", END)])
}

/// Every `(location, nodeCode)` pair read by the node `node_id`.
#[allow(dead_code)]
pub fn node_codes_in(graph: &WorkflowGraph, node_id: &str) -> Vec<(String, Option<String>)> {
    let node = graph.node(node_id).expect("node exists");
    let mut codes = Vec::new();
    for_each_node_variable(node, |location, reference| {
        codes.push((location.to_string(), reference.node_code.clone()));
    });
    codes
}

/// The `nodeCode` of the reference at `location` inside `node_id`.
#[allow(dead_code)]
pub fn node_code_at(graph: &WorkflowGraph, node_id: &str, location: &str) -> Option<String> {
    node_codes_in(graph, node_id)
        .into_iter()
        .find(|(loc, _)| loc == location)
        .and_then(|(_, code)| code)
}

/// The coffee-machine workflow as a generator would emit it.
///
/// `variableDef_1` declares `coffeeResult` and `finalResult`; `batchAssignValue_1` first sets
/// `finalResult` from a literal and then copies `coffeeResult` into it. The end node reads both
/// variables through pointers that still name `variableDef_1`.
#[allow(dead_code)]
pub fn coffee_workflow_json() -> Value {
    json!({
        "nodes": [
            { "id": "start_1", "kind": "start", "name": "Start" },
            {
                "id": "variableDef_1",
                "kind": "variableDef",
                "name": "Declare results",
                "outputParams": [
                    { "code": "coffeeResult", "id": "variableDef_1_coffeeResult", "type": { "kind": "string" } },
                    { "code": "finalResult", "id": "variableDef_1_finalResult", "type": { "kind": "string" } }
                ]
            },
            { "id": "coffee_1", "kind": "coffeeMachine", "name": "Brew" },
            {
                "id": "batchAssignValue_1",
                "kind": "batchAssignValue",
                "expresses": [
                    {
                        "kind": "assignValue",
                        "leftExpress": { "kind": "nodeVariable", "nodeCode": "variableDef_variableDef_1", "variable": "finalResult", "variableId": "variableDef_1_finalResult" },
                        "rightExpress": { "kind": "stringConst", "value": "pending" }
                    },
                    {
                        "kind": "assignValue",
                        "leftExpress": { "kind": "nodeVariable", "nodeCode": "variableDef_variableDef_1", "variable": "finalResult", "variableId": "variableDef_1_finalResult" },
                        "rightExpress": { "kind": "nodeVariable", "nodeCode": "start_start_1", "variable": "coffeeResult", "variableId": "variableDef_1_coffeeResult" }
                    }
                ]
            },
            {
                "id": "selector_1",
                "kind": "selector",
                "branches": [
                    {
                        "name": "done",
                        "conditionExpr": {
                            "kind": "compare",
                            "operator": "equal",
                            "leftExpress": { "kind": "nodeVariable", "nodeCode": "variableDef_variableDef_1", "variable": "finalResult", "variableId": "variableDef_1_finalResult" },
                            "rightExpress": { "kind": "stringConst", "value": "done" }
                        }
                    }
                ]
            },
            {
                "id": "end_1",
                "kind": "end",
                "inputParams": [
                    {
                        "code": "result",
                        "id": "end_1_result",
                        "valueExpr": { "kind": "nodeVariable", "nodeCode": "variableDef_variableDef_1", "variable": "finalResult", "variableId": "variableDef_1_finalResult" }
                    }
                ]
            }
        ],
        "edges": [
            { "sourceNodeId": "start_1", "targetNodeId": "variableDef_1" },
            { "sourceNodeId": "variableDef_1", "targetNodeId": "coffee_1" },
            { "sourceNodeId": "coffee_1", "targetNodeId": "batchAssignValue_1" },
            { "sourceNodeId": "batchAssignValue_1", "targetNodeId": "selector_1", "sourcePort": "output", "targetPort": "input" },
            { "sourceNodeId": "selector_1", "targetNodeId": "end_1" }
        ]
    })
}

#[allow(dead_code)]
pub fn coffee_graph() -> WorkflowGraph {
    kensa::wire::workflow_from_value(coffee_workflow_json()).expect("coffee workflow parses")
}

/// A pipeline that accepts the coffee machine device kind.
#[allow(dead_code)]
pub fn coffee_pipeline() -> Pipeline {
    Pipeline::builder(KindRegistry::builtin().with_device_kind("coffeeMachine")).build()
}
