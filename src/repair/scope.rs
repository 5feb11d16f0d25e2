//! Reaching-definition state for the repair walk.
//!
//! The tracker keeps a global map of `variableId -> last writer` that grows as nodes are visited
//! in topological order, plus a write set local to the node currently being visited. A read
//! checks the local set first, so a write made earlier in the same node shadows the global one.

use crate::config::EngineConfig;
use crate::error::RepairError;
use crate::graph::kind::{BATCH_ASSIGN_VALUE, SELECTOR, VARIABLE_DEF};
use crate::graph::{Expression, Node, Property, WorkflowGraph, node_code};
use crate::sequencer::TopologicalOrder;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;
use tracing::debug;

/// Property holding the ordered assignments of a batch assignment node.
pub const EXPRESSES: &str = "expresses";
/// Property holding the branches of a selector node.
pub const BRANCHES: &str = "branches";
pub const LEFT_EXPRESS: &str = "leftExpress";
pub const RIGHT_EXPRESS: &str = "rightExpress";
pub const CONDITION_EXPR: &str = "conditionExpr";

/// How a node participates in data flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Publishes its declared params as workflow inputs.
    Entry,
    /// Declares fresh variables in its output params.
    Definition,
    /// Reassigns variables through an ordered list of assignments.
    BatchAssign,
    /// Reads variables in branch conditions.
    Selector,
    /// Reads variables into the workflow result.
    Exit,
    /// Any other kind: reads its inputs, and declares outputs if it has any.
    Action,
}

impl NodeRole {
    pub fn of(kind: &str, config: &EngineConfig) -> Self {
        if config.is_entry_kind(kind) {
            return NodeRole::Entry;
        }
        if config.is_exit_kind(kind) {
            return NodeRole::Exit;
        }
        match kind {
            VARIABLE_DEF => NodeRole::Definition,
            BATCH_ASSIGN_VALUE => NodeRole::BatchAssign,
            SELECTOR => NodeRole::Selector,
            _ => NodeRole::Action,
        }
    }
}

/// The node a variable's most recent write belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Writer {
    pub node_id: String,
    pub kind: String,
}

impl Writer {
    pub fn of(node: &Node) -> Self {
        Self {
            node_id: node.id.clone(),
            kind: node.kind.clone(),
        }
    }

    pub fn node_code(&self) -> String {
        node_code(&self.kind, &self.node_id)
    }
}

#[derive(Debug, Default)]
pub struct ScopeTracker {
    writers: AHashMap<String, Writer>,
    local_writes: AHashSet<String>,
    current: Option<Writer>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts visiting `node`. The local write set begins empty.
    pub fn enter(&mut self, node: &Node) {
        self.local_writes.clear();
        self.current = Some(Writer::of(node));
    }

    pub fn leave(&mut self) {
        self.local_writes.clear();
        self.current = None;
    }

    /// The writer a read of `variable_id` sees at this point of the walk.
    pub fn resolve(&self, variable_id: &str) -> Option<&Writer> {
        if self.local_writes.contains(variable_id) {
            if let Some(current) = &self.current {
                return Some(current);
            }
        }
        self.writers.get(variable_id)
    }

    /// Records a fresh definition owned by the current node.
    pub fn define(&mut self, variable_id: &str) {
        if let Some(current) = &self.current {
            debug!(variable_id, node_id = %current.node_id, "recorded variable definition");
            self.writers.insert(variable_id.to_string(), current.clone());
        }
    }

    /// Records a write made by the current node. Later reads within the node see it.
    ///
    /// A target with no visible definition is not recorded, so reads of it stay unresolved.
    /// Returns whether the write was recorded.
    pub fn assign(&mut self, variable_id: &str) -> bool {
        if self.resolve(variable_id).is_none() {
            return false;
        }
        let Some(current) = &self.current else {
            return false;
        };
        debug!(variable_id, node_id = %current.node_id, "variable reassigned");
        self.local_writes.insert(variable_id.to_string());
        self.writers.insert(variable_id.to_string(), current.clone());
        true
    }

    /// Every definition visible to the next node.
    pub fn visible(&self) -> &AHashMap<String, Writer> {
        &self.writers
    }
}

/// Definitions visible at the entry of each node, as computed by a full walk.
#[derive(Debug, Clone, Default)]
pub struct ReachingDefinitions {
    at_entry: AHashMap<String, AHashMap<String, Writer>>,
    at_exit: AHashMap<String, Writer>,
}

impl ReachingDefinitions {
    /// The `variableId -> writer` map in effect when `node_id` is reached.
    pub fn visible_at(&self, node_id: &str) -> Option<&AHashMap<String, Writer>> {
        self.at_entry.get(node_id)
    }

    pub fn writer_at(&self, node_id: &str, variable_id: &str) -> Option<&Writer> {
        self.visible_at(node_id)?.get(variable_id)
    }

    /// The map after the last node has been visited.
    pub fn final_writers(&self) -> &AHashMap<String, Writer> {
        &self.at_exit
    }
}

/// Walks `order` and records, for each node, which writer every visible variable resolves to.
///
/// Reads nothing and rewrites nothing; the repairer performs the same walk while mutating.
pub fn reaching_definitions(
    graph: &WorkflowGraph,
    order: &TopologicalOrder,
    config: &EngineConfig,
) -> Result<ReachingDefinitions, RepairError> {
    let mut tracker = ScopeTracker::new();
    let mut at_entry = AHashMap::with_capacity(order.len());

    for node in order.nodes(graph) {
        at_entry.insert(node.id.clone(), tracker.visible().clone());
        tracker.enter(node);
        match NodeRole::of(&node.kind, config) {
            NodeRole::Entry => define_params(&mut tracker, node, true),
            NodeRole::Definition | NodeRole::Action => define_params(&mut tracker, node, false),
            NodeRole::BatchAssign => {
                if let Some(property) = node.properties.get(EXPRESSES) {
                    for (i, item) in assignment_list(&node.id, property)?.iter().enumerate() {
                        let fields = assignment_fields(&node.id, i, item)?;
                        if let Some(target) = assignment_target(&node.id, i, fields)? {
                            tracker.assign(target);
                        }
                    }
                }
            }
            NodeRole::Selector | NodeRole::Exit => {}
        }
        tracker.leave();
    }

    Ok(ReachingDefinitions {
        at_entry,
        at_exit: tracker.visible().clone(),
    })
}

/// Publishes a node's output params (and input params too, for entry nodes) as definitions.
pub(crate) fn define_params(tracker: &mut ScopeTracker, node: &Node, include_inputs: bool) {
    let inputs = node.input_params.iter().filter(|_| include_inputs);
    for binding in inputs.chain(node.output_params.iter()) {
        if !binding.id.is_empty() {
            tracker.define(&binding.id);
        }
    }
}

fn malformed(node_id: &str, property: &str, reason: impl Into<String>) -> RepairError {
    RepairError::MalformedProperty {
        node_id: node_id.to_string(),
        property: property.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn assignment_list<'p>(
    node_id: &str,
    property: &'p Property,
) -> Result<&'p [Property], RepairError> {
    match property {
        Property::List(items) => Ok(items.as_slice()),
        p if p.is_null() => Ok(&[]),
        _ => Err(malformed(node_id, EXPRESSES, "expected a list of assignments")),
    }
}

pub(crate) fn assignment_list_mut<'p>(
    node_id: &str,
    property: &'p mut Property,
) -> Result<&'p mut [Property], RepairError> {
    match property {
        Property::List(items) => Ok(items.as_mut_slice()),
        p if p.is_null() => Ok(&mut []),
        _ => Err(malformed(node_id, EXPRESSES, "expected a list of assignments")),
    }
}

pub(crate) fn assignment_fields<'p>(
    node_id: &str,
    index: usize,
    item: &'p Property,
) -> Result<&'p BTreeMap<String, Property>, RepairError> {
    match item {
        Property::Record(fields) => Ok(fields),
        _ => Err(malformed(
            node_id,
            EXPRESSES,
            format!("assignment {} is not an object", index),
        )),
    }
}

pub(crate) fn assignment_fields_mut<'p>(
    node_id: &str,
    index: usize,
    item: &'p mut Property,
) -> Result<&'p mut BTreeMap<String, Property>, RepairError> {
    match item {
        Property::Record(fields) => Ok(fields),
        _ => Err(malformed(
            node_id,
            EXPRESSES,
            format!("assignment {} is not an object", index),
        )),
    }
}

/// Reads an expression-valued slot. A missing or `null` slot yields `None`.
pub(crate) fn expression_slot<'p>(
    node_id: &str,
    property: &str,
    location: &str,
    slot: Option<&'p Property>,
) -> Result<Option<&'p Expression>, RepairError> {
    match slot {
        None => Ok(None),
        Some(p) if p.is_null() => Ok(None),
        Some(Property::Expression(expr)) => Ok(Some(expr)),
        Some(_) => Err(malformed(
            node_id,
            property,
            format!("{} is not an expression", location),
        )),
    }
}

pub(crate) fn expression_slot_mut<'p>(
    node_id: &str,
    property: &str,
    location: &str,
    slot: Option<&'p mut Property>,
) -> Result<Option<&'p mut Expression>, RepairError> {
    match slot {
        None => Ok(None),
        Some(p) if p.is_null() => Ok(None),
        Some(Property::Expression(expr)) => Ok(Some(expr)),
        Some(_) => Err(malformed(
            node_id,
            property,
            format!("{} is not an expression", location),
        )),
    }
}

/// The variable id an assignment writes to, if its left side is a variable reference.
pub(crate) fn assignment_target<'p>(
    node_id: &str,
    index: usize,
    fields: &'p BTreeMap<String, Property>,
) -> Result<Option<&'p str>, RepairError> {
    let location = format!("{}[{}].{}", EXPRESSES, index, LEFT_EXPRESS);
    let target = expression_slot(node_id, EXPRESSES, &location, fields.get(LEFT_EXPRESS))?;
    Ok(target
        .and_then(Expression::as_node_variable)
        .and_then(|reference| reference.target_id()))
}

/// Ensures a selector's `branches` are a list of objects whose conditions are expressions.
pub(crate) fn check_branches(node_id: &str, property: &Property) -> Result<(), RepairError> {
    let branches = match property {
        Property::List(items) => items.as_slice(),
        p if p.is_null() => return Ok(()),
        _ => return Err(malformed(node_id, BRANCHES, "expected a list of branches")),
    };
    for (i, branch) in branches.iter().enumerate() {
        let Property::Record(fields) = branch else {
            return Err(malformed(
                node_id,
                BRANCHES,
                format!("branch {} is not an object", i),
            ));
        };
        let location = format!("{}[{}].{}", BRANCHES, i, CONDITION_EXPR);
        expression_slot(node_id, BRANCHES, &location, fields.get(CONDITION_EXPR))?;
    }
    Ok(())
}
