//! Rewrites stale `nodeCode` pointers so every read points at the node that last wrote the variable.
//!
//! Generated graphs routinely reference a variable's original definition even after an
//! intermediate node reassigned it. The repairer walks the graph in topological order with a
//! [`ScopeTracker`] and rewrites each reference's `nodeCode` to the reaching writer. Only
//! `nodeCode` is ever touched: variable ids, names, node ids and edges are left as generated.
//!
//! The pass is total over individual references. A reference that cannot be resolved is left as
//! is and listed in the [`RepairReport`]. A property whose shape is not what its node kind
//! requires aborts the whole pass with a [`RepairError`]; rewrites applied before that point stay.

pub mod scope;

use crate::config::EngineConfig;
use crate::error::RepairError;
use crate::graph::walk::{for_each_expression_mut, for_each_expression_mut_except, walk_expression_mut};
use crate::graph::{Expression, Node, NodeVariableRef, WorkflowGraph};
use crate::sequencer::{TopologicalOrder, topological_order};
use scope::{
    BRANCHES, EXPRESSES, NodeRole, RIGHT_EXPRESS, ScopeTracker, assignment_fields_mut,
    assignment_list_mut, assignment_target, check_branches, define_params, expression_slot_mut,
};
use tracing::{debug, info, warn};

pub use scope::{ReachingDefinitions, Writer, reaching_definitions};

/// A reference whose `variableId` had no visible writer when it was repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub node_id: String,
    pub location: String,
    pub variable_id: String,
}

/// What a completed repair pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Number of `nodeCode` fields that were rewritten.
    pub repaired: usize,
    pub unresolved: Vec<UnresolvedReference>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.repaired == 0 && self.unresolved.is_empty()
    }
}

pub struct ReferenceRepairer<'a> {
    config: &'a EngineConfig,
}

impl<'a> ReferenceRepairer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Orders the graph and repairs it in place.
    pub fn repair(&self, graph: &mut WorkflowGraph) -> Result<RepairReport, RepairError> {
        let order = topological_order(graph)?;
        self.repair_in_order(graph, &order)
    }

    /// Repairs the graph in place following an order computed earlier for this same graph.
    pub fn repair_in_order(
        &self,
        graph: &mut WorkflowGraph,
        order: &TopologicalOrder,
    ) -> Result<RepairReport, RepairError> {
        info!(nodes = order.len(), "repairing variable references");
        let mut tracker = ScopeTracker::new();
        let mut report = RepairReport::default();

        for &index in order.indices() {
            let node = &mut graph.nodes[index];
            tracker.enter(node);
            let result = self.repair_node(node, &mut tracker, &mut report);
            tracker.leave();
            result?;
        }

        info!(
            repaired = report.repaired,
            unresolved = report.unresolved.len(),
            "variable reference repair finished"
        );
        Ok(report)
    }

    fn repair_node(
        &self,
        node: &mut Node,
        tracker: &mut ScopeTracker,
        report: &mut RepairReport,
    ) -> Result<(), RepairError> {
        match NodeRole::of(&node.kind, self.config) {
            NodeRole::Entry => {
                repair_reads(node, tracker, report);
                define_params(tracker, node, true);
            }
            NodeRole::Definition | NodeRole::Action => {
                // Reads come before the node's own definitions, so a binding never
                // resolves to the node that declares it.
                repair_reads(node, tracker, report);
                define_params(tracker, node, false);
            }
            NodeRole::BatchAssign => repair_batch_assign(node, tracker, report)?,
            NodeRole::Selector => {
                if let Some(branches) = node.properties.get(BRANCHES) {
                    check_branches(&node.id, branches)?;
                }
                repair_reads(node, tracker, report);
            }
            NodeRole::Exit => repair_reads(node, tracker, report),
        }
        Ok(())
    }
}

/// Repairs a graph in place with the default configuration.
pub fn repair_references(graph: &mut WorkflowGraph) -> Result<RepairReport, RepairError> {
    ReferenceRepairer::new(&EngineConfig::default()).repair(graph)
}

/// Repairs every reference in the node against the current scope.
fn repair_reads(node: &mut Node, tracker: &ScopeTracker, report: &mut RepairReport) {
    let node_id = node.id.clone();
    for_each_expression_mut(node, |location, expr| {
        if let Some(reference) = expr.as_node_variable_mut() {
            repair_reference(reference, tracker, &node_id, location, report);
        }
    });
}

/// Processes assignments in declaration order: each right-hand side is repaired before its
/// left-hand target is recorded as written by this node.
fn repair_batch_assign(
    node: &mut Node,
    tracker: &mut ScopeTracker,
    report: &mut RepairReport,
) -> Result<(), RepairError> {
    let node_id = node.id.clone();

    for_each_expression_mut_except(node, EXPRESSES, |location, expr| {
        if let Some(reference) = expr.as_node_variable_mut() {
            repair_reference(reference, tracker, &node_id, location, report);
        }
    });

    let Some(property) = node.properties.get_mut(EXPRESSES) else {
        return Ok(());
    };
    let assignments = assignment_list_mut(&node_id, property)?;

    for (i, item) in assignments.iter_mut().enumerate() {
        let fields = assignment_fields_mut(&node_id, i, item)?;

        let rhs_location = format!("{}[{}].{}", EXPRESSES, i, RIGHT_EXPRESS);
        if let Some(rhs) =
            expression_slot_mut(&node_id, EXPRESSES, &rhs_location, fields.get_mut(RIGHT_EXPRESS))?
        {
            walk_expression_mut(&rhs_location, rhs, &mut |location: &str, expr: &mut Expression| {
                if let Some(reference) = expr.as_node_variable_mut() {
                    repair_reference(reference, tracker, &node_id, location, report);
                }
            });
        }

        if let Some(target) = assignment_target(&node_id, i, fields)? {
            if !tracker.assign(target) {
                warn!(node_id = %node_id, variable_id = target, "assignment target has no visible definition");
            }
        }
    }
    debug!(node_id = %node_id, "batch assignment processed");
    Ok(())
}

fn repair_reference(
    reference: &mut NodeVariableRef,
    tracker: &ScopeTracker,
    node_id: &str,
    location: &str,
    report: &mut RepairReport,
) {
    let Some(variable_id) = reference.target_id() else {
        return;
    };

    let Some(writer) = tracker.resolve(variable_id) else {
        warn!(node_id, variable_id, location, "no visible definition for variable reference");
        report.unresolved.push(UnresolvedReference {
            node_id: node_id.to_string(),
            location: location.to_string(),
            variable_id: variable_id.to_string(),
        });
        return;
    };

    let expected = writer.node_code();
    if reference.node_code.as_deref() != Some(expected.as_str()) {
        debug!(
            node_id,
            variable_id,
            from = reference.node_code.as_deref().unwrap_or(""),
            to = %expected,
            "rewrote nodeCode"
        );
        reference.node_code = Some(expected);
        report.repaired += 1;
    }
}
