use super::report::{Diagnostic, EdgeEnd, Endpoint, ValidationReport};
use crate::config::EngineConfig;
use crate::graph::{KindOracle, WorkflowGraph};
use ahash::AHashSet;
use itertools::Itertools;
use tracing::{debug, info};

/// Checks the shape of a graph: node identity, kinds, entry/exit presence and edge endpoints.
///
/// Malformed input is reported, never raised; the validator always returns a report.
pub struct StructuralValidator<'a> {
    oracle: &'a dyn KindOracle,
    config: &'a EngineConfig,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(oracle: &'a dyn KindOracle, config: &'a EngineConfig) -> Self {
        Self { oracle, config }
    }

    pub fn validate(&self, graph: &WorkflowGraph) -> ValidationReport {
        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "validating workflow structure"
        );
        let mut report = ValidationReport::new();

        let node_ids = self.check_nodes(graph, &mut report);
        self.check_edges(graph, &node_ids, &mut report);

        if let Some(ceiling) = self.config.max_nodes {
            if graph.nodes.len() > ceiling {
                report.push(Diagnostic::TooManyNodes {
                    count: graph.nodes.len(),
                    ceiling,
                });
            }
        }

        debug!(
            errors = report.errors().len(),
            warnings = report.warnings().len(),
            "structural validation finished"
        );
        report
    }

    fn check_nodes<'g>(
        &self,
        graph: &'g WorkflowGraph,
        report: &mut ValidationReport,
    ) -> AHashSet<&'g str> {
        let mut node_ids = AHashSet::with_capacity(graph.nodes.len());
        let mut has_entry = false;
        let mut has_exit = false;

        for (index, node) in graph.nodes.iter().enumerate() {
            if node.id.is_empty() {
                report.push(Diagnostic::MissingNodeId { index });
                continue;
            }
            if !node_ids.insert(node.id.as_str()) {
                report.push(Diagnostic::DuplicateNodeId {
                    node_id: node.id.clone(),
                });
            }

            if node.kind.is_empty() {
                report.push(Diagnostic::MissingNodeKind {
                    node_id: node.id.clone(),
                });
                continue;
            }
            if !self.oracle.is_kind_supported(&node.kind) {
                report.push(Diagnostic::UnsupportedNodeKind {
                    node_id: node.id.clone(),
                    kind: node.kind.clone(),
                });
            }
            has_entry |= self.config.is_entry_kind(&node.kind);
            has_exit |= self.config.is_exit_kind(&node.kind);
        }

        if !has_entry {
            report.push(Diagnostic::MissingEntryOrExit {
                endpoint: Endpoint::Entry,
                expected: self.config.entry_kinds.iter().join(", "),
            });
        }
        if !has_exit {
            report.push(Diagnostic::MissingEntryOrExit {
                endpoint: Endpoint::Exit,
                expected: self.config.exit_kinds.iter().join(", "),
            });
        }
        node_ids
    }

    fn check_edges(
        &self,
        graph: &WorkflowGraph,
        node_ids: &AHashSet<&str>,
        report: &mut ValidationReport,
    ) {
        for (index, edge) in graph.edges.iter().enumerate() {
            let ends = [
                (EdgeEnd::Source, &edge.source_node_id),
                (EdgeEnd::Target, &edge.target_node_id),
            ];
            if let Some((end, _)) = ends.iter().find(|(_, id)| id.is_empty()) {
                report.push(Diagnostic::MalformedEdge { index, end: *end });
                continue;
            }
            for (end, node_id) in ends {
                if !node_ids.contains(node_id.as_str()) {
                    report.push(Diagnostic::DanglingEdge {
                        index,
                        end,
                        node_id: node_id.clone(),
                    });
                }
            }
        }
    }
}

/// Runs the structural checks with the given kind oracle and configuration.
pub fn validate_structure(
    graph: &WorkflowGraph,
    oracle: &dyn KindOracle,
    config: &EngineConfig,
) -> ValidationReport {
    StructuralValidator::new(oracle, config).validate(graph)
}
