use super::report::{Diagnostic, ParamSection, ValidationReport};
use crate::graph::{Node, WorkflowGraph, conventional_id, for_each_node_variable};
use ahash::AHashMap;
use tracing::{debug, info};

/// Where a variable id was first declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub node_id: String,
    pub node_kind: String,
    pub code: String,
    pub section: ParamSection,
}

/// Checks binding identifiers and that every reference resolves to a declared binding.
///
/// Independent of repair: it can run on a freshly parsed graph or on a repaired one.
pub fn validate_variables(graph: &WorkflowGraph) -> ValidationReport {
    info!(nodes = graph.nodes.len(), "validating variable ids");
    let mut report = ValidationReport::new();

    let definitions = collect_definitions(&graph.nodes, &mut report);
    check_references(&graph.nodes, &definitions, &mut report);

    info!(
        definitions = definitions.len(),
        errors = report.errors().len(),
        warnings = report.warnings().len(),
        "variable validation finished"
    );
    report
}

/// Gathers every binding declared in any node's params, keyed by id.
///
/// Bindings with a missing code or id, and second declarations of an id, are reported and
/// left out of the returned map.
pub fn collect_definitions(
    nodes: &[Node],
    report: &mut ValidationReport,
) -> AHashMap<String, VariableDefinition> {
    let mut definitions: AHashMap<String, VariableDefinition> = AHashMap::new();

    for node in nodes {
        let sections = [
            (ParamSection::InputParams, &node.input_params),
            (ParamSection::OutputParams, &node.output_params),
        ];
        for (section, bindings) in sections {
            for binding in bindings {
                if binding.code.is_empty() {
                    report.push(Diagnostic::MissingVariableCode {
                        node_id: node.id.clone(),
                        section,
                    });
                    continue;
                }
                if binding.id.is_empty() {
                    report.push(Diagnostic::MissingVariableId {
                        node_id: node.id.clone(),
                        kind: node.kind.clone(),
                        code: binding.code.clone(),
                    });
                    continue;
                }

                let expected = conventional_id(&node.id, &binding.code);
                if binding.id != expected {
                    report.push(Diagnostic::NonConventionalId {
                        node_id: node.id.clone(),
                        code: binding.code.clone(),
                        id: binding.id.clone(),
                        expected,
                    });
                }

                if let Some(existing) = definitions.get(&binding.id) {
                    report.push(Diagnostic::DuplicateVariableId {
                        id: binding.id.clone(),
                        first_node_id: existing.node_id.clone(),
                        second_node_id: node.id.clone(),
                    });
                    continue;
                }
                debug!(id = %binding.id, node_id = %node.id, code = %binding.code, "collected variable definition");
                definitions.insert(
                    binding.id.clone(),
                    VariableDefinition {
                        node_id: node.id.clone(),
                        node_kind: node.kind.clone(),
                        code: binding.code.clone(),
                        section,
                    },
                );
            }
        }
    }
    definitions
}

fn check_references(
    nodes: &[Node],
    definitions: &AHashMap<String, VariableDefinition>,
    report: &mut ValidationReport,
) {
    for node in nodes {
        for_each_node_variable(node, |location, reference| {
            let Some(variable_id) = reference.target_id() else {
                report.push(Diagnostic::MissingReferenceVariableId {
                    node_id: node.id.clone(),
                    location: location.to_string(),
                    variable: reference.variable.clone().unwrap_or_default(),
                    node_code: reference.node_code.clone().unwrap_or_default(),
                });
                return;
            };

            let Some(definition) = definitions.get(variable_id) else {
                report.push(Diagnostic::UnresolvedVariableReference {
                    node_id: node.id.clone(),
                    location: location.to_string(),
                    variable_id: variable_id.to_string(),
                });
                return;
            };

            let found = reference.variable.as_deref().unwrap_or_default();
            if definition.code != found {
                report.push(Diagnostic::VariableNameMismatch {
                    node_id: node.id.clone(),
                    location: location.to_string(),
                    variable_id: variable_id.to_string(),
                    expected: definition.code.clone(),
                    found: found.to_string(),
                });
            }
        });
    }
}
