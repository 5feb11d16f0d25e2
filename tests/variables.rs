//! Tests for variable id and reference validation.
mod common;
use common::*;
use kensa::graph::kind::{START, VARIABLE_DEF};
use kensa::prelude::*;
use kensa::validator::{ParamSection, collect_definitions, validate_variables};

#[test]
fn test_coffee_workflow_has_valid_variables() {
    let report = validate_variables(&coffee_graph());
    assert!(report.is_valid(), "unexpected diagnostics: {:?}", report);
    assert!(report.warnings().is_empty());
}

#[test]
fn test_duplicate_variable_id_names_both_nodes() {
    let second = Node::new("variableDef_2", VARIABLE_DEF)
        .with_output_param(VariableBinding::new("x", "variableDef_1_x"));
    let graph = chain(vec![
        Node::new("start_1", START),
        definition("variableDef_1", &["x"]),
        second,
        end_reading("end_1", vec![]),
    ]);

    let report = validate_variables(&graph);

    let duplicates: Vec<_> = report.with_code("DuplicateVariableId").collect();
    assert_eq!(
        duplicates,
        vec![&Diagnostic::DuplicateVariableId {
            id: "variableDef_1_x".to_string(),
            first_node_id: "variableDef_1".to_string(),
            second_node_id: "variableDef_2".to_string(),
        }]
    );
    // The copied id also breaks the naming convention for its second owner.
    assert_eq!(report.with_code("NonConventionalId").count(), 1);
}

#[test]
fn test_missing_code_is_an_error() {
    let node = Node::new("variableDef_1", VARIABLE_DEF).with_output_param(VariableBinding::new("", "variableDef_1_"));
    let graph = chain(vec![Node::new("start_1", START), node, end_reading("end_1", vec![])]);

    let report = validate_variables(&graph);

    assert_eq!(
        report.errors(),
        &[Diagnostic::MissingVariableCode {
            node_id: "variableDef_1".to_string(),
            section: ParamSection::OutputParams,
        }]
    );
}

#[test]
fn test_missing_id_is_an_error() {
    let node = Node::new("variableDef_1", VARIABLE_DEF).with_output_param(VariableBinding::new("x", ""));
    let graph = chain(vec![Node::new("start_1", START), node, end_reading("end_1", vec![])]);

    let report = validate_variables(&graph);

    assert_eq!(
        report.errors(),
        &[Diagnostic::MissingVariableId {
            node_id: "variableDef_1".to_string(),
            kind: VARIABLE_DEF.to_string(),
            code: "x".to_string(),
        }]
    );
}

#[test]
fn test_non_conventional_id_is_only_a_warning() {
    let node = Node::new("variableDef_1", VARIABLE_DEF).with_output_param(VariableBinding::new("x", "custom_x"));
    let graph = chain(vec![
        Node::new("start_1", START),
        node,
        end_reading("end_1", vec![("out", Expression::node_variable("variableDef_variableDef_1", "x", "custom_x"))]),
    ]);

    let report = validate_variables(&graph);

    assert!(report.is_valid());
    assert_eq!(
        report.warnings(),
        &[Diagnostic::NonConventionalId {
            node_id: "variableDef_1".to_string(),
            code: "x".to_string(),
            id: "custom_x".to_string(),
            expected: "variableDef_1_x".to_string(),
        }]
    );
}

#[test]
fn test_unresolved_reference_is_reported_once() {
    let graph = chain(vec![
        Node::new("start_1", START),
        definition("variableDef_1", &["x"]),
        end_reading("end_1", vec![("out", Expression::node_variable("variableDef_9", "y", "variableDef_9_y"))]),
    ]);

    let report = validate_variables(&graph);

    assert_eq!(
        report.errors(),
        &[Diagnostic::UnresolvedVariableReference {
            node_id: "end_1".to_string(),
            location: "inputParams[0].valueExpr".to_string(),
            variable_id: "variableDef_9_y".to_string(),
        }]
    );
}

#[test]
fn test_reference_without_variable_id_is_an_error() {
    let reference = Expression::NodeVariableRef(NodeVariableRef {
        node_code: Some("variableDef_variableDef_1".to_string()),
        variable: Some("x".to_string()),
        variable_id: None,
        extra: Default::default(),
    });
    let graph = chain(vec![
        Node::new("start_1", START),
        definition("variableDef_1", &["x"]),
        selector("selector_1", vec![reference]),
        end_reading("end_1", vec![]),
    ]);

    let report = validate_variables(&graph);

    assert_eq!(
        report.errors(),
        &[Diagnostic::MissingReferenceVariableId {
            node_id: "selector_1".to_string(),
            location: "branches[0].conditionExpr".to_string(),
            variable: "x".to_string(),
            node_code: "variableDef_variableDef_1".to_string(),
        }]
    );
}

#[test]
fn test_name_mismatch_is_only_a_warning() {
    let graph = chain(vec![
        Node::new("start_1", START),
        definition("variableDef_1", &["temperature"]),
        end_reading(
            "end_1",
            vec![(
                "out",
                Expression::node_variable("variableDef_variableDef_1", "temp", "variableDef_1_temperature"),
            )],
        ),
    ]);

    let report = validate_variables(&graph);

    assert!(report.is_valid());
    assert_eq!(report.with_code("VariableNameMismatch").count(), 1);
    match &report.warnings()[0] {
        Diagnostic::VariableNameMismatch { expected, found, .. } => {
            assert_eq!(expected, "temperature");
            assert_eq!(found, "temp");
        }
        other => panic!("Expected VariableNameMismatch, got {:?}", other),
    }
}

#[test]
fn test_collect_definitions_keeps_first_owner() {
    let second = Node::new("variableDef_2", VARIABLE_DEF).with_output_param(VariableBinding::new("x", "variableDef_1_x"));
    let nodes = vec![definition("variableDef_1", &["x", "y"]), second];
    let mut report = ValidationReport::new();

    let definitions = collect_definitions(&nodes, &mut report);

    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions["variableDef_1_x"].node_id, "variableDef_1");
    assert_eq!(definitions["variableDef_1_y"].section, ParamSection::OutputParams);
    assert!(!report.is_valid());
}

#[test]
fn test_summary_lists_messages() {
    let graph = chain(vec![
        Node::new("start_1", START),
        end_reading("end_1", vec![("out", Expression::node_variable("variableDef_9", "y", "variableDef_9_y"))]),
    ]);

    let summary = validate_variables(&graph).summary();

    assert!(!summary.valid);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("variableDef_9_y"));
    assert!(summary.warnings.is_empty());
}
