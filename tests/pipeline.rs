//! End-to-end tests for the validation pipeline.
mod common;
use common::*;
use kensa::config::EngineConfig;
use kensa::graph::kind::{END, START, VARIABLE_DEF};
use kensa::prelude::*;

#[test]
fn test_coffee_workflow_runs_clean() {
    let mut graph = coffee_graph();
    let outcome = coffee_pipeline().run(&mut graph);

    assert!(outcome.is_clean(), "unexpected outcome: {:?}", outcome);
    match &outcome.repair {
        RepairStatus::Completed(report) => assert_eq!(report.repaired, 3),
        other => panic!("Expected completed repair, got {:?}", other),
    }
    assert_eq!(
        node_code_at(&graph, "end_1", "inputParams[0].valueExpr").as_deref(),
        Some("batchAssignValue_batchAssignValue_1")
    );
}

#[test]
fn test_unregistered_device_kind_is_reported_but_repair_runs() {
    let mut graph = coffee_graph();
    let outcome = Pipeline::default().run(&mut graph);

    assert!(!outcome.report.is_valid());
    assert_eq!(outcome.report.with_code("UnsupportedNodeKind").count(), 1);
    assert!(outcome.repair.is_completed());
}

#[test]
fn test_cycle_skips_repair_and_keeps_structural_errors() {
    let mut graph = coffee_graph();
    graph.nodes.retain(|n| n.id != "start_1");
    graph.edges.retain(|e| e.source_node_id != "start_1");
    graph.edges.push(Edge::new("end_1", "variableDef_1"));
    let snapshot = graph.clone();

    let outcome = coffee_pipeline().run(&mut graph);

    assert_eq!(outcome.report.with_code("CyclicGraph").count(), 1);
    assert_eq!(outcome.report.with_code("MissingEntryOrExit").count(), 1);
    assert!(matches!(
        outcome.repair,
        RepairStatus::Skipped(SkipReason::Unordered(SequenceError::CyclicGraph { .. }))
    ));
    assert_eq!(graph, snapshot);
}

#[test]
fn test_fatal_structure_skips_repair() {
    let mut graph = coffee_graph();
    graph.edges.push(Edge::new("selector_1", "nowhere"));
    let snapshot = graph.clone();

    let outcome = coffee_pipeline().run(&mut graph);

    assert_eq!(outcome.repair, RepairStatus::Skipped(SkipReason::FatalStructure));
    assert_eq!(outcome.report.with_code("DanglingEdge").count(), 1);
    assert_eq!(graph, snapshot);
}

#[test]
fn test_repair_failure_is_reported_with_validation() {
    let mut graph = coffee_graph();
    graph
        .node_mut("selector_1")
        .unwrap()
        .properties
        .insert("branches".to_string(), Property::Opaque(serde_json::json!("oops")));

    let outcome = coffee_pipeline().run(&mut graph);

    assert!(matches!(outcome.repair, RepairStatus::Failed(RepairError::MalformedProperty { .. })));
    assert!(!outcome.is_clean());
    // Validation still covers the graph.
    assert!(outcome.report.is_valid());
}

#[test]
fn test_unresolved_reference_surfaces_once() {
    let mut graph = chain(vec![
        Node::new("start_1", START),
        definition("variableDef_1", &["x"]),
        end_reading("end_1", vec![("out", Expression::node_variable("variableDef_9", "y", "variableDef_9_y"))]),
    ]);

    let outcome = Pipeline::default().run(&mut graph);

    let unresolved: Vec<_> = outcome.report.with_code("UnresolvedVariableReference").collect();
    assert_eq!(unresolved.len(), 1);
    match unresolved[0] {
        Diagnostic::UnresolvedVariableReference { node_id, variable_id, .. } => {
            assert_eq!(node_id, "end_1");
            assert_eq!(variable_id, "variableDef_9_y");
        }
        other => panic!("Expected UnresolvedVariableReference, got {:?}", other),
    }
    assert_eq!(
        node_code_at(&graph, "end_1", "inputParams[0].valueExpr").as_deref(),
        Some("variableDef_9")
    );
}

#[test]
fn test_check_leaves_graph_untouched() {
    let graph = coffee_graph();
    let outcome = coffee_pipeline().check(&graph);

    assert!(outcome.report.is_valid());
    assert_eq!(outcome.repair, RepairStatus::Skipped(SkipReason::NotRequested));
    assert_eq!(graph, coffee_graph());
}

#[test]
fn test_run_on_copy_preserves_original() {
    let original = coffee_graph();
    let (repaired, outcome) = coffee_pipeline().run_on_copy(&original);

    assert!(outcome.is_clean());
    assert_eq!(original, coffee_graph());
    assert_ne!(repaired, original);
}

#[test]
fn test_builder_adjusts_ceiling_and_endpoints() {
    let pipeline = Pipeline::builder(|_: &str| true)
        .with_node_ceiling(Some(2))
        .with_entry_kind("trigger")
        .with_exit_kind("finish")
        .build();
    let mut graph = chain(vec![
        Node::new("t", "trigger"),
        Node::new("v", VARIABLE_DEF),
        Node::new("f", "finish"),
    ]);

    let outcome = pipeline.run(&mut graph);

    assert!(outcome.report.is_valid());
    assert_eq!(
        outcome.report.warnings(),
        &[Diagnostic::TooManyNodes { count: 3, ceiling: 2 }]
    );
    assert_eq!(pipeline.config().entry_kinds.last().map(String::as_str), Some("trigger"));
}

#[test]
fn test_from_config_registers_device_kinds() {
    let config = EngineConfig::from_json_str(r#"{ "device_kinds": ["coffeeMachine"] }"#).unwrap();
    let mut graph = coffee_graph();

    let outcome = Pipeline::from_config(config).run(&mut graph);

    assert!(outcome.is_clean(), "unexpected outcome: {:?}", outcome);
}

#[test]
fn test_pipeline_is_shareable_across_threads() {
    let pipeline = std::sync::Arc::new(coffee_pipeline());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || {
                let mut graph = coffee_graph();
                pipeline.run(&mut graph).is_clean()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_summary_for_minimal_graph() {
    let graph = chain(vec![Node::new("s", START), Node::new("e", END)]);
    let summary = Pipeline::default().validate(&graph).summary();

    assert!(summary.valid);
    assert!(summary.errors.is_empty());
}
