//! # Kensa - Workflow Graph Validation and Reference Repair
//!
//! **Kensa** checks machine-generated workflow graphs before they are handed to an execution
//! platform. Generators get the shape mostly right but routinely leave variable references
//! pointing at a variable's original definition after an intermediate node has reassigned it.
//! Kensa reports what is structurally wrong with a graph and rewrites those stale pointers so
//! each read names the node that last wrote the variable.
//!
//! ## Core Workflow
//!
//! The engine operates on a canonical model of a workflow: nodes carrying typed variable
//! bindings and expressions, joined by control edges. The primary workflow is:
//!
//! 1.  **Load Your Graph**: Parse the generator's JSON with [`wire::parse_workflow`], or implement
//!     [`IntoWorkflow`](graph::IntoWorkflow) for your own representation.
//! 2.  **Configure**: Build a [`Pipeline`](pipeline::Pipeline) with a kind oracle that knows which
//!     node kinds (including device kinds) the target platform accepts.
//! 3.  **Run**: [`Pipeline::run`](pipeline::Pipeline::run) validates structure, orders the nodes,
//!     repairs `nodeCode` pointers in place and validates variable ids.
//! 4.  **Inspect**: Read the [`ValidationReport`](validator::ValidationReport) and the repair
//!     status, and serialize the repaired graph back with [`wire::to_json`].
//!
//! ## Quick Start
//!
//! ```rust
//! use kensa::prelude::*;
//!
//! let document = r#"{
//!   "nodes": [
//!     { "id": "s", "kind": "start" },
//!     { "id": "v", "kind": "variableDef",
//!       "outputParams": [{ "code": "count", "id": "v_count" }] },
//!     { "id": "b", "kind": "batchAssignValue",
//!       "expresses": [{
//!         "leftExpress": { "kind": "nodeVariable", "nodeCode": "variableDef_v", "variable": "count", "variableId": "v_count" },
//!         "rightExpress": { "kind": "integerConst", "value": 3 }
//!       }] },
//!     { "id": "e", "kind": "end",
//!       "inputParams": [{ "code": "result", "id": "e_result",
//!         "valueExpr": { "kind": "nodeVariable", "nodeCode": "variableDef_v", "variable": "count", "variableId": "v_count" } }] }
//!   ],
//!   "edges": [
//!     { "sourceNodeId": "s", "targetNodeId": "v" },
//!     { "sourceNodeId": "v", "targetNodeId": "b" },
//!     { "sourceNodeId": "b", "targetNodeId": "e" }
//!   ]
//! }"#;
//!
//! let mut graph = parse_workflow(document)?;
//! let outcome = Pipeline::default().run(&mut graph);
//!
//! assert!(outcome.report.is_valid());
//! let end = graph.node("e").unwrap();
//! let read = end.input_params[0].value_expr.as_ref().and_then(Expression::as_node_variable).unwrap();
//! assert_eq!(read.node_code.as_deref(), Some("batchAssignValue_b"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod prelude;
pub mod repair;
pub mod sequencer;
pub mod validator;
pub mod wire;
