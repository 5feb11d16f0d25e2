//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kensa crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kensa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("path/to/workflow.json")?;
//! let mut graph = parse_workflow(&text)?;
//!
//! let registry = KindRegistry::builtin().with_device_kind("lightControl");
//! let pipeline = Pipeline::builder(registry).with_node_ceiling(Some(30)).build();
//! let outcome = pipeline.run(&mut graph);
//!
//! for diagnostic in outcome.report.errors() {
//!     println!("error: {}", diagnostic);
//! }
//! # Ok(())
//! # }
//! ```

// Pipeline and configuration
pub use crate::config::EngineConfig;
pub use crate::pipeline::{Pipeline, PipelineOutcome, RepairStatus, SkipReason};

// Graph model
pub use crate::graph::{
    Edge, Expression, IntoWorkflow, KindOracle, KindRegistry, Node, NodeVariableRef, Property,
    VariableBinding, WorkflowGraph,
};

// Individual passes
pub use crate::repair::{RepairReport, repair_references};
pub use crate::sequencer::topological_order;
pub use crate::validator::{Diagnostic, Severity, ValidationReport};

// Wire format
pub use crate::wire::parse_workflow;

// Error types
pub use crate::error::{RepairError, SequenceError, WireError, WorkflowConversionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
