//! Structural and variable-semantics checks over a `WorkflowGraph`.

pub mod report;
pub mod structural;
pub mod variables;

pub use report::*;
pub use structural::{StructuralValidator, validate_structure};
pub use variables::{VariableDefinition, collect_definitions, validate_variables};
