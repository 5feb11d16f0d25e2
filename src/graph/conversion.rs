use super::definition::WorkflowGraph;
use crate::error::WorkflowConversionError;

/// A trait for external graph representations that can be converted into a `WorkflowGraph`.
///
/// This is the seam between whatever parsed the generated document and the engine. The
/// bundled [`wire`](crate::wire) module implements it for the JSON format the generator emits;
/// callers with their own representation implement it on their own types.
///
/// # Example
///
/// ```rust
/// use kensa::prelude::*;
/// use kensa::error::WorkflowConversionError;
///
/// struct Step { id: String, kind: String }
/// struct Plan { steps: Vec<Step> }
///
/// impl IntoWorkflow for Plan {
///     fn into_workflow(self) -> std::result::Result<WorkflowGraph, WorkflowConversionError> {
///         let nodes: Vec<Node> = self.steps.into_iter().map(|s| Node::new(s.id, s.kind)).collect();
///         let edges = nodes
///             .windows(2)
///             .map(|pair| Edge::new(pair[0].id.clone(), pair[1].id.clone()))
///             .collect();
///         Ok(WorkflowGraph::new(nodes, edges))
///     }
/// }
/// ```
pub trait IntoWorkflow {
    /// Consumes the object and converts it into the engine's graph model.
    fn into_workflow(self) -> Result<WorkflowGraph, WorkflowConversionError>;
}

impl IntoWorkflow for WorkflowGraph {
    fn into_workflow(self) -> Result<WorkflowGraph, WorkflowConversionError> {
        Ok(self)
    }
}
