use thiserror::Error;

/// Errors that prevent a linear visitation order from being produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Workflow graph contains a cycle; nodes left unordered: {}", .node_ids.join(", "))]
    CyclicGraph { node_ids: Vec<String> },

    #[error("An edge references node '{node_id}', which does not exist")]
    UnknownNode { node_id: String },

    #[error("Node id '{node_id}' appears more than once, so edges cannot be resolved")]
    DuplicateNode { node_id: String },
}

/// Errors that abort the reference repair pass as a whole.
///
/// Per-reference resolution failures are not errors; they are collected in the
/// [`RepairReport`](crate::repair::RepairReport) and surfaced by the variable validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepairError {
    #[error("Node '{node_id}' has a malformed '{property}' property: {reason}")]
    MalformedProperty {
        node_id: String,
        property: String,
        reason: String,
    },

    #[error("Cannot order nodes for repair: {0}")]
    Sequence(#[from] SequenceError),
}

/// Errors that can occur when converting a custom representation into a `WorkflowGraph`.
#[derive(Error, Debug, Clone)]
pub enum WorkflowConversionError {
    #[error("Invalid workflow data: {0}")]
    ValidationError(String),
}

/// Errors raised while reading or writing the JSON wire format.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("Failed to parse workflow JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Conversion(#[from] WorkflowConversionError),
}

/// Errors raised while loading an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid engine config: {0}")]
    Json(#[from] serde_json::Error),
}
