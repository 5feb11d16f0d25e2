use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Whether a diagnostic blocks the graph or is advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Which end of an edge a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    Source,
    Target,
}

impl fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeEnd::Source => write!(f, "source"),
            EdgeEnd::Target => write!(f, "target"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Entry,
    Exit,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Entry => write!(f, "entry"),
            Endpoint::Exit => write!(f, "exit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSection {
    InputParams,
    OutputParams,
}

impl fmt::Display for ParamSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSection::InputParams => write!(f, "inputParams"),
            ParamSection::OutputParams => write!(f, "outputParams"),
        }
    }
}

/// A single defect found in a workflow graph.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    // Structural
    #[error("Node #{index} is missing its id")]
    MissingNodeId { index: usize },

    #[error("Duplicate node id: '{node_id}'")]
    DuplicateNodeId { node_id: String },

    #[error("Node '{node_id}' is missing its kind")]
    MissingNodeKind { node_id: String },

    #[error("Node '{node_id}' uses an unsupported kind: '{kind}'")]
    UnsupportedNodeKind { node_id: String, kind: String },

    #[error("Workflow has no {endpoint} node (expected one of: {expected})")]
    MissingEntryOrExit { endpoint: Endpoint, expected: String },

    #[error("Edge #{index} is missing its {end} node id")]
    MalformedEdge { index: usize, end: EdgeEnd },

    #[error("Edge #{index} references a {end} node that does not exist: '{node_id}'")]
    DanglingEdge {
        index: usize,
        end: EdgeEnd,
        node_id: String,
    },

    #[error("Workflow graph contains a cycle; nodes left unordered: {}", .node_ids.join(", "))]
    CyclicGraph { node_ids: Vec<String> },

    // Reference
    #[error("Node '{node_id}' declares a variable without a code in {section}")]
    MissingVariableCode {
        node_id: String,
        section: ParamSection,
    },

    #[error("Variable '{code}' of node '{node_id}' ({kind}) is missing its id")]
    MissingVariableId {
        node_id: String,
        kind: String,
        code: String,
    },

    #[error("Duplicate variable id '{id}': defined in node '{first_node_id}' and node '{second_node_id}'")]
    DuplicateVariableId {
        id: String,
        first_node_id: String,
        second_node_id: String,
    },

    #[error(
        "Node '{node_id}' references variable '{variable}' (from '{node_code}') at {location} without a variableId"
    )]
    MissingReferenceVariableId {
        node_id: String,
        location: String,
        variable: String,
        node_code: String,
    },

    #[error("Node '{node_id}' references variableId '{variable_id}' at {location}, which is not defined anywhere")]
    UnresolvedVariableReference {
        node_id: String,
        location: String,
        variable_id: String,
    },

    // Convention
    #[error("Variable '{code}' of node '{node_id}' has id '{id}', expected '{expected}'")]
    NonConventionalId {
        node_id: String,
        code: String,
        id: String,
        expected: String,
    },

    #[error(
        "Node '{node_id}' reads variableId '{variable_id}' as '{found}' at {location}, but it is defined as '{expected}'"
    )]
    VariableNameMismatch {
        node_id: String,
        location: String,
        variable_id: String,
        expected: String,
        found: String,
    },

    #[error("Workflow has {count} nodes, above the suggested maximum of {ceiling}")]
    TooManyNodes { count: usize, ceiling: usize },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::NonConventionalId { .. }
            | Diagnostic::VariableNameMismatch { .. }
            | Diagnostic::TooManyNodes { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Shape errors after which ordering and repair are meaningless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Diagnostic::MissingNodeId { .. }
                | Diagnostic::DuplicateNodeId { .. }
                | Diagnostic::MalformedEdge { .. }
                | Diagnostic::DanglingEdge { .. }
                | Diagnostic::CyclicGraph { .. }
        )
    }

    /// Stable identifier of the defect category.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::MissingNodeId { .. } => "MissingNodeId",
            Diagnostic::DuplicateNodeId { .. } => "DuplicateNodeId",
            Diagnostic::MissingNodeKind { .. } => "MissingNodeKind",
            Diagnostic::UnsupportedNodeKind { .. } => "UnsupportedNodeKind",
            Diagnostic::MissingEntryOrExit { .. } => "MissingEntryOrExit",
            Diagnostic::MalformedEdge { .. } => "MalformedEdge",
            Diagnostic::DanglingEdge { .. } => "DanglingEdge",
            Diagnostic::CyclicGraph { .. } => "CyclicGraph",
            Diagnostic::MissingVariableCode { .. } => "MissingVariableCode",
            Diagnostic::MissingVariableId { .. } => "MissingVariableId",
            Diagnostic::DuplicateVariableId { .. } => "DuplicateVariableId",
            Diagnostic::MissingReferenceVariableId { .. } => "MissingReferenceVariableId",
            Diagnostic::UnresolvedVariableReference { .. } => "UnresolvedVariableReference",
            Diagnostic::NonConventionalId { .. } => "NonConventionalId",
            Diagnostic::VariableNameMismatch { .. } => "VariableNameMismatch",
            Diagnostic::TooManyNodes { .. } => "TooManyNodes",
        }
    }
}

/// Errors and warnings accumulated by one or more validation passes, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    seen: AHashSet<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic under its severity. A diagnostic already present is not repeated.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.seen.contains(&diagnostic) {
            return;
        }
        self.seen.insert(diagnostic.clone());
        match diagnostic.severity() {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    /// Appends everything from `other`, keeping this report's entries first.
    pub fn merge(&mut self, other: ValidationReport) {
        for diagnostic in other.errors.into_iter().chain(other.warnings) {
            self.push(diagnostic);
        }
    }

    /// `true` when no errors were recorded. Warnings never affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_fatal_errors(&self) -> bool {
        self.errors.iter().any(Diagnostic::is_fatal)
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// All diagnostics of a given category, errors first.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |d| d.code() == code)
    }

    /// The plain `{ valid, errors, warnings }` view handed to callers.
    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            valid: self.is_valid(),
            errors: self.errors.iter().map(ToString::to_string).collect(),
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Serializable outcome of validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}
