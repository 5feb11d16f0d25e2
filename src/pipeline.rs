use crate::config::EngineConfig;
use crate::error::{RepairError, SequenceError};
use crate::graph::{KindOracle, KindRegistry, WorkflowGraph};
use crate::repair::{RepairReport, ReferenceRepairer};
use crate::sequencer::topological_order;
use crate::validator::{Diagnostic, ValidationReport, validate_structure, validate_variables};
use tracing::{info, warn};

/// Why the repair pass did not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The structural validator found shape errors that make ordering meaningless.
    FatalStructure,
    /// The graph could not be ordered.
    Unordered(SequenceError),
    /// The caller asked for validation only.
    NotRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairStatus {
    Completed(RepairReport),
    Skipped(SkipReason),
    /// The pass aborted part-way. Rewrites made before the fault remain in the graph.
    Failed(RepairError),
}

impl RepairStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RepairStatus::Completed(_))
    }
}

/// Everything a pipeline run produced. The graph itself is mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub report: ValidationReport,
    pub repair: RepairStatus,
}

impl PipelineOutcome {
    /// `true` when validation found no errors and repair, if it ran, completed.
    pub fn is_clean(&self) -> bool {
        self.report.is_valid() && !matches!(self.repair, RepairStatus::Failed(_))
    }
}

/// Runs structural validation, ordering, reference repair and variable validation in sequence.
///
/// The pipeline holds no per-graph state, so one instance can serve many graphs, including from
/// several threads at once.
pub struct Pipeline {
    oracle: Box<dyn KindOracle>,
    config: EngineConfig,
}

pub struct PipelineBuilder {
    oracle: Box<dyn KindOracle>,
    config: EngineConfig,
}

impl PipelineBuilder {
    pub fn new(oracle: impl KindOracle + 'static) -> Self {
        Self {
            oracle: Box::new(oracle),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the soft node-count ceiling. `None` disables the warning.
    pub fn with_node_ceiling(mut self, ceiling: Option<usize>) -> Self {
        self.config.max_nodes = ceiling;
        self
    }

    pub fn with_entry_kind(mut self, kind: &str) -> Self {
        if !self.config.is_entry_kind(kind) {
            self.config.entry_kinds.push(kind.to_string());
        }
        self
    }

    pub fn with_exit_kind(mut self, kind: &str) -> Self {
        if !self.config.is_exit_kind(kind) {
            self.config.exit_kinds.push(kind.to_string());
        }
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            oracle: self.oracle,
            config: self.config,
        }
    }
}

impl Pipeline {
    pub fn builder(oracle: impl KindOracle + 'static) -> PipelineBuilder {
        PipelineBuilder::new(oracle)
    }

    /// A pipeline whose kind oracle is built from the config's device kinds plus the built-ins.
    pub fn from_config(config: EngineConfig) -> Self {
        let registry: KindRegistry = config.kind_registry();
        Self::builder(registry).with_config(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates without mutating the graph.
    pub fn validate(&self, graph: &WorkflowGraph) -> ValidationReport {
        let mut report = validate_structure(graph, self.oracle.as_ref(), &self.config);
        if !report.has_fatal_errors() {
            if let Err(SequenceError::CyclicGraph { node_ids }) = topological_order(graph) {
                report.push(Diagnostic::CyclicGraph { node_ids });
            }
        }
        report.merge(validate_variables(graph));
        report
    }

    /// Validates the graph, repairs its references in place, and validates variables again.
    ///
    /// Callers that need the generated graph unchanged should clone it first, or use
    /// [`Pipeline::run_on_copy`]. Each graph instance is meant to go through `run` once.
    pub fn run(&self, graph: &mut WorkflowGraph) -> PipelineOutcome {
        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "running validation pipeline"
        );
        let mut report = validate_structure(graph, self.oracle.as_ref(), &self.config);

        let repair = if report.has_fatal_errors() {
            warn!("structural errors prevent ordering; skipping repair");
            RepairStatus::Skipped(SkipReason::FatalStructure)
        } else {
            match topological_order(graph) {
                Ok(order) => {
                    match ReferenceRepairer::new(&self.config).repair_in_order(graph, &order) {
                        Ok(repair_report) => RepairStatus::Completed(repair_report),
                        Err(err) => {
                            warn!(error = %err, "reference repair failed");
                            RepairStatus::Failed(err)
                        }
                    }
                }
                Err(err) => {
                    if let SequenceError::CyclicGraph { node_ids } = &err {
                        report.push(Diagnostic::CyclicGraph {
                            node_ids: node_ids.clone(),
                        });
                    }
                    RepairStatus::Skipped(SkipReason::Unordered(err))
                }
            }
        };

        report.merge(validate_variables(graph));

        info!(
            valid = report.is_valid(),
            errors = report.errors().len(),
            warnings = report.warnings().len(),
            repaired = matches!(repair, RepairStatus::Completed(_)),
            "validation pipeline finished"
        );
        PipelineOutcome { report, repair }
    }

    /// Runs the pipeline on a clone and returns the repaired copy with the outcome.
    pub fn run_on_copy(&self, graph: &WorkflowGraph) -> (WorkflowGraph, PipelineOutcome) {
        let mut copy = graph.clone();
        let outcome = self.run(&mut copy);
        (copy, outcome)
    }

    /// Validation only; repair is reported as not requested.
    pub fn check(&self, graph: &WorkflowGraph) -> PipelineOutcome {
        PipelineOutcome {
            report: self.validate(graph),
            repair: RepairStatus::Skipped(SkipReason::NotRequested),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(EngineConfig::default())
    }
}
