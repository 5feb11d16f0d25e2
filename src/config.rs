use crate::error::ConfigError;
use crate::graph::kind::{DEVICE_EVENT_LISTEN, END, KindRegistry, START};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Suggested upper bound on generated workflow size.
pub const DEFAULT_MAX_NODES: usize = 20;

/// Tunables for validation and repair.
///
/// Every field has a default, so a config document only needs to name what it changes:
///
/// ```rust
/// use kensa::config::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{ "max_nodes": 40 }"#).unwrap();
/// assert_eq!(config.max_nodes, Some(40));
/// assert!(config.is_exit_kind("end"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Soft ceiling on node count. Exceeding it is a warning, never an error. `None` disables it.
    pub max_nodes: Option<usize>,
    /// Kinds that count as a workflow entry.
    pub entry_kinds: Vec<String>,
    /// Kinds that count as a workflow exit.
    pub exit_kinds: Vec<String>,
    /// Device kinds accepted in addition to the built-in ones by [`EngineConfig::kind_registry`].
    pub device_kinds: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nodes: Some(DEFAULT_MAX_NODES),
            entry_kinds: vec![START.to_string(), DEVICE_EVENT_LISTEN.to_string()],
            exit_kinds: vec![END.to_string()],
            device_kinds: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn is_entry_kind(&self, kind: &str) -> bool {
        self.entry_kinds.iter().any(|k| k == kind)
    }

    pub fn is_exit_kind(&self, kind: &str) -> bool {
        self.exit_kinds.iter().any(|k| k == kind)
    }

    /// The built-in kinds plus this config's device kinds.
    pub fn kind_registry(&self) -> KindRegistry {
        KindRegistry::builtin().with_device_kinds(self.device_kinds.iter().cloned())
    }
}
