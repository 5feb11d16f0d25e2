use ahash::AHashSet;
use itertools::Itertools;

pub const START: &str = "start";
pub const END: &str = "end";
pub const VARIABLE_DEF: &str = "variableDef";
pub const BATCH_ASSIGN_VALUE: &str = "batchAssignValue";
pub const SELECTOR: &str = "selector";
/// Entry kind of workflows triggered by a device event instead of a manual start.
pub const DEVICE_EVENT_LISTEN: &str = "deviceEventListen";

/// Kinds every workflow builder understands, independent of any loaded device definitions.
pub const BUILTIN_KINDS: [&str; 5] = [START, END, VARIABLE_DEF, BATCH_ASSIGN_VALUE, SELECTOR];

/// Answers whether a node kind can be built downstream.
///
/// The engine never hardcodes the kind list; callers supply this capability, usually backed by
/// a registry of built-in kinds plus whatever device kinds they have loaded.
pub trait KindOracle: Send + Sync {
    fn is_kind_supported(&self, kind: &str) -> bool;
}

impl<F> KindOracle for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_kind_supported(&self, kind: &str) -> bool {
        self(kind)
    }
}

/// A set of supported node kinds.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: AHashSet<String>,
}

impl KindRegistry {
    /// A registry that supports nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-populated with [`BUILTIN_KINDS`].
    pub fn builtin() -> Self {
        Self {
            kinds: BUILTIN_KINDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Registers an additional device kind. Returns `false` if it was already known.
    pub fn register_device_kind(&mut self, kind: impl Into<String>) -> bool {
        self.kinds.insert(kind.into())
    }

    pub fn with_device_kind(mut self, kind: impl Into<String>) -> Self {
        self.register_device_kind(kind);
        self
    }

    pub fn with_device_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for kind in kinds {
            self.register_device_kind(kind);
        }
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// All registered kinds in lexical order.
    pub fn kinds(&self) -> Vec<&str> {
        self.kinds.iter().map(String::as_str).sorted().collect()
    }
}

impl KindOracle for KindRegistry {
    fn is_kind_supported(&self, kind: &str) -> bool {
        self.contains(kind)
    }
}
