//! # Params
//!
//! Process-wide store of runtime-tunable parameters.
//!
//! Writers publish whole versioned snapshots; each consumer holds a
//! `ParameterSubscription` and applies updates with a check-then-apply step,
//! so a consumer never mutates the store and never blocks a writer.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

pub use contracts::ParamValue;

/// Versioned copy of every parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    /// Incremented on every write
    pub version: u64,

    /// Parameter name -> value
    pub values: BTreeMap<String, ParamValue>,
}

impl ParameterSnapshot {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Numeric value, integers widened to f64
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Shared parameter store
///
/// Cheap to clone; all clones refer to the same parameters.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    tx: Arc<watch::Sender<ParameterSnapshot>>,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    /// Empty store at version 0
    pub fn new() -> Self {
        Self::with_values(BTreeMap::new())
    }

    /// Store seeded with initial values at version 0
    pub fn with_values(values: BTreeMap<String, ParamValue>) -> Self {
        let (tx, _rx) = watch::channel(ParameterSnapshot { version: 0, values });
        Self { tx: Arc::new(tx) }
    }

    /// Write one parameter and notify every subscriber
    ///
    /// Returns the new version.
    pub fn set(&self, name: impl Into<String>, value: impl Into<ParamValue>) -> u64 {
        self.set_many([(name.into(), value.into())])
    }

    /// Write several parameters as a single version
    pub fn set_many(&self, entries: impl IntoIterator<Item = (String, ParamValue)>) -> u64 {
        let mut version = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.values.extend(entries);
            snapshot.version += 1;
            version = snapshot.version;
        });
        debug!(version, "parameters updated");
        version
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.tx.borrow().values.get(name).cloned()
    }

    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        self.tx.borrow().clone()
    }

    /// Attach a consumer
    ///
    /// The subscription starts with the current snapshot already applied.
    pub fn subscribe(&self) -> ParameterSubscription {
        let mut rx = self.tx.subscribe();
        let current = rx.borrow_and_update().clone();
        ParameterSubscription { rx, current }
    }
}

/// One consumer's view of the store
#[derive(Debug)]
pub struct ParameterSubscription {
    rx: watch::Receiver<ParameterSnapshot>,
    current: ParameterSnapshot,
}

impl ParameterSubscription {
    /// Whether a newer snapshot was written since the last apply
    ///
    /// A dropped store never reports pending updates.
    pub fn has_pending_update(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Apply the latest snapshot if one is pending
    ///
    /// Returns true when the local view changed.
    pub fn apply_updates(&mut self) -> bool {
        if !self.has_pending_update() {
            return false;
        }
        self.force_apply();
        true
    }

    /// Apply the latest snapshot unconditionally
    pub fn force_apply(&mut self) {
        self.current = self.rx.borrow_and_update().clone();
        debug!(
            version = self.current.version,
            parameters = self.current.len(),
            "parameters applied"
        );
    }

    /// Last applied snapshot
    pub fn current(&self) -> &ParameterSnapshot {
        &self.current
    }
}
