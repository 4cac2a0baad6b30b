// src/checklist/mod.rs

//! The day's checklist: what has completed and with what results.
//!
//! Top-level keys are namespaces chosen per worker (`"NEMO run"`,
//! `"forcing links"`, ...). Values are whatever the worker reported, most
//! often keyed by run type or host name:
//!
//! ```json
//! {"NEMO run": {"nowcast": {"host": "west.cloud", "run date": "2018-01-20"}}}
//! ```
//!
//! [`Checklist`] is the in-memory value; [`store::ChecklistStore`] persists
//! it. Every mutation is followed by a write (see `engine::core`).

pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub use store::ChecklistStore;

/// A checklist entry a decision needs is not there.
///
/// Usually means an upstream worker was skipped or the checklist was cleared
/// early.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("checklist has no '{key}' under '{namespace}'")]
pub struct MissingEntry {
    pub namespace: String,
    pub key: String,
}

/// What [`Checklist::update`] did with the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Inserted,
    Merged,
    /// The previous value could not be merged and was discarded.
    Replaced { previous: Value },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checklist {
    entries: Map<String, Value>,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, namespace: &str) -> Option<&Value> {
        self.entries.get(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Walk `path` below `namespace`, failing with the first missing key.
    pub fn try_get(&self, namespace: &str, path: &[&str]) -> Result<&Value, MissingEntry> {
        let missing = |key: &str| MissingEntry {
            namespace: namespace.to_string(),
            key: key.to_string(),
        };

        let mut value = self.entries.get(namespace).ok_or_else(|| missing(namespace))?;
        for key in path {
            value = value.get(*key).ok_or_else(|| missing(key))?;
        }
        Ok(value)
    }

    /// Like [`try_get`](Self::try_get) but the value must be a string.
    pub fn try_get_str(&self, namespace: &str, path: &[&str]) -> Result<&str, MissingEntry> {
        let value = self.try_get(namespace, path)?;
        value.as_str().ok_or_else(|| MissingEntry {
            namespace: namespace.to_string(),
            key: path.last().copied().unwrap_or(namespace).to_string(),
        })
    }

    /// Record `payload` under `namespace`.
    ///
    /// When both the existing value and the payload are objects the payload's
    /// keys are merged in, replacing same-named keys. Anything else replaces
    /// the namespace value outright and logs the discarded value.
    pub fn update(&mut self, namespace: &str, payload: Value) -> UpdateOutcome {
        match self.entries.get_mut(namespace) {
            None => {
                debug!(namespace, "checklist entry added");
                self.entries.insert(namespace.to_string(), payload);
                UpdateOutcome::Inserted
            }
            Some(Value::Object(existing)) if payload.is_object() => {
                if let Value::Object(incoming) = payload {
                    existing.extend(incoming);
                }
                debug!(namespace, "checklist entry merged");
                UpdateOutcome::Merged
            }
            Some(existing) => {
                let previous = std::mem::replace(existing, payload);
                warn!(
                    namespace,
                    discarded = %previous,
                    "checklist entry could not be merged; previous value replaced"
                );
                UpdateOutcome::Replaced { previous }
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
