//! Registry of renders currently outstanding, keyed by artifact.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use diagram_common::ArtifactKey;

/// Set of artifact keys with a render request in flight.
///
/// Guarantees at most one outstanding request per key within a process.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<ArtifactKey>>>,
}

impl InFlight {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key`. Returns a guard that unregisters it on drop, or `None`
    /// if a request for `key` is already outstanding.
    pub fn try_begin(&self, key: &ArtifactKey) -> Option<InFlightGuard> {
        let mut keys = self.keys.lock().unwrap();
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key: key.clone(),
        })
    }

    /// Returns `true` if a request for `key` is outstanding.
    pub fn contains(&self, key: &ArtifactKey) -> bool {
        self.keys.lock().unwrap().contains(key)
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.keys.lock().unwrap().len()
    }

    /// Returns `true` if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps one key registered as in flight until dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<ArtifactKey>>>,
    key: ArtifactKey,
}

impl InFlightGuard {
    /// The key this guard holds.
    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // A poisoned lock still holds a usable set.
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.remove(&self.key);
    }
}
