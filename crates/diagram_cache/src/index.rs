//! Slot index: which artifacts exist for each `(type, name)` identity.
//!
//! The index is seeded from the store listing and then kept current by the
//! resolver on every write and retirement, so finding the artifacts that a new
//! render supersedes is a map lookup rather than a directory scan.
//!
//! Alongside the on-disk view it records *claims*: the key this process most
//! recently resolved for each named slot, and every key it resolved for each
//! bare slot. Claims decide what a finished render may retire.

use std::collections::{BTreeSet, HashMap};

use diagram_common::{ArtifactKey, Slot};

/// In-memory index of artifacts grouped by slot.
#[derive(Debug, Default)]
pub struct SlotIndex {
    on_disk: HashMap<Slot, BTreeSet<ArtifactKey>>,
    claims: HashMap<Slot, BTreeSet<ArtifactKey>>,
}

impl SlotIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from keys already present in the store.
    pub fn from_keys(keys: impl IntoIterator<Item = ArtifactKey>) -> Self {
        let mut index = Self::new();
        for key in keys {
            index.insert(key);
        }
        index
    }

    /// Records that an artifact for `key` exists on disk.
    pub fn insert(&mut self, key: ArtifactKey) {
        self.on_disk.entry(key.slot()).or_default().insert(key);
    }

    /// Records that the artifact for `key` is gone.
    pub fn remove(&mut self, key: &ArtifactKey) {
        let slot = key.slot();
        if let Some(keys) = self.on_disk.get_mut(&slot) {
            keys.remove(key);
            if keys.is_empty() {
                self.on_disk.remove(&slot);
            }
        }
    }

    /// Keys on disk for `slot`.
    pub fn keys_in(&self, slot: &Slot) -> impl Iterator<Item = &ArtifactKey> {
        self.on_disk.get(slot).into_iter().flatten()
    }

    /// Records that this process resolved `key`.
    ///
    /// A named slot keeps only its latest claim; a bare slot accumulates.
    pub fn claim(&mut self, key: &ArtifactKey) {
        let slot = key.slot();
        let claims = self.claims.entry(slot.clone()).or_default();
        if matches!(slot, Slot::Named { .. }) {
            claims.clear();
        }
        claims.insert(key.clone());
    }

    /// Returns `true` unless a newer claim replaced `key` in its named slot.
    pub fn is_current(&self, key: &ArtifactKey) -> bool {
        match key.slot() {
            slot @ Slot::Named { .. } => self
                .claims
                .get(&slot)
                .map_or(true, |claimed| claimed.contains(key)),
            Slot::Bare(_) => true,
        }
    }

    /// Keys on disk that a final artifact for `key` supersedes.
    ///
    /// Everything else in the same slot, except keys this process claimed.
    pub fn superseded_by(&self, key: &ArtifactKey) -> Vec<ArtifactKey> {
        let slot = key.slot();
        let claimed = self.claims.get(&slot);
        self.keys_in(&slot)
            .filter(|k| *k != key)
            .filter(|k| claimed.map_or(true, |c| !c.contains(*k)))
            .cloned()
            .collect()
    }

    /// Number of artifacts on disk known to the index.
    pub fn len(&self) -> usize {
        self.on_disk.values().map(BTreeSet::len).sum()
    }

    /// Returns `true` if no artifacts are indexed.
    pub fn is_empty(&self) -> bool {
        self.on_disk.is_empty()
    }
}
