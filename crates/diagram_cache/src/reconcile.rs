//! Reconciliation of a documentation tree against the artifact store.
//!
//! Expected keys are derived from the same extractor and the same
//! [`ArtifactKey::derive`] the resolver uses, so "missing" and "orphaned" here
//! agree with what a rendering pass would actually have cached.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use diagram_common::ArtifactKey;
use diagram_scan::{Extractor, SourceLocation};
use tracing::{debug, info};

use crate::error::DiagramError;
use crate::placeholder::is_placeholder;
use crate::store::ArtifactStore;

/// Temporary files older than this are leftovers of interrupted writes.
pub const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// Every artifact a documentation tree expects, with the places that use it.
#[derive(Debug, Clone, Default)]
pub struct ExpectedArtifacts {
    by_key: BTreeMap<ArtifactKey, Vec<SourceLocation>>,
}

impl ExpectedArtifacts {
    /// Records that `source` expects `key`.
    pub fn insert(&mut self, key: ArtifactKey, source: Option<SourceLocation>) {
        let sources = self.by_key.entry(key).or_default();
        sources.extend(source);
    }

    /// The expected keys, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &ArtifactKey> {
        self.by_key.keys()
    }

    /// Where `key` is used.
    pub fn sources(&self, key: &ArtifactKey) -> &[SourceLocation] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// The expected artifact filenames.
    pub fn file_names(&self) -> BTreeSet<String> {
        self.by_key.keys().map(ArtifactKey::file_name).collect()
    }

    /// Number of distinct expected keys.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns `true` if the tree contains no diagrams.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Expected keys absent from `listing`.
    pub fn missing_from(&self, listing: &BTreeSet<String>) -> BTreeSet<ArtifactKey> {
        self.by_key
            .keys()
            .filter(|key| !listing.contains(&key.file_name()))
            .cloned()
            .collect()
    }

    /// Entries of `listing` that no occurrence expects.
    pub fn orphans_in(&self, listing: &BTreeSet<String>) -> BTreeSet<String> {
        let expected = self.file_names();
        listing.difference(&expected).cloned().collect()
    }
}

/// Compares a documentation tree with an artifact store.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: ArtifactStore,
    extractor: Extractor,
}

impl Reconciler {
    /// Creates a reconciler for `store`, scanning with `extractor`.
    pub fn new(store: ArtifactStore, extractor: Extractor) -> Self {
        Self { store, extractor }
    }

    /// The artifact store being reconciled.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Scans `root` and collects every expected key with its sources.
    pub fn expected(&self, root: &Path) -> Result<ExpectedArtifacts, DiagramError> {
        self.store.require_root()?;
        let mut expected = ExpectedArtifacts::default();
        for occurrence in self.extractor.scan_tree(root)? {
            let key = occurrence.key();
            expected.insert(key, occurrence.source);
        }
        debug!(
            root = %root.display(),
            expected = expected.len(),
            "derived expected artifacts"
        );
        Ok(expected)
    }

    /// Keys the tree expects that have no artifact in the store.
    pub fn find_missing(&self, root: &Path) -> Result<BTreeSet<ArtifactKey>, DiagramError> {
        let expected = self.expected(root)?;
        Ok(expected.missing_from(&self.store.list()?))
    }

    /// Store filenames that no occurrence in the tree expects.
    pub fn find_orphaned(&self, root: &Path) -> Result<BTreeSet<String>, DiagramError> {
        let expected = self.expected(root)?;
        Ok(expected.orphans_in(&self.store.list()?))
    }

    /// Expected keys whose artifact is still a placeholder.
    pub fn find_pending(&self, root: &Path) -> Result<BTreeSet<ArtifactKey>, DiagramError> {
        let expected = self.expected(root)?;
        self.pending_in(&expected)
    }

    /// Expected keys in `expected` whose artifact is still a placeholder.
    pub fn pending_in(
        &self,
        expected: &ExpectedArtifacts,
    ) -> Result<BTreeSet<ArtifactKey>, DiagramError> {
        let mut pending = BTreeSet::new();
        for key in expected.keys() {
            if let Some(bytes) = self.store.read(key)? {
                if is_placeholder(&bytes) {
                    pending.insert(key.clone());
                }
            }
        }
        Ok(pending)
    }

    /// Deletes every orphaned artifact and returns the filenames removed.
    pub fn remove_orphans(&self, root: &Path) -> Result<Vec<String>, DiagramError> {
        let orphans = self.find_orphaned(root)?;
        self.delete_orphans(&orphans)
    }

    /// Deletes the given store filenames, returning those that were present.
    ///
    /// Also sweeps temporary files older than [`STALE_TEMP_AGE`]; those are
    /// not artifacts and are not part of the returned list.
    pub fn delete_orphans(&self, orphans: &BTreeSet<String>) -> Result<Vec<String>, DiagramError> {
        let mut removed = Vec::new();
        for name in orphans {
            if self.store.delete_file(name)? {
                info!(file = %name, "removed orphaned diagram");
                removed.push(name.clone());
            }
        }
        for name in self.store.sweep_temp_files(STALE_TEMP_AGE)? {
            info!(file = %name, "removed leftover temporary file");
        }
        Ok(removed)
    }
}
