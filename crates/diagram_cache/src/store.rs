//! The on-disk artifact directory.
//!
//! Artifacts live as flat `*.svg` files directly inside a single root
//! directory, named by their [`ArtifactKey`]. Writes go to a temporary file in
//! the same directory and are renamed into place, so a concurrent reader sees
//! either the old file or the complete new one.

use std::collections::BTreeSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use diagram_common::{ArtifactKey, ARTIFACT_SUFFIX};

use crate::error::DiagramError;

/// Filename prefix of in-progress writes. Never listed as an artifact.
const TEMP_PREFIX: &str = ".tmp";

/// Mode of stored artifacts: the web server must be able to read them.
#[cfg(unix)]
const ARTIFACT_MODE: u32 = 0o644;

/// Flat directory of rendered diagram artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Absolute store directory.
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `true` if the store directory exists.
    pub fn root_exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Creates the store directory and its parents if absent.
    pub fn ensure_root(&self) -> Result<(), DiagramError> {
        std::fs::create_dir_all(&self.root).map_err(|e| self.io_err(&self.root, e))
    }

    /// Fails with [`DiagramError::NoArtifactDirectory`] unless the root exists.
    pub fn require_root(&self) -> Result<(), DiagramError> {
        if self.root_exists() {
            Ok(())
        } else {
            Err(DiagramError::NoArtifactDirectory(self.root.clone()))
        }
    }

    /// Returns the file path for an artifact with the given key.
    pub fn artifact_path(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Returns `true` if an artifact exists for `key`.
    pub fn exists(&self, key: &ArtifactKey) -> bool {
        self.artifact_path(key).is_file()
    }

    /// Reads an artifact, returning `None` if it does not exist.
    pub fn read(&self, key: &ArtifactKey) -> Result<Option<Vec<u8>>, DiagramError> {
        self.read_file(&key.file_name())
    }

    /// Reads a store entry by filename, returning `None` if it does not exist.
    pub fn read_file(&self, file_name: &str) -> Result<Option<Vec<u8>>, DiagramError> {
        let path = self.root.join(file_name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(&path, e)),
        }
    }

    /// Atomically writes an artifact, replacing any existing file.
    ///
    /// On Unix the artifact is world-readable (`0644`) regardless of the mode
    /// the temporary file was created with.
    pub fn write(&self, key: &ArtifactKey, bytes: &[u8]) -> Result<(), DiagramError> {
        let path = self.artifact_path(key);
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)
            .map_err(|e| self.io_err(&self.root, e))?;
        temp.write_all(bytes)
            .map_err(|e| self.io_err(temp.path(), e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(ARTIFACT_MODE))
                .map_err(|e| self.io_err(temp.path(), e))?;
        }
        temp.persist(&path).map_err(|e| self.io_err(&path, e.error))?;
        Ok(())
    }

    /// Removes temporary files left behind by interrupted writes.
    ///
    /// Only regular files with the temporary prefix last modified more than
    /// `older_than` ago are touched, so writes in progress are left alone.
    /// Returns the removed filenames. A missing root sweeps nothing.
    pub fn sweep_temp_files(&self, older_than: Duration) -> Result<Vec<String>, DiagramError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(&self.root, e)),
        };
        let cutoff = SystemTime::now()
            .checked_sub(older_than)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut removed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_err(&self.root, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !name.starts_with(TEMP_PREFIX) {
                continue;
            }
            let path = entry.path();
            let metadata = entry.metadata().map_err(|e| self.io_err(&path, e))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().map_err(|e| self.io_err(&path, e))?;
            if modified > cutoff {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed.push(name),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(self.io_err(&path, e)),
            }
        }
        Ok(removed)
    }

    /// Deletes an artifact. Returns `false` if it was already gone.
    pub fn delete(&self, key: &ArtifactKey) -> Result<bool, DiagramError> {
        self.delete_file(&key.file_name())
    }

    /// Deletes a store entry by filename. Returns `false` if it was already gone.
    ///
    /// Only plain artifact filenames are accepted; anything that could escape
    /// the root is treated as absent.
    pub fn delete_file(&self, file_name: &str) -> Result<bool, DiagramError> {
        if !is_plain_artifact_name(file_name) {
            return Ok(false);
        }
        let path = self.root.join(file_name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_err(&path, e)),
        }
    }

    /// Lists the filenames in the store that carry the artifact suffix.
    ///
    /// A missing root lists as empty.
    pub fn list(&self) -> Result<BTreeSet<String>, DiagramError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(self.io_err(&self.root, e)),
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_err(&self.root, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_plain_artifact_name(name) {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Lists the store entries that parse as artifact keys.
    pub fn list_keys(&self) -> Result<Vec<ArtifactKey>, DiagramError> {
        Ok(self
            .list()?
            .iter()
            .filter_map(|name| ArtifactKey::parse(name))
            .collect())
    }

    fn io_err(&self, path: &Path, source: std::io::Error) -> DiagramError {
        DiagramError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn is_plain_artifact_name(name: &str) -> bool {
    name.ends_with(ARTIFACT_SUFFIX)
        && name.len() > ARTIFACT_SUFFIX.len()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_common::DiagramType;

    fn make_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("diagrams"));
        store.ensure_root().unwrap();
        (dir, store)
    }

    fn key(content: &str) -> ArtifactKey {
        ArtifactKey::derive(DiagramType::Mermaid, content, None, None)
    }

    #[test]
    fn write_and_read_roundtrip() {
        let (_dir, store) = make_store();
        let k = key("graph TD; A-->B");
        store.write(&k, b"<svg/>").unwrap();
        assert!(store.exists(&k));
        assert_eq!(store.read(&k).unwrap().unwrap(), b"<svg/>");
    }

    #[test]
    fn read_missing_returns_none() {
        let (_dir, store) = make_store();
        assert!(store.read(&key("absent")).unwrap().is_none());
        assert!(!store.exists(&key("absent")));
    }

    #[test]
    fn write_replaces_existing() {
        let (_dir, store) = make_store();
        let k = key("x");
        store.write(&k, b"placeholder").unwrap();
        store.write(&k, b"final").unwrap();
        assert_eq!(store.read(&k).unwrap().unwrap(), b"final");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let (_dir, store) = make_store();
        store.write(&key("a"), b"<svg/>").unwrap();
        let entries = std::fs::read_dir(store.root()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn written_artifacts_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = make_store();
        let k = key("graph TD; A-->B");
        store.write(&k, b"<svg/>").unwrap();
        let mode = std::fs::metadata(store.artifact_path(&k))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    fn age(path: &Path, by: Duration) {
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::now() - by)
            .unwrap();
    }

    #[test]
    fn sweep_removes_only_stale_temp_files() {
        let (_dir, store) = make_store();
        let stale = store.root().join(".tmpAbC123");
        let fresh = store.root().join(".tmpXyZ789");
        std::fs::write(&stale, b"<svg").unwrap();
        std::fs::write(&fresh, b"<svg").unwrap();
        age(&stale, Duration::from_secs(7200));
        store.write(&key("a"), b"<svg/>").unwrap();
        std::fs::write(store.root().join("notes.txt"), b"x").unwrap();
        age(&store.root().join("notes.txt"), Duration::from_secs(7200));

        let removed = store.sweep_temp_files(Duration::from_secs(600)).unwrap();
        assert_eq!(removed, vec![".tmpAbC123".to_string()]);
        assert!(!stale.exists());
        assert!(fresh.exists());
        assert!(store.exists(&key("a")));
        assert!(store.root().join("notes.txt").exists());
    }

    #[test]
    fn sweep_of_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("absent"));
        assert!(store.sweep_temp_files(Duration::ZERO).unwrap().is_empty());
    }

    #[test]
    fn delete_reports_presence() {
        let (_dir, store) = make_store();
        let k = key("x");
        store.write(&k, b"<svg/>").unwrap();
        assert!(store.delete(&k).unwrap());
        assert!(!store.delete(&k).unwrap());
        assert!(!store.exists(&k));
    }

    #[test]
    fn delete_file_rejects_paths() {
        let (dir, store) = make_store();
        std::fs::write(dir.path().join("outside.svg"), b"keep").unwrap();
        assert!(!store.delete_file("../outside.svg").unwrap());
        assert!(dir.path().join("outside.svg").exists());
    }

    #[test]
    fn list_filters_suffix_and_directories() {
        let (_dir, store) = make_store();
        store.write(&key("a"), b"<svg/>").unwrap();
        std::fs::write(store.root().join("notes.txt"), b"x").unwrap();
        std::fs::write(store.root().join(".hidden.svg"), b"x").unwrap();
        std::fs::create_dir(store.root().join("nested.svg")).unwrap();

        let names = store.list().unwrap();
        assert_eq!(names.len(), 1);
        assert!(names.contains(&key("a").file_name()));
    }

    #[test]
    fn list_keys_skips_foreign_svgs() {
        let (_dir, store) = make_store();
        store.write(&key("a"), b"<svg/>").unwrap();
        std::fs::write(store.root().join("logo.svg"), b"<svg/>").unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(store.list_keys().unwrap(), vec![key("a")]);
    }

    #[test]
    fn missing_root_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
        assert!(matches!(
            store.require_root(),
            Err(DiagramError::NoArtifactDirectory(_))
        ));
    }

    #[test]
    fn ensure_root_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("deeply").join("nested"));
        store.ensure_root().unwrap();
        store.ensure_root().unwrap();
        assert!(store.root_exists());
    }
}
