//! Error types for documentation tree scans.

use std::path::PathBuf;

/// Errors that can occur while scanning a documentation tree.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The documentation root does not exist or is not a directory.
    #[error("documentation root not found: {0}")]
    MissingRoot(PathBuf),

    /// A markdown file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("failed to walk documentation tree: {0}")]
    Walk(#[from] ignore::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_display() {
        let err = ScanError::MissingRoot(PathBuf::from("docs"));
        assert_eq!(err.to_string(), "documentation root not found: docs");
    }

    #[test]
    fn io_display_names_path() {
        let err = ScanError::Io {
            path: PathBuf::from("docs/guide.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("docs/guide.md"));
        assert!(msg.contains("denied"));
    }
}
