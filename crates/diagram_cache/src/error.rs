//! Error types for cache operations.

use std::path::PathBuf;

use diagram_common::{DiagramType, UnknownDiagramType};
use diagram_scan::ScanError;

use crate::render::RenderError;

/// Errors that can occur during cache operations.
///
/// During page rendering these are caught at the resolver boundary and shown
/// inline; the reconciliation commands treat them as fatal.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// The fence language is not a supported diagram type.
    #[error(transparent)]
    UnsupportedDiagramType(#[from] UnknownDiagramType),

    /// An id or positional id cannot be used inside a filename.
    #[error("invalid diagram identifier '{0}': only ASCII letters, digits, '-', '_' and '.' are allowed")]
    InvalidIdentifier(String),

    /// The rendering service failed.
    #[error("failed to render {diagram_type} diagram: {source}")]
    RenderService {
        /// The diagram language being rendered.
        diagram_type: DiagramType,
        /// The underlying failure.
        source: RenderError,
    },

    /// A filesystem operation in the artifact store failed.
    #[error("diagram store I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact store directory does not exist.
    #[error("no diagrams directory found: {0}")]
    NoArtifactDirectory(PathBuf),

    /// Scanning the documentation tree failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}
