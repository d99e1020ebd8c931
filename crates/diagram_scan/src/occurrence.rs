//! A diagram found in a document.

use std::fmt;
use std::path::PathBuf;

use diagram_common::{ArtifactKey, DiagramType};

/// Where an occurrence was found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    /// The markdown file.
    pub path: PathBuf,
    /// 1-based line of the opening fence.
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// One fenced diagram block found while scanning a document.
///
/// Constructed transiently; only the derived key and the rendered artifact
/// are ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramOccurrence {
    /// Diagram language.
    pub diagram_type: DiagramType,
    /// Trimmed diagram source with `\n` line endings.
    pub content: String,
    /// Author-supplied stable id.
    pub id: Option<String>,
    /// Fallback id derived from the diagram's position in its document.
    pub position_id: Option<String>,
    /// Caption text; has no effect on identity.
    pub caption: Option<String>,
    /// Source file and line, when scanned from disk.
    pub source: Option<SourceLocation>,
}

impl DiagramOccurrence {
    /// Creates an occurrence with no metadata.
    pub fn new(diagram_type: DiagramType, content: impl Into<String>) -> Self {
        Self {
            diagram_type,
            content: content.into(),
            id: None,
            position_id: None,
            caption: None,
            source: None,
        }
    }

    /// Sets the author id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the positional id.
    pub fn with_position_id(mut self, position_id: impl Into<String>) -> Self {
        self.position_id = Some(position_id.into());
        self
    }

    /// Sets the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Derives the artifact key for this occurrence.
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::derive(
            self.diagram_type,
            &self.content,
            self.id.as_deref(),
            self.position_id.as_deref(),
        )
    }
}
