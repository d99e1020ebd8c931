//! Shared foundational types for the diagram cache.
//!
//! This crate provides the fixed list of supported diagram languages, the
//! content digest used for artifact identity, and the artifact key derivation
//! that every other crate relies on to agree on filenames.

#![warn(missing_docs)]

pub mod diagram_type;
pub mod hash;
pub mod key;

pub use diagram_type::{DiagramType, UnknownDiagramType};
pub use hash::ContentHash;
pub use key::{is_valid_name, normalize_line_endings, ArtifactKey, Slot, ARTIFACT_SUFFIX};
