//! Diagram occurrence extraction from markdown documents.
//!
//! Markdown is flattened into a sequence of [`Block`]s. The [`Extractor`]
//! recognizes fenced diagram blocks in that sequence, either one block at a
//! time while a page is being rendered, or across a whole documentation tree
//! for reconciliation.

#![warn(missing_docs)]

pub mod blocks;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod occurrence;
pub mod walk;

pub use blocks::{tokenize, Block};
pub use error::ScanError;
pub use extract::{DocumentInfo, Extractor, ScanOptions};
pub use metadata::{parse_metadata_comment, DiagramMetadata};
pub use occurrence::{DiagramOccurrence, SourceLocation};
