//! Content-addressed diagram artifact cache.
//!
//! This crate keeps a flat directory of rendered SVG artifacts in sync with
//! the diagrams embedded in a documentation tree. The [`Resolver`] turns one
//! occurrence into an HTML fragment, rendering in the background on a cache
//! miss, and the [`Reconciler`] compares a whole tree against the store to find
//! missing and orphaned artifacts.

#![warn(missing_docs)]

pub mod error;
pub mod fragment;
pub mod index;
pub mod inflight;
pub mod placeholder;
pub mod reconcile;
pub mod render;
pub mod resolver;
pub mod store;

pub use error::DiagramError;
pub use fragment::{error_fragment, FragmentOptions};
pub use index::SlotIndex;
pub use inflight::InFlight;
pub use reconcile::{ExpectedArtifacts, Reconciler};
pub use render::{KrokiRenderer, RenderError, Renderer};
pub use resolver::{PassSummary, Resolver};
pub use store::ArtifactStore;
