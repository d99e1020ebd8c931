//! Parsing and validation of `diagrams.toml` configuration files.
//!
//! This crate reads the optional configuration file into a strongly-typed
//! [`DiagramsConfig`] and resolves the artifact store root from an explicit
//! [`ResolveBase`] rather than ambient process state.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve_store_root, ResolveBase, DEFAULT_STORE_DIR};
pub use types::*;
