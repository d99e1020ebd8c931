//! Shared setup for CLI commands.
//!
//! Loads configuration, resolves the store root once from the process
//! environment, and builds the store and extractor every command works with.

use std::path::{Path, PathBuf};

use diagram_cache::{ArtifactStore, Reconciler};
use diagram_config::{resolve_store_root, DiagramsConfig, ResolveBase};
use diagram_scan::{Extractor, ScanOptions};
use serde::Serialize;
use tracing::debug;

use crate::{GlobalArgs, ReportFormat};

/// Everything a command needs to touch the store.
pub struct Context {
    /// The loaded configuration.
    pub config: DiagramsConfig,
    /// The artifact store.
    pub store: ArtifactStore,
    /// Extractor configured from the `[scan]` section.
    pub extractor: Extractor,
}

impl Context {
    /// Loads configuration and resolves the store for the current process.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(global, &ResolveBase::from_process())
    }

    /// Like [`Context::load`] with an explicit resolution base.
    pub fn load_from(
        global: &GlobalArgs,
        base: &ResolveBase,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let (config, project_base) = load_settings(global, base)?;

        // A command-line override is relative to where the command runs; the
        // configured directory is relative to the configuration file.
        let root = match global.diagrams_dir.as_deref() {
            Some(dir) => resolve_store_root(Some(dir), base)?,
            None => resolve_store_root(config.store.dir.as_deref(), &project_base)?,
        };
        debug!(root = %root.display(), "resolved diagrams directory");

        let extractor = Extractor::new(ScanOptions::from(&config.scan));
        Ok(Self {
            config,
            store: ArtifactStore::new(root),
            extractor,
        })
    }

    /// Builds a reconciler over this context's store.
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.store.clone(), self.extractor.clone())
    }
}

/// Loads `--config` if given, else `diagrams.toml` next to the working
/// directory if present, else the defaults. Returns the config together with
/// the base its relative paths resolve against.
fn load_settings(
    global: &GlobalArgs,
    base: &ResolveBase,
) -> Result<(DiagramsConfig, ResolveBase), Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let path = PathBuf::from(config_path);
        let config = diagram_config::load_config_file(&path)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let dir = std::path::absolute(&dir)?;
        return Ok((config, ResolveBase::at(dir)));
    }

    let project_dir = match base.cwd.as_ref().or(base.env_pwd.as_ref()) {
        Some(dir) => dir.clone(),
        None => return Err(diagram_config::ConfigError::NoBaseDirectory.into()),
    };
    let config = diagram_config::load_config(&project_dir)?;
    Ok((config, base.clone()))
}

/// Prints a report as pretty JSON on stdout.
pub fn print_json<T: Serialize>(report: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Returns `true` if human-readable progress should be printed.
pub fn show_text(global: &GlobalArgs) -> bool {
    !global.quiet && global.format == ReportFormat::Text
}
