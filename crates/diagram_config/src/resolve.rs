//! Artifact store root resolution.
//!
//! The store root is resolved once, up front, from an explicit [`ResolveBase`]
//! so the cache itself never consults the process working directory.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Store location used when nothing is configured, relative to the base.
pub const DEFAULT_STORE_DIR: &str = "docs/public/diagrams";

/// The directories a relative store path may be resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveBase {
    /// The process working directory, if it could be determined.
    pub cwd: Option<PathBuf>,
    /// A working directory reported by the environment (`PWD`, then `INIT_CWD`).
    pub env_pwd: Option<PathBuf>,
}

impl ResolveBase {
    /// Captures the base from the current process.
    ///
    /// Only front ends should call this; library code takes a `ResolveBase`
    /// or an already-resolved root.
    pub fn from_process() -> Self {
        let env_pwd = ["PWD", "INIT_CWD"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .map(PathBuf::from)
            .find(|p| p.is_absolute());
        Self {
            cwd: std::env::current_dir().ok(),
            env_pwd,
        }
    }

    /// A base rooted at a single known directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(dir.into()),
            env_pwd: None,
        }
    }

    fn base(&self) -> Option<&Path> {
        self.cwd.as_deref().or(self.env_pwd.as_deref())
    }
}

/// Resolves the artifact store root to an absolute path.
///
/// Precedence: an explicit `dir` (used as-is when absolute, otherwise joined to
/// the base), then the base joined with [`DEFAULT_STORE_DIR`]. The base is the
/// working directory, falling back to the environment-reported one.
pub fn resolve_store_root(dir: Option<&str>, base: &ResolveBase) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = dir {
        let explicit = Path::new(dir);
        if explicit.is_absolute() {
            return Ok(explicit.to_path_buf());
        }
    }

    let base = base.base().ok_or(ConfigError::NoBaseDirectory)?;
    let joined = base.join(dir.unwrap_or(DEFAULT_STORE_DIR));
    if joined.is_absolute() {
        Ok(joined)
    } else {
        Ok(std::path::absolute(&joined)?)
    }
}
