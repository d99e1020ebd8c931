//! Configuration types deserialized from `diagrams.toml`.

use diagram_common::DiagramType;
use serde::Deserialize;

/// Default rendering service.
pub const DEFAULT_SERVER_URL: &str = "https://kroki.io";

/// Default URL prefix under which the store directory is served.
pub const DEFAULT_PUBLIC_PATH: &str = "/diagrams";

/// Default render request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The top-level configuration parsed from `diagrams.toml`.
///
/// Every section is optional; an empty file yields the built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagramsConfig {
    /// Artifact store location and public URL.
    #[serde(default)]
    pub store: StoreConfig,
    /// Rendering service settings.
    #[serde(default)]
    pub render: RenderConfig,
    /// Markdown scanning settings.
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Where artifacts live and how pages reference them.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store directory override, resolved against the resolution base when relative.
    #[serde(default)]
    pub dir: Option<String>,
    /// URL prefix used in generated `<img src>` attributes.
    #[serde(default = "default_public_path")]
    pub public_path: String,
    /// Let readers click a figure to toggle it fullscreen.
    #[serde(default = "default_true")]
    pub fullscreen_toggle: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: None,
            public_path: default_public_path(),
            fullscreen_toggle: true,
        }
    }
}

/// Rendering service settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Base URL of the rendering service; the diagram type is appended as a path segment.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Markdown scanning settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Diagram types left to the default code block renderer.
    ///
    /// Names are matched case-insensitively; an unsupported name fails parsing.
    #[serde(default)]
    pub exclude_types: Vec<DiagramType>,
    /// Directory names never descended into during batch scans.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    /// Derive a positional id for diagrams without an explicit id.
    #[serde(default)]
    pub positional_ids: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_types: Vec::new(),
            skip_dirs: default_skip_dirs(),
            positional_ids: false,
        }
    }
}

fn default_public_path() -> String {
    DEFAULT_PUBLIC_PATH.to_string()
}

fn default_true() -> bool {
    true
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_skip_dirs() -> Vec<String> {
    ["node_modules", ".git", "vendor"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
