//! The sentinel SVG written while a render is in progress.

use diagram_common::DiagramType;

/// Comment that marks an artifact as a placeholder.
pub const PLACEHOLDER_MARKER: &str = "<!-- diagram-placeholder -->";

/// Builds the placeholder SVG for a diagram type.
pub fn placeholder_svg(diagram_type: DiagramType) -> String {
    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="100%" height="120" xmlns="http://www.w3.org/2000/svg">
  {PLACEHOLDER_MARKER}
  <rect width="100%" height="120" fill="#f5f5f5"/>
  <text x="50%" y="45%" font-family="system-ui" font-size="14" fill="#666" text-anchor="middle" dominant-baseline="middle">Generating {diagram_type} diagram...</text>
  <text x="50%" y="65%" font-family="system-ui" font-size="14" fill="#666" text-anchor="middle" dominant-baseline="middle">Refresh the page.</text>
</svg>
"##
    )
}

/// Returns `true` if the artifact bytes are a placeholder.
pub fn is_placeholder(bytes: &[u8]) -> bool {
    let marker = PLACEHOLDER_MARKER.as_bytes();
    bytes.windows(marker.len()).any(|w| w == marker)
}
