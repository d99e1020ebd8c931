//! HTML fragments returned to the page renderer.

use diagram_common::ArtifactKey;
use diagram_config::{StoreConfig, DEFAULT_PUBLIC_PATH};

/// How fragments reference stored artifacts.
#[derive(Debug, Clone)]
pub struct FragmentOptions {
    /// URL prefix the store directory is served under, without trailing slash.
    pub public_path: String,
    /// Attach the click handler that toggles [`FULLSCREEN_CLASS`].
    pub fullscreen_toggle: bool,
}

/// Class set on a figure while it is shown fullscreen.
pub const FULLSCREEN_CLASS: &str = "diagram--fullscreen";

/// Clicking a figure makes it the only fullscreen figure on the page, or
/// restores it if it already was.
const FULLSCREEN_ONCLICK: &str = "var on = this.classList.contains('diagram--fullscreen'); \
document.querySelectorAll('.diagram--fullscreen').forEach(function (d) { d.classList.remove('diagram--fullscreen'); }); \
if (!on) { this.classList.add('diagram--fullscreen'); }";

impl Default for FragmentOptions {
    fn default() -> Self {
        Self {
            public_path: DEFAULT_PUBLIC_PATH.to_string(),
            fullscreen_toggle: true,
        }
    }
}

impl From<&StoreConfig> for FragmentOptions {
    fn from(config: &StoreConfig) -> Self {
        Self {
            public_path: config.public_path.trim_end_matches('/').to_string(),
            fullscreen_toggle: config.fullscreen_toggle,
        }
    }
}

impl FragmentOptions {
    /// Public URL of the artifact for `key`.
    pub fn artifact_url(&self, key: &ArtifactKey) -> String {
        format!("{}/{}", self.public_path, key.file_name())
    }

    /// Builds the figure referencing the artifact for `key`.
    pub fn figure(&self, key: &ArtifactKey, caption: Option<&str>) -> String {
        let diagram_type = key.diagram_type();
        let onclick = if self.fullscreen_toggle {
            format!(" onclick=\"{FULLSCREEN_ONCLICK}\"")
        } else {
            String::new()
        };
        let mut html = format!(
            "<figure class=\"diagram diagram--{diagram_type}\"{onclick}>\n  <img src=\"{}\" alt=\"{diagram_type} diagram\" class=\"diagram-image\" />\n",
            escape_html(&self.artifact_url(key)),
        );
        if let Some(caption) = caption.map(str::trim).filter(|c| !c.is_empty()) {
            html.push_str(&format!(
                "  <figcaption class=\"diagram-caption\">{}</figcaption>\n",
                escape_html(caption)
            ));
        }
        html.push_str("</figure>\n");
        html
    }
}

/// Builds the inline fragment shown in place of a diagram that failed.
pub fn error_fragment(message: &str) -> String {
    format!(
        "<div class=\"diagram-error\">Error converting diagram: {}</div>\n",
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_common::DiagramType;

    fn key() -> ArtifactKey {
        ArtifactKey::derive(DiagramType::Mermaid, "graph TD; A-->B", None, None)
    }

    #[test]
    fn figure_references_public_path() {
        let options = FragmentOptions {
            fullscreen_toggle: false,
            ..FragmentOptions::default()
        };
        let html = options.figure(&key(), None);
        assert!(html.starts_with("<figure class=\"diagram diagram--mermaid\">"));
        assert!(html.contains(&format!("src=\"/diagrams/{}\"", key().file_name())));
        assert!(html.contains("alt=\"mermaid diagram\""));
        assert!(!html.contains("figcaption"));
    }

    #[test]
    fn caption_is_escaped() {
        let html = FragmentOptions::default().figure(&key(), Some("A <b> & \"c\""));
        assert!(html.contains(
            "<figcaption class=\"diagram-caption\">A &lt;b&gt; &amp; &quot;c&quot;</figcaption>"
        ));
    }

    #[test]
    fn blank_caption_omitted() {
        let html = FragmentOptions::default().figure(&key(), Some("   "));
        assert!(!html.contains("figcaption"));
    }

    #[test]
    fn public_path_trailing_slash_trimmed() {
        let config = StoreConfig {
            dir: None,
            public_path: "/assets/diagrams/".to_string(),
            fullscreen_toggle: false,
        };
        let options = FragmentOptions::from(&config);
        assert_eq!(
            options.artifact_url(&key()),
            format!("/assets/diagrams/{}", key().file_name())
        );
    }

    #[test]
    fn error_fragment_escapes_message() {
        assert_eq!(
            error_fragment("bad <input>"),
            "<div class=\"diagram-error\">Error converting diagram: bad &lt;input&gt;</div>\n"
        );
    }

    #[test]
    fn figure_toggles_fullscreen_on_click() {
        let html = FragmentOptions::default().figure(&key(), None);
        let open_tag = html.lines().next().unwrap();
        assert!(open_tag.starts_with("<figure class=\"diagram diagram--mermaid\" onclick=\""));
        assert!(open_tag.contains("classList.add('diagram--fullscreen')"));
        assert!(open_tag.contains("querySelectorAll('.diagram--fullscreen')"));
        assert!(open_tag.ends_with("\">"));
        // The handler must not close the attribute early.
        assert_eq!(open_tag.matches('"').count(), 4);
    }

    #[test]
    fn fullscreen_toggle_follows_config() {
        let config = StoreConfig {
            fullscreen_toggle: false,
            ..StoreConfig::default()
        };
        let html = FragmentOptions::from(&config).figure(&key(), None);
        assert!(!html.contains("onclick"));
        assert!(!html.contains(FULLSCREEN_CLASS));
    }
}
