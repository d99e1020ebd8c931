//! Artifact identity: the deterministic filename of a rendered diagram.
//!
//! A key is `{type}[-{name}]-{digest}.svg`, where `name` is the author id or,
//! failing that, the positional id, and `digest` is the [`ContentHash`] of the
//! line-ending-normalized diagram body. Both the live resolver and the
//! reconciliation checks derive keys through [`ArtifactKey::derive`] so they
//! can never disagree on a filename.

use std::fmt;

use crate::diagram_type::DiagramType;
use crate::hash::ContentHash;

/// Filename suffix shared by every artifact in the store.
pub const ARTIFACT_SUFFIX: &str = ".svg";

/// Converts `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Returns `true` if `name` may appear inside an artifact filename.
///
/// Names are limited to ASCII alphanumerics, `-`, `_` and `.` so that a key
/// always addresses a file directly inside the flat store directory.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// The identity group an artifact belongs to.
///
/// At most one live artifact should exist per named slot. Bare slots group
/// every unnamed artifact of one diagram type.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// `(type, id-or-positionId)`.
    Named {
        /// Diagram language.
        diagram_type: DiagramType,
        /// Author id or positional id.
        name: String,
    },
    /// Pure content-hash artifacts of one diagram type.
    Bare(DiagramType),
}

/// The deterministic identity of a rendered diagram artifact.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey {
    diagram_type: DiagramType,
    name: Option<String>,
    digest: ContentHash,
}

impl ArtifactKey {
    /// Derives the key for one diagram occurrence.
    ///
    /// `content` is normalized before hashing. An explicit `id` takes
    /// precedence over `position_id`; with neither the key has the bare
    /// `type-digest` form.
    pub fn derive(
        diagram_type: DiagramType,
        content: &str,
        id: Option<&str>,
        position_id: Option<&str>,
    ) -> Self {
        let normalized = normalize_line_endings(content);
        Self {
            diagram_type,
            name: id.or(position_id).map(str::to_string),
            digest: ContentHash::from_bytes(normalized.as_bytes()),
        }
    }

    /// Recovers a key from a store filename.
    ///
    /// The type is matched against the longest supported name that is followed
    /// by `-`, and the digest must be the trailing 32 hex characters. Returns
    /// `None` for anything this crate could not have produced.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(ARTIFACT_SUFFIX)?;
        let (rest, digest) = stem.rsplit_once('-')?;
        let digest: ContentHash = digest.parse().ok()?;

        let diagram_type = DiagramType::ALL
            .iter()
            .copied()
            .filter(|t| {
                rest == t.as_str()
                    || rest
                        .strip_prefix(t.as_str())
                        .is_some_and(|tail| tail.starts_with('-'))
            })
            .max_by_key(|t| t.as_str().len())?;

        let name = match &rest[diagram_type.as_str().len()..] {
            "" => None,
            tail => {
                let name = &tail[1..];
                if !is_valid_name(name) {
                    return None;
                }
                Some(name.to_string())
            }
        };

        Some(Self {
            diagram_type,
            name,
            digest,
        })
    }

    /// The diagram language.
    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    /// The id or positional id embedded in the filename, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The content digest.
    pub fn digest(&self) -> ContentHash {
        self.digest
    }

    /// The identity group this key belongs to.
    pub fn slot(&self) -> Slot {
        match &self.name {
            Some(name) => Slot::Named {
                diagram_type: self.diagram_type,
                name: name.clone(),
            },
            None => Slot::Bare(self.diagram_type),
        }
    }

    /// The on-disk filename.
    pub fn file_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(
                f,
                "{}-{}-{}{ARTIFACT_SUFFIX}",
                self.diagram_type, name, self.digest
            ),
            None => write!(f, "{}-{}{ARTIFACT_SUFFIX}", self.diagram_type, self.digest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(s: &str) -> String {
        ContentHash::from_bytes(s.as_bytes()).to_string()
    }

    #[test]
    fn derive_is_deterministic() {
        let a = ArtifactKey::derive(DiagramType::Mermaid, "graph TD; A-->B", None, None);
        let b = ArtifactKey::derive(DiagramType::Mermaid, "graph TD; A-->B", None, None);
        assert_eq!(a, b);
        assert_eq!(a.file_name(), b.file_name());
    }

    #[test]
    fn bare_form() {
        let key = ArtifactKey::derive(DiagramType::Mermaid, "graph TD; A-->B", None, None);
        assert_eq!(
            key.file_name(),
            format!("mermaid-{}.svg", digest_of("graph TD; A-->B"))
        );
        assert_eq!(key.slot(), Slot::Bare(DiagramType::Mermaid));
    }

    #[test]
    fn id_wins_over_position() {
        let key = ArtifactKey::derive(DiagramType::Plantuml, "X", Some("login-flow"), Some("p-1"));
        assert_eq!(key.file_name(), format!("plantuml-login-flow-{}.svg", digest_of("X")));
    }

    #[test]
    fn position_used_without_id() {
        let key = ArtifactKey::derive(DiagramType::D2, "a -> b", None, Some("guide-2"));
        assert_eq!(key.file_name(), format!("d2-guide-2-{}.svg", digest_of("a -> b")));
        assert_eq!(key.name(), Some("guide-2"));
    }

    #[test]
    fn content_change_changes_digest_only() {
        let a = ArtifactKey::derive(DiagramType::Plantuml, "X", Some("login-flow"), None);
        let b = ArtifactKey::derive(DiagramType::Plantuml, "Y", Some("login-flow"), None);
        assert_ne!(a, b);
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.slot(), b.slot());
    }

    #[test]
    fn line_endings_do_not_change_key() {
        let unix = ArtifactKey::derive(DiagramType::Graphviz, "digraph {\n a -> b\n}", None, None);
        let dos = ArtifactKey::derive(DiagramType::Graphviz, "digraph {\r\n a -> b\r\n}", None, None);
        let mac = ArtifactKey::derive(DiagramType::Graphviz, "digraph {\r a -> b\r}", None, None);
        assert_eq!(unix, dos);
        assert_eq!(unix, mac);
    }

    #[test]
    fn parse_recovers_every_shape() {
        for key in [
            ArtifactKey::derive(DiagramType::Mermaid, "m", None, None),
            ArtifactKey::derive(DiagramType::Plantuml, "p", Some("login-flow"), None),
            ArtifactKey::derive(DiagramType::VegaLite, "v", None, None),
            ArtifactKey::derive(DiagramType::VegaLite, "v", Some("chart.v2"), None),
        ] {
            assert_eq!(ArtifactKey::parse(&key.file_name()), Some(key));
        }
    }

    #[test]
    fn parse_prefers_longest_type() {
        let name = format!("vega-lite-{}.svg", digest_of("x"));
        let key = ArtifactKey::parse(&name).unwrap();
        assert_eq!(key.diagram_type(), DiagramType::VegaLite);
        assert_eq!(key.name(), None);
    }

    #[test]
    fn parse_rejects_foreign_files() {
        assert!(ArtifactKey::parse("logo.svg").is_none());
        assert!(ArtifactKey::parse("mermaid-abc.svg").is_none());
        assert!(ArtifactKey::parse(&format!("foobar-{}.svg", digest_of("x"))).is_none());
        assert!(ArtifactKey::parse(&format!("mermaid-{}.png", digest_of("x"))).is_none());
        assert!(ArtifactKey::parse(&format!("mermaidx-{}.svg", digest_of("x"))).is_none());
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("login-flow"));
        assert!(is_valid_name("v1.2_final"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("with space"));
    }
}
