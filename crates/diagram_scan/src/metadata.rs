//! Author-supplied diagram metadata carried in an HTML comment.
//!
//! The block immediately after a diagram fence may be a comment of the form
//! `<!-- diagram id="login-flow" caption="Login sequence" -->`. Attributes may
//! appear in any order and either may be omitted.

/// Optional id and caption attached to a diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramMetadata {
    /// Stable author id.
    pub id: Option<String>,
    /// Caption rendered under the diagram.
    pub caption: Option<String>,
}

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const KEYWORD: &str = "diagram";

/// Parses a `<!-- diagram ... -->` comment out of an HTML block.
///
/// Returns `None` if the block holds no such comment. Attribute values are
/// trimmed and empty values are treated as absent. Malformed trailing input
/// ends the attribute list without discarding what was already read.
pub fn parse_metadata_comment(html: &str) -> Option<DiagramMetadata> {
    let mut search = html;
    loop {
        let start = search.find(COMMENT_OPEN)?;
        let after_open = search[start + COMMENT_OPEN.len()..].trim_start();
        if let Some(rest) = after_open.strip_prefix(KEYWORD) {
            if rest.starts_with(char::is_whitespace) || rest.starts_with(COMMENT_CLOSE) {
                return Some(parse_attributes(rest));
            }
        }
        search = &search[start + COMMENT_OPEN.len()..];
    }
}

fn parse_attributes(mut rest: &str) -> DiagramMetadata {
    let mut meta = DiagramMetadata::default();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with(COMMENT_CLOSE) {
            break;
        }

        let name_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        if name_len == 0 {
            break;
        }
        let name = &rest[..name_len];

        let Some(after_eq) = rest[name_len..].trim_start().strip_prefix('=') else {
            break;
        };
        let Some(quoted) = after_eq.trim_start().strip_prefix('"') else {
            break;
        };
        let Some(end) = quoted.find('"') else {
            break;
        };

        let value = quoted[..end].trim();
        let value = (!value.is_empty()).then(|| value.to_string());
        match name {
            "id" => meta.id = value,
            "caption" => meta.caption = value,
            _ => {}
        }
        rest = &quoted[end + 1..];
    }
    meta
}
