//! Recognition of diagram fences in a block sequence.

use std::path::{Component, Path, PathBuf};

use diagram_common::{is_valid_name, normalize_line_endings, DiagramType};
use diagram_config::ScanConfig;
use tracing::warn;

use crate::blocks::{tokenize, Block};
use crate::metadata::{parse_metadata_comment, DiagramMetadata};
use crate::occurrence::{DiagramOccurrence, SourceLocation};

/// Settings that control which fences count as diagrams.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Supported types that are nevertheless left to the default renderer.
    pub excluded_types: Vec<DiagramType>,
    /// Whether unnamed diagrams get a positional id.
    pub positional_ids: bool,
    /// Directory names skipped during tree scans.
    pub skip_dirs: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for ScanOptions {
    fn from(config: &ScanConfig) -> Self {
        Self {
            excluded_types: config.exclude_types.clone(),
            positional_ids: config.positional_ids,
            skip_dirs: config.skip_dirs.clone(),
        }
    }
}

/// Identity of the document being scanned.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    /// Path reported in occurrence source locations.
    pub path: Option<PathBuf>,
    /// Stable document name used to build positional ids.
    pub slug: Option<String>,
}

impl DocumentInfo {
    /// A document with no known location.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A document at `path`, with a slug derived from its location under `root`.
    ///
    /// `guide/setup.md` under the root becomes the slug `guide-setup`.
    pub fn for_file(root: &Path, path: &Path) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let stem = relative.with_extension("");
        let slug = stem
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .map(|part| {
                part.chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                            c
                        } else {
                            '-'
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("-");

        Self {
            path: Some(path.to_path_buf()),
            slug: is_valid_name(&slug).then_some(slug),
        }
    }
}

/// Finds diagram occurrences in markdown.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ScanOptions,
}

impl Extractor {
    /// Creates an extractor with the given options.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// The options this extractor was built with.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Returns the diagram type of a fence info string, if it is a supported
    /// and not excluded diagram language.
    pub fn diagram_type_of(&self, info: &str) -> Option<DiagramType> {
        let diagram_type: DiagramType = info.parse().ok()?;
        (!self.options.excluded_types.contains(&diagram_type)).then_some(diagram_type)
    }

    /// Single-block mode: interprets `blocks[idx]` as a diagram occurrence.
    ///
    /// Returns `None` when the block is not a fence, or its language is not a
    /// supported diagram type, so the caller can fall through to its default
    /// code block handling.
    pub fn extract_at(
        &self,
        blocks: &[Block],
        idx: usize,
        doc: &DocumentInfo,
    ) -> Option<DiagramOccurrence> {
        // Positional ids count diagrams, not fences, so only diagram fences
        // before `idx` contribute to the ordinal.
        let ordinal = blocks[..idx.min(blocks.len())]
            .iter()
            .filter(|b| self.fence_type(b).is_some())
            .count()
            + 1;
        self.occurrence_at(blocks, idx, ordinal, doc)
    }

    /// Extracts every diagram occurrence from a block sequence, in order.
    pub fn extract_all(&self, blocks: &[Block], doc: &DocumentInfo) -> Vec<DiagramOccurrence> {
        let mut occurrences = Vec::new();
        for (idx, block) in blocks.iter().enumerate() {
            if self.fence_type(block).is_none() {
                continue;
            }
            let ordinal = occurrences.len() + 1;
            if let Some(occ) = self.occurrence_at(blocks, idx, ordinal, doc) {
                occurrences.push(occ);
            }
        }
        occurrences
    }

    /// Tokenizes `markdown` and extracts every diagram occurrence.
    pub fn extract_markdown(&self, markdown: &str, doc: &DocumentInfo) -> Vec<DiagramOccurrence> {
        self.extract_all(&tokenize(markdown), doc)
    }

    fn fence_type(&self, block: &Block) -> Option<DiagramType> {
        match block {
            Block::Fence { info, .. } => self.diagram_type_of(info),
            _ => None,
        }
    }

    fn occurrence_at(
        &self,
        blocks: &[Block],
        idx: usize,
        ordinal: usize,
        doc: &DocumentInfo,
    ) -> Option<DiagramOccurrence> {
        let Block::Fence { info, body, line } = blocks.get(idx)? else {
            return None;
        };
        let diagram_type = self.diagram_type_of(info)?;
        let meta = metadata_after(blocks, idx);

        let source = doc.path.as_ref().map(|path| SourceLocation {
            path: path.clone(),
            line: *line,
        });

        let id = meta.id.filter(|id| {
            let ok = is_valid_name(id);
            if !ok {
                warn!(
                    id = %id,
                    source = ?source,
                    "ignoring diagram id: only ASCII letters, digits, '-', '_' and '.' are allowed"
                );
            }
            ok
        });

        let position_id = match (&id, &doc.slug) {
            (None, Some(slug)) if self.options.positional_ids => Some(format!("{slug}-{ordinal}")),
            _ => None,
        };

        Some(DiagramOccurrence {
            diagram_type,
            content: normalize_line_endings(body.trim()),
            id,
            position_id,
            caption: meta.caption,
            source,
        })
    }
}

/// Reads metadata from the block right after `idx`, if it is an HTML block.
fn metadata_after(blocks: &[Block], idx: usize) -> DiagramMetadata {
    match blocks.get(idx + 1) {
        Some(Block::Html { content }) => parse_metadata_comment(content).unwrap_or_default(),
        _ => DiagramMetadata::default(),
    }
}
