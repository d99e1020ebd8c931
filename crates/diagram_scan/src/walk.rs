//! Batch mode: scanning a whole documentation tree.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::debug;

use crate::error::ScanError;
use crate::extract::{DocumentInfo, Extractor};
use crate::occurrence::DiagramOccurrence;

/// Recursively lists `*.md` files under `root`, sorted by path.
///
/// Directories whose name appears in `skip_dirs` are not descended into.
/// Ignore files are not consulted: generated or vendored docs are excluded
/// by name only.
pub fn markdown_files(root: &Path, skip_dirs: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let skip = skip_dirs.to_vec();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && entry.depth() > 0 && skip.iter().any(|s| entry.file_name() == s.as_str()))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file && entry.path().extension().is_some_and(|ext| ext == "md") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

impl Extractor {
    /// Reads one markdown file and extracts its occurrences.
    ///
    /// `root` is only used to derive the document slug for positional ids.
    pub fn scan_file(&self, root: &Path, path: &Path) -> Result<Vec<DiagramOccurrence>, ScanError> {
        let markdown = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(self.extract_markdown(&markdown, &DocumentInfo::for_file(root, path)))
    }

    /// Batch mode: every occurrence in every markdown file under `root`.
    ///
    /// Files are parsed in parallel; the result is ordered by file path and
    /// then by position within the file.
    pub fn scan_tree(&self, root: &Path) -> Result<Vec<DiagramOccurrence>, ScanError> {
        let files = markdown_files(root, &self.options().skip_dirs)?;
        debug!(root = %root.display(), files = files.len(), "scanning documentation tree");

        let per_file = files
            .par_iter()
            .map(|path| self.scan_file(root, path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(per_file.into_iter().flatten().collect())
    }
}
