//! Markdown source documents and the images they reference.
//!
//! This module handles:
//! - Reading a document's identity and raw lines ([`DocumentSource`])
//! - Scanning raw lines for embedded images ([`scan_lines`])
//! - Resolving vault paths and assembling an inventory ([`build_inventory`])

mod inventory;
mod scanner;
mod types;

pub use inventory::{
    LinkResolver, VaultLinkResolver, build_inventory, local_path, local_url, percent_decode,
};
pub use scanner::{LOCAL_RESOURCE_SCHEME, scan_lines, scan_source};
pub use types::{ContentHash, DocumentIdentity, DocumentImageInventory, ImageReference};

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

/// Image file extensions recognised as embeddable images.
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff", "tif", "ico", "svg", "avif",
];

/// Returns true if the path ends in a recognised image extension.
///
/// Query strings and fragments are ignored, and the check is
/// case-insensitive.
pub fn is_image_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// A document's identity together with its raw source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub identity: DocumentIdentity,
    pub lines: Vec<String>,
}

impl SourceDocument {
    pub fn new(identity: DocumentIdentity, source: &str) -> Self {
        Self {
            identity,
            lines: split_lines(source),
        }
    }
}

/// Host accessor for the document currently being viewed.
pub trait DocumentSource {
    /// The active document, or `None` when no markdown document is active.
    fn current_document(&self) -> Option<SourceDocument>;
}

/// Reads the active document from disk.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    path: PathBuf,
}

impl FsDocumentSource {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document and its timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its metadata cannot be read.
    pub fn load(&self) -> Result<SourceDocument> {
        let source = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let metadata = std::fs::metadata(&self.path)
            .with_context(|| format!("Failed to stat {}", self.path.display()))?;
        let modified_at = metadata.modified().map(millis_since_epoch).unwrap_or(0);
        // Not every filesystem records a birth time; fall back to mtime so
        // the document can still be cached.
        let created_at = metadata
            .created()
            .map(millis_since_epoch)
            .unwrap_or(modified_at);
        let identity = DocumentIdentity::new(
            self.path.to_string_lossy().into_owned(),
            created_at,
            modified_at,
        );
        Ok(SourceDocument::new(identity, &source))
    }
}

impl DocumentSource for FsDocumentSource {
    fn current_document(&self) -> Option<SourceDocument> {
        match self.load() {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!("document unavailable: {err:#}");
                None
            }
        }
    }
}

fn split_lines(source: &str) -> Vec<String> {
    source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

fn millis_since_epoch(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_is_image_path_matches_known_extensions() {
        assert!(is_image_path("photo.png"));
        assert!(is_image_path("assets/Photo.JPEG"));
        assert!(is_image_path("diagram.svg?v=2"));
        assert!(!is_image_path("notes.md"));
        assert!(!is_image_path("png"));
    }

    #[test]
    fn test_split_lines_strips_carriage_returns() {
        let doc = SourceDocument::new(DocumentIdentity::new("a.md", 1, 1), "one\r\ntwo\n");
        assert_eq!(doc.lines, vec!["one", "two", ""]);
    }

    #[test]
    fn test_fs_document_source_reads_lines_and_times() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "# Title\n![a](a.png)").unwrap();

        let document = FsDocumentSource::new(path.clone()).load().unwrap();
        assert_eq!(document.lines.len(), 2);
        assert_eq!(document.identity.path, path.to_string_lossy());
        assert!(document.identity.modified_at > 0);
        assert!(document.identity.created_at > 0);
    }

    #[test]
    fn test_fs_document_source_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let source = FsDocumentSource::new(dir.path().join("missing.md"));
        assert!(source.current_document().is_none());
    }
}
