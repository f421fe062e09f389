//! Core document types.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Content fingerprint used for image identity and cache keys.
///
/// Lowercase hex SHA-256 of the joined parts. Two equal inputs always give
/// the same hash; distinct images are expected, not guaranteed, to differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Fingerprint an image by its visible `(alt, src)` pair.
    ///
    /// A missing alt hashes the same as an empty one, matching what a
    /// rendered element reports for an image without alt text.
    pub fn of_image(alt: Option<&str>, src: &str) -> Self {
        Self::of_parts(alt.unwrap_or_default(), src)
    }

    /// Fingerprint a document by its path and creation time.
    pub fn of_document(path: &str, created_at: u64) -> Self {
        Self::of_parts(path, &created_at.to_string())
    }

    fn of_parts(first: &str, second: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(first.as_bytes());
        hasher.update(b"_");
        hasher.update(second.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

/// One embedded image, in document order.
///
/// Produced fully formed by the scanner; never mutated afterwards. Source
/// resolution produces a new reference via [`ImageReference::with_src`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReference {
    /// Alt text with any trailing width segment removed
    pub alt: Option<String>,
    /// Image source (raw vault path until resolved)
    pub src: String,
    /// Wrapped in an outer hyperlink
    pub link: bool,
    /// File name component of a vault path
    pub name: Option<String>,
    /// Fingerprint of `(alt, src)`
    pub hash: ContentHash,
    /// `src` is a vault-relative path that still needs resolving
    pub convert: bool,
    /// Display width from a trailing `|200` segment
    pub width: Option<u32>,
}

impl ImageReference {
    pub fn new(
        alt: Option<String>,
        src: String,
        link: bool,
        name: Option<String>,
        convert: bool,
        width: Option<u32>,
    ) -> Self {
        let alt = alt.filter(|alt| !alt.is_empty());
        let hash = ContentHash::of_image(alt.as_deref(), &src);
        Self {
            alt,
            src,
            link,
            name,
            hash,
            convert,
            width,
        }
    }

    /// Copy of this reference pointing at `src`, with the hash recomputed.
    pub fn with_src(&self, src: String) -> Self {
        Self::new(
            self.alt.clone(),
            src,
            self.link,
            self.name.clone(),
            self.convert,
            self.width,
        )
    }

    /// Alt text as a rendered element would report it.
    pub fn alt_text(&self) -> &str {
        self.alt.as_deref().unwrap_or_default()
    }
}

/// Identity of a document for caching.
///
/// Timestamps are milliseconds since the epoch; `0` means the host could
/// not report one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentIdentity {
    pub path: String,
    pub created_at: u64,
    pub modified_at: u64,
}

impl DocumentIdentity {
    pub fn new(path: impl Into<String>, created_at: u64, modified_at: u64) -> Self {
        Self {
            path: path.into(),
            created_at,
            modified_at,
        }
    }

    /// Cache key, or `None` when the path or creation time is missing.
    pub fn cache_key(&self) -> Option<ContentHash> {
        if self.path.is_empty() || self.created_at == 0 {
            return None;
        }
        Some(ContentHash::of_document(&self.path, self.created_at))
    }
}

/// Snapshot of every image a document references.
///
/// Replaced wholesale when the document changes; never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentImageInventory {
    pub identity: DocumentIdentity,
    pub images: Vec<ImageReference>,
    /// Milliseconds since the epoch at scan time
    pub captured_at: u64,
}

impl DocumentImageInventory {
    pub const fn new(
        identity: DocumentIdentity,
        images: Vec<ImageReference>,
        captured_at: u64,
    ) -> Self {
        Self {
            identity,
            images,
            captured_at,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
