//! Vault link resolution and inventory assembly.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::SourceDocument;
use super::scanner::{LOCAL_RESOURCE_SCHEME, scan_lines};
use super::types::DocumentImageInventory;

/// Directories never searched when looking a file up by name.
const SKIPPED_DIRS: &[&str] = &[".git", ".obsidian", ".trash", "node_modules"];
const MAX_SEARCH_DEPTH: usize = 16;

/// Turns a vault-relative image path into a displayable URL.
pub trait LinkResolver {
    /// Resolve `link` as written in the document at `source_path`.
    fn resolve(&self, link: &str, source_path: &str) -> Option<String>;
}

/// Resolves links against a vault directory on disk.
///
/// Lookup order: next to the document, then from the vault root, then by
/// file name anywhere in the vault. A name lookup takes the shallowest
/// match and fails when several files tie for it.
#[derive(Debug, Clone)]
pub struct VaultLinkResolver {
    root: PathBuf,
}

impl VaultLinkResolver {
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn find_by_name(&self, name: &str) -> Option<PathBuf> {
        let matches: Vec<(usize, PathBuf)> = WalkDir::new(&self.root)
            .max_depth(MAX_SEARCH_DEPTH)
            .into_iter()
            .filter_entry(|entry| !is_skipped_dir(entry))
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == name)
            .map(|entry| (entry.depth(), entry.into_path()))
            .collect();

        let shallowest = matches.iter().map(|(depth, _)| *depth).min()?;
        let mut closest = matches
            .into_iter()
            .filter(|(depth, _)| *depth == shallowest);
        let (_, path) = closest.next()?;
        if closest.next().is_some() {
            tracing::debug!(name, depth = shallowest, "ambiguous vault link");
            return None;
        }
        Some(path)
    }
}

impl LinkResolver for VaultLinkResolver {
    fn resolve(&self, link: &str, source_path: &str) -> Option<String> {
        let decoded = percent_decode(link);
        let relative = Path::new(decoded.trim_start_matches(['/', '\\']));

        let beside_document = Path::new(source_path)
            .parent()
            .map(|dir| dir.join(relative));
        let found = beside_document
            .filter(|path| path.is_file())
            .or_else(|| Some(self.root.join(relative)).filter(|path| path.is_file()))
            .or_else(|| {
                let name = relative.file_name()?.to_str()?;
                self.find_by_name(name)
            })?;

        let absolute = fs::canonicalize(&found).unwrap_or(found);
        Some(local_url(&absolute))
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|dir_name| SKIPPED_DIRS.contains(&dir_name))
}

/// URL under which the host serves a local file.
pub fn local_url(path: &Path) -> String {
    let path = path.to_string_lossy();
    format!(
        "{LOCAL_RESOURCE_SCHEME}{}",
        path.trim_start_matches('/')
    )
}

/// Local file behind a `app://local/` URL, if it is one.
pub fn local_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix(LOCAL_RESOURCE_SCHEME)?;
    let rest = percent_decode(rest.split(['?', '#']).next().unwrap_or_default());
    if rest.is_empty() {
        return None;
    }
    let bytes = rest.as_bytes();
    let has_drive = bytes.len() > 1 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if has_drive {
        Some(PathBuf::from(rest))
    } else {
        Some(PathBuf::from(format!("/{rest}")))
    }
}

/// Decode `%XX` escapes; malformed escapes are kept as written.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Scan a document and resolve every vault-relative image.
///
/// Unresolvable vault images keep their place with an empty source so the
/// gallery still lines up with the rendered page.
pub fn build_inventory(
    document: &SourceDocument,
    resolver: &dyn LinkResolver,
    captured_at: u64,
) -> DocumentImageInventory {
    let images = scan_lines(&document.lines)
        .into_iter()
        .map(|image| {
            if !image.convert {
                return image;
            }
            match resolver.resolve(&image.src, &document.identity.path) {
                Some(url) => image.with_src(url),
                None => {
                    tracing::debug!(src = %image.src, "unresolved vault image");
                    image.with_src(String::new())
                }
            }
        })
        .collect();
    DocumentImageInventory::new(document.identity.clone(), images, captured_at)
}
