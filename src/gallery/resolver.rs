//! Working out which inventory entry the user activated.
//!
//! Identical images hash identically, so the activated image is matched by
//! its own hash plus the hashes of its rendered neighbours.

use serde::Serialize;

use crate::document::{ContentHash, ImageReference};

/// An image element as rendered on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub alt: String,
    pub src: String,
    /// Carries the activation marker
    pub is_target: bool,
}

impl RenderedImage {
    pub fn new(alt: impl Into<String>, src: impl Into<String>, is_target: bool) -> Self {
        Self {
            alt: alt.into(),
            src: src.into(),
            is_target,
        }
    }

    /// How an inventory entry renders.
    pub fn from_reference(image: &ImageReference, is_target: bool) -> Self {
        Self::new(image.alt_text(), image.src.clone(), is_target)
    }

    pub fn hash(&self) -> ContentHash {
        ContentHash::of_image(Some(&self.alt), &self.src)
    }
}

/// Fingerprint of an activated image and its immediate neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextHash {
    pub prev: Option<ContentHash>,
    pub target: ContentHash,
    pub next: Option<ContentHash>,
}

/// Outcome of matching a [`ContextHash`] against an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub index: usize,
    /// The neighbours matched as well
    pub unique: bool,
}

/// Build the context triple for an activation.
///
/// When exactly one rendered element carries the activation marker its
/// neighbours give the context. Otherwise only `activated` itself is known.
pub fn context_hash(rendered: &[RenderedImage], activated: &RenderedImage) -> ContextHash {
    let mut flagged = rendered
        .iter()
        .enumerate()
        .filter(|(_, image)| image.is_target)
        .map(|(index, _)| index);

    match (flagged.next(), flagged.next()) {
        (Some(index), None) => ContextHash {
            prev: index
                .checked_sub(1)
                .and_then(|prev| rendered.get(prev))
                .map(RenderedImage::hash),
            target: rendered[index].hash(),
            next: rendered.get(index + 1).map(RenderedImage::hash),
        },
        _ => ContextHash {
            prev: None,
            target: activated.hash(),
            next: None,
        },
    }
}

/// Match a context triple against a document's images in document order.
///
/// The first hash match is the provisional answer. Later hash matches are
/// only taken when their neighbours match the context exactly; with several
/// such candidates the earliest wins.
pub fn resolve(images: &[ImageReference], context: &ContextHash) -> Option<Resolution> {
    let mut provisional = None;

    for (index, image) in images.iter().enumerate() {
        if image.hash != context.target {
            continue;
        }
        provisional.get_or_insert(index);

        let prev = index
            .checked_sub(1)
            .and_then(|prev| images.get(prev))
            .map(|image| &image.hash);
        let next = images.get(index + 1).map(|image| &image.hash);
        if prev == context.prev.as_ref() && next == context.next.as_ref() {
            return Some(Resolution {
                index,
                unique: true,
            });
        }
    }

    provisional.map(|index| Resolution {
        index,
        unique: false,
    })
}
