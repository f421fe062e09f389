//! The thumbnail strip mirroring a document's image inventory.
//!
//! The strip holds the displayed images (after the linked-image filter),
//! which one is active, and how far the strip is translated horizontally.
//! Activations are resolved against the whole document, since the page
//! renders linked images even when the strip leaves them out.

mod resolver;

pub use resolver::{ContextHash, RenderedImage, Resolution, context_hash, resolve};

use crate::document::{DocumentImageInventory, ImageReference};

/// Horizontal distance between thumbnail origins.
pub const THUMB_PITCH: f64 = 52.0;
/// The active thumbnail sits at `window_width / CENTER_DIVISOR`.
pub const CENTER_DIVISOR: f64 = 2.5;
/// Pointer moves shorter than this do not drag the strip.
pub const DRAG_THRESHOLD: f64 = 4.0;
/// Presses released sooner than this count as clicks.
pub const CLICK_MS: u64 = 150;
/// Strip must keep this much of itself inside the window.
const EDGE_MARGIN: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct StripDrag {
    start_x: f64,
    origin: f64,
    started_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryStrip {
    /// Every image of the document, in document order.
    document: Vec<ImageReference>,
    images: Vec<ImageReference>,
    /// Document index of each displayed image.
    positions: Vec<usize>,
    active: Option<usize>,
    unique: bool,
    translate_x: f64,
    drag: Option<StripDrag>,
}

impl GalleryStrip {
    pub fn build(inventory: &DocumentImageInventory, include_linked: bool) -> Self {
        let (positions, images) = inventory
            .images
            .iter()
            .enumerate()
            .filter(|(_, image)| include_linked || !image.link)
            .map(|(position, image)| (position, image.clone()))
            .unzip();
        Self {
            document: inventory.images.clone(),
            images,
            positions,
            active: None,
            unique: false,
            translate_x: 0.0,
            drag: None,
        }
    }

    pub fn images(&self) -> &[ImageReference] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub const fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_image(&self) -> Option<&ImageReference> {
        self.images.get(self.active?)
    }

    /// Whether the active entry was matched by its neighbours too.
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    pub const fn translate_x(&self) -> f64 {
        self.translate_x
    }

    /// Resolve the activated image against the whole document and center
    /// its thumbnail. The returned index is into the displayed images; an
    /// activated image the strip leaves out resolves to `None`.
    pub fn activate(&mut self, context: &ContextHash, window_width: f64) -> Option<Resolution> {
        let resolution = resolve(&self.document, context).and_then(|found| {
            let index = self
                .positions
                .iter()
                .position(|&position| position == found.index)?;
            Some(Resolution {
                index,
                unique: found.unique,
            })
        });
        match resolution {
            Some(Resolution { index, unique }) => {
                self.active = Some(index);
                self.unique = unique;
                self.center(window_width);
                tracing::debug!(index, unique, "gallery resolved activation");
            }
            None => {
                self.active = None;
                self.unique = false;
                tracing::debug!(hash = %context.target, "activated image not in inventory");
            }
        }
        resolution
    }

    pub fn select(&mut self, index: usize, window_width: f64) -> Option<&ImageReference> {
        if index >= self.images.len() {
            return None;
        }
        self.active = Some(index);
        self.unique = true;
        self.center(window_width);
        self.images.get(index)
    }

    /// Activate the next thumbnail, wrapping to the first.
    pub fn next(&mut self, window_width: f64) -> Option<&ImageReference> {
        let len = self.images.len();
        if len == 0 {
            return None;
        }
        let index = self.active.map_or(0, |active| (active + 1) % len);
        self.select(index, window_width)
    }

    /// Activate the previous thumbnail, wrapping to the last.
    pub fn prev(&mut self, window_width: f64) -> Option<&ImageReference> {
        let len = self.images.len();
        if len == 0 {
            return None;
        }
        let index = self.active.map_or(len - 1, |active| (active + len - 1) % len);
        self.select(index, window_width)
    }

    pub fn center(&mut self, window_width: f64) {
        let index = self.active.unwrap_or(0);
        self.translate_x = window_width / CENTER_DIVISOR - index as f64 * THUMB_PITCH;
    }

    /// Thumbnail under strip-relative pointer `x`.
    pub fn index_at(&self, x: f64) -> Option<usize> {
        let offset = x - self.translate_x;
        if offset < 0.0 {
            return None;
        }
        let index = (offset / THUMB_PITCH).floor() as usize;
        (index < self.images.len()).then_some(index)
    }

    pub fn drag_start(&mut self, x: f64, now_ms: u64) {
        self.drag = Some(StripDrag {
            start_x: x,
            origin: self.translate_x,
            started_ms: now_ms,
        });
    }

    pub fn drag_move(&mut self, x: f64, window_width: f64) {
        let Some(drag) = self.drag else {
            return;
        };
        let delta = x - drag.start_x;
        if delta.abs() < DRAG_THRESHOLD {
            return;
        }
        let translate = drag.origin + delta;
        let last_offset = self.images.len().saturating_sub(1) as f64 * THUMB_PITCH;
        if translate + EDGE_MARGIN < window_width && translate + last_offset >= 0.0 {
            self.translate_x = translate;
        }
    }

    /// Finish a drag. A quick press is a click and returns the thumbnail
    /// under the pointer.
    pub fn drag_end(&mut self, x: f64, now_ms: u64) -> Option<usize> {
        let drag = self.drag.take()?;
        if now_ms.saturating_sub(drag.started_ms) < CLICK_MS {
            self.translate_x = drag.origin;
            return self.index_at(x);
        }
        None
    }

    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
