//! Viewer state and event handling.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete viewer state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`Viewer`]: Owns the collaborators, runs side effects and redraws

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{
    BorderStyles, Model, Notice, NoticeLevel, ShownImage, Status, TIP_DURATION_MS, TargetImage,
    Tip, ViewerSession,
};
pub use update::{Activation, Direction, Message, update};

use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::ViewerConfig;
use crate::document::{DocumentSource, LinkResolver};
use crate::gallery::RenderedImage;
use crate::image::{
    ClipboardSink, Clock, FsSizeProbe, InventoryCache, NoClipboard, PendingProbe, SizeProbe,
    SystemClock,
};
use crate::ui::geometry::{Point, WindowSize};
use crate::ui::{ElementId, OverlayView, RenderTarget, TARGET_MARKER};

use event_loop::ResizeDebouncer;

const RESIZE_DEBOUNCE_MS: u64 = 50;

/// Pixel size of one terminal cell, used to place mouse events.
pub const DEFAULT_CELL_SIZE: Point = Point::new(8.0, 16.0);

/// Drives one page's lightbox: activations come in, the overlay is drawn
/// into the render target.
pub struct Viewer<R: RenderTarget> {
    model: Model,
    target: R,
    overlay: OverlayView,
    documents: Box<dyn DocumentSource>,
    links: Box<dyn LinkResolver>,
    probe: Box<dyn SizeProbe>,
    clipboard: Box<dyn ClipboardSink>,
    clock: Rc<dyn Clock>,
    cache: InventoryCache<Rc<dyn Clock>>,
    pending: PendingProbe,
    probe_generation: Option<u64>,
    resize: ResizeDebouncer,
    cell_size: Point,
    queue: VecDeque<Message>,
    last_target: Option<TargetImage>,
}

impl<R: RenderTarget> Viewer<R> {
    /// Mount the overlay into `target` and start closed.
    pub fn new(
        mut target: R,
        config: ViewerConfig,
        window: WindowSize,
        documents: Box<dyn DocumentSource>,
        links: Box<dyn LinkResolver>,
    ) -> Self {
        let overlay = OverlayView::mount(&mut target, None);
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let cache = InventoryCache::with_clock(config.cache_capacity, Rc::clone(&clock));
        Self {
            model: Model::new(config, window),
            target,
            overlay,
            documents,
            links,
            probe: Box::new(FsSizeProbe),
            clipboard: Box::new(NoClipboard),
            clock,
            cache,
            pending: PendingProbe::default(),
            probe_generation: None,
            resize: ResizeDebouncer::new(RESIZE_DEBOUNCE_MS),
            cell_size: DEFAULT_CELL_SIZE,
            queue: VecDeque::new(),
            last_target: None,
        }
    }

    /// Use `clock` for timers and cache recency. Empties the cache.
    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.cache = InventoryCache::with_clock(self.model.config.cache_capacity, Rc::clone(&clock));
        self.model.now_ms = clock.now_ms();
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn SizeProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    #[must_use]
    pub const fn with_cell_size(mut self, cell_size: Point) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Open the viewer for `element`, one of the rendered images in `page`.
    ///
    /// `page` lists the document's rendered image elements in page order;
    /// their `alt`/`src` attributes identify the activated image among
    /// duplicates.
    pub fn activate(&mut self, element: ElementId, page: &[ElementId]) {
        self.restore_previous_target();
        self.target.set_attribute(element, TARGET_MARKER, "1");

        let rendered = page
            .iter()
            .map(|&id| {
                RenderedImage::new(
                    self.target.attribute(id, "alt").unwrap_or_default(),
                    self.target.attribute(id, "src").unwrap_or_default(),
                    self.target.attribute(id, TARGET_MARKER).is_some(),
                )
            })
            .collect();
        let target = TargetImage {
            element: Some(element),
            alt: self.target.attribute(element, "alt").unwrap_or_default(),
            src: self.target.attribute(element, "src").unwrap_or_default(),
            default_border: BorderStyles {
                width: self.target.style(element, "border-width"),
                style: self.target.style(element, "border-style"),
                color: self.target.style(element, "border-color"),
            },
        };
        self.last_target = Some(target.clone());
        self.queue.push_back(Message::Tick(self.clock.now_ms()));
        self.send(Message::Open(Activation { target, rendered }));
    }

    pub const fn model(&self) -> &Model {
        &self.model
    }

    pub const fn target(&self) -> &R {
        &self.target
    }

    /// Mutable access for building page content around the overlay.
    pub const fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    pub const fn overlay(&self) -> &OverlayView {
        &self.overlay
    }

    pub const fn cache(&self) -> &InventoryCache<Rc<dyn Clock>> {
        &self.cache
    }

    fn cells_to_window(&self, columns: u16, rows: u16) -> WindowSize {
        WindowSize::new(
            f64::from(columns) * self.cell_size.x,
            f64::from(rows) * self.cell_size.y,
        )
    }
}

#[cfg(test)]
mod tests;
