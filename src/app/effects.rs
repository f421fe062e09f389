use crate::app::model::{NoticeLevel, TargetImage};
use crate::app::update::Activation;
use crate::app::{Message, Viewer};
use crate::document::build_inventory;
use crate::error::ClipboardError;
use crate::gallery::{GalleryStrip, context_hash};
use crate::image::copy_image;
use crate::ui::{RenderTarget, TARGET_MARKER, ToolbarAction};

impl<R: RenderTarget> Viewer<R> {
    pub(super) fn handle_message_side_effects(&mut self, msg: &Message) {
        match msg {
            Message::Open(activation) => self.open_gallery(activation),
            Message::Toolbar(ToolbarAction::Copy) => self.copy_shown_image(),
            _ => {}
        }
    }

    /// Build the strip for the current document and point it at the
    /// activated image.
    fn open_gallery(&mut self, activation: &Activation) {
        if !self.model.config.gallery {
            return;
        }
        let Some(document) = self.documents.current_document() else {
            return;
        };
        let links = &*self.links;
        let inventory = self.cache.get_or_build(&document.identity, |now_ms| {
            build_inventory(&document, links, now_ms)
        });

        let mut gallery =
            GalleryStrip::build(&inventory, self.model.config.include_linked_images);
        let context = context_hash(&activation.rendered, &activation.activated());
        match gallery.activate(&context, self.model.window.width) {
            Some(resolution) => tracing::debug!(
                index = resolution.index,
                unique = resolution.unique,
                "activated image resolved"
            ),
            None => tracing::debug!(hash = %context.target, "activated image not in inventory"),
        }
        self.model.gallery = Some(gallery);
    }

    fn copy_shown_image(&mut self) {
        let Some(src) = self
            .model
            .session
            .as_ref()
            .map(|session| session.shown.src.clone())
        else {
            self.model
                .show_notice(NoticeLevel::Warning, ClipboardError::NothingOpen.to_string());
            return;
        };
        match copy_image(&src, self.clipboard.as_mut()) {
            Ok(()) => self.model.show_notice(NoticeLevel::Info, "Image copied"),
            Err(err) => {
                tracing::warn!(%err, "copy failed");
                self.model
                    .show_notice(NoticeLevel::Error, format!("Copy failed: {err}"));
            }
        }
    }

    /// Remove the marker from the previously activated element and give it
    /// back its own border.
    pub(super) fn restore_previous_target(&mut self) {
        let Some(previous) = self.last_target.take() else {
            return;
        };
        let Some(element) = previous.element else {
            return;
        };
        let border = previous.default_border;
        self.target.remove_attribute(element, TARGET_MARKER);
        self.target
            .set_style(element, "border-width", border.width.as_deref().unwrap_or(""));
        self.target
            .set_style(element, "border-style", border.style.as_deref().unwrap_or(""));
        self.target
            .set_style(element, "border-color", border.color.as_deref().unwrap_or(""));
        tracing::debug!(element, "previous target restored");
    }

    /// Outline the element a closed session was opened from.
    pub(super) fn apply_closed_border(&mut self, target: &TargetImage) {
        let (Some(element), Some(border)) = (target.element, &self.model.config.border) else {
            return;
        };
        self.target
            .set_style(element, "border-width", &border.width_css());
        self.target
            .set_style(element, "border-style", &border.style_css());
        self.target.set_style(element, "border-color", &border.color);
    }
}
