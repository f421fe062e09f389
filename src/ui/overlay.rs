//! The viewer overlay as an element tree.
//!
//! [`OverlayView`] mounts the overlay once and then mirrors the [`Model`]
//! into it after every message. It also answers hit tests for pointer
//! input using the same layout it draws with.

use crate::app::Model;
use crate::document::ContentHash;
use crate::gallery::{GalleryStrip, THUMB_PITCH};
use crate::image::Size;

use super::geometry::{FOOTER_HEIGHT, Point, full_screen_layout};
use super::target::{ElementId, RenderTarget};

/// Marks the page element the viewer was opened from.
pub const TARGET_MARKER: &str = "data-lightbox-target";

pub const TOOLBAR_BUTTON_WIDTH: f64 = 32.0;
const TOOLBAR_INSET: f64 = 8.0;
/// Events the overlay listens for while a session is open.
pub const OVERLAY_EVENTS: [&str; 5] = ["keydown", "keyup", "click", "mousedown", "wheel"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
    ZoomToActual,
    ZoomIn,
    ZoomOut,
    FullScreen,
    Refresh,
    RotateLeft,
    RotateRight,
    ScaleX,
    ScaleY,
    InvertColor,
    Copy,
}

impl ToolbarAction {
    /// Toolbar order, left to right.
    pub const ALL: [Self; 11] = [
        Self::ZoomToActual,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::FullScreen,
        Self::Refresh,
        Self::RotateLeft,
        Self::RotateRight,
        Self::ScaleX,
        Self::ScaleY,
        Self::InvertColor,
        Self::Copy,
    ];

    pub const fn class_name(self) -> &'static str {
        match self {
            Self::ZoomToActual => "toolbar_zoom_to_actual",
            Self::ZoomIn => "toolbar_zoom_in",
            Self::ZoomOut => "toolbar_zoom_out",
            Self::FullScreen => "toolbar_full_screen",
            Self::Refresh => "toolbar_refresh",
            Self::RotateLeft => "toolbar_rotate_left",
            Self::RotateRight => "toolbar_rotate_right",
            Self::ScaleX => "toolbar_scale_x",
            Self::ScaleY => "toolbar_scale_y",
            Self::InvertColor => "toolbar_invert_color",
            Self::Copy => "toolbar_copy",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::ZoomToActual => "Zoom to 100%",
            Self::ZoomIn => "Zoom in",
            Self::ZoomOut => "Zoom out",
            Self::FullScreen => "Full screen",
            Self::Refresh => "Refresh",
            Self::RotateLeft => "Rotate left",
            Self::RotateRight => "Rotate right",
            Self::ScaleX => "Flip horizontally",
            Self::ScaleY => "Flip vertically",
            Self::InvertColor => "Invert colors",
            Self::Copy => "Copy",
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| class.split_whitespace().any(|c| c == action.class_name()))
    }
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Image,
    Toolbar(ToolbarAction),
    Gallery,
    Player,
    Backdrop,
}

/// Left edge of the toolbar.
fn toolbar_left(window_width: f64) -> f64 {
    (window_width - ToolbarAction::ALL.len() as f64 * TOOLBAR_BUTTON_WIDTH) / 2.0
}

/// Classify a press at `point` against the open session's layout.
pub fn hit_test(model: &Model, point: Point) -> Hit {
    let Some(session) = &model.session else {
        return Hit::Backdrop;
    };
    if session.geometry.full_screen {
        return Hit::Player;
    }

    let geometry = &session.geometry;
    if point.x >= geometry.left
        && point.x < geometry.left + geometry.cur_width
        && point.y >= geometry.top
        && point.y < geometry.top + geometry.cur_height
    {
        return Hit::Image;
    }

    let window = model.window;
    if model.gallery.is_some() && model.config.gallery && point.y >= window.height - THUMB_PITCH {
        return Hit::Gallery;
    }

    let toolbar_top = window.height - FOOTER_HEIGHT + TOOLBAR_INSET;
    if point.y >= toolbar_top && point.y < toolbar_top + TOOLBAR_BUTTON_WIDTH {
        let offset = point.x - toolbar_left(window.width);
        if offset >= 0.0 {
            let index = (offset / TOOLBAR_BUTTON_WIDTH).floor() as usize;
            if let Some(action) = ToolbarAction::ALL.get(index) {
                return Hit::Toolbar(*action);
            }
        }
    }
    Hit::Backdrop
}

/// Element handles of the mounted overlay.
#[derive(Debug, Clone)]
pub struct OverlayView {
    container: ElementId,
    image: ElementId,
    tip: ElementId,
    title: ElementId,
    buttons: Vec<(ToolbarAction, ElementId)>,
    gallery: ElementId,
    gallery_list: ElementId,
    thumbnails: Vec<ElementId>,
    shown_gallery: Vec<ContentHash>,
    player: ElementId,
    player_image: ElementId,
    listening: bool,
}

impl OverlayView {
    /// Build the overlay's element tree under `parent`, hidden.
    pub fn mount(target: &mut dyn RenderTarget, parent: Option<ElementId>) -> Self {
        let container = target.create_element("div", parent);
        target.set_attribute(container, "class", "lightbox-container");
        target.set_style(container, "display", "none");

        let image = target.create_element("img", Some(container));
        target.set_attribute(image, "class", "lightbox-view");

        let tip = target.create_element("div", Some(container));
        target.set_attribute(tip, "class", "lightbox-tip");
        target.set_style(tip, "display", "none");

        let footer = target.create_element("div", Some(container));
        target.set_attribute(footer, "class", "lightbox-footer");
        let title = target.create_element("div", Some(footer));
        target.set_attribute(title, "class", "lightbox-title");

        let toolbar = target.create_element("div", Some(footer));
        target.set_attribute(toolbar, "class", "lightbox-toolbar");
        let buttons = ToolbarAction::ALL
            .into_iter()
            .map(|action| {
                let button = target.create_element("div", Some(toolbar));
                target.set_attribute(button, "class", action.class_name());
                target.set_attribute(button, "title", action.title());
                (action, button)
            })
            .collect();

        let gallery = target.create_element("div", Some(container));
        target.set_attribute(gallery, "class", "lightbox-gallery");
        let gallery_list = target.create_element("ul", Some(gallery));
        target.set_attribute(gallery_list, "class", "lightbox-gallery-list");

        let player = target.create_element("div", parent);
        target.set_attribute(player, "class", "lightbox-player");
        target.set_style(player, "display", "none");
        let player_image = target.create_element("img", Some(player));

        Self {
            container,
            image,
            tip,
            title,
            buttons,
            gallery,
            gallery_list,
            thumbnails: Vec::new(),
            shown_gallery: Vec::new(),
            player,
            player_image,
            listening: false,
        }
    }

    pub const fn container(&self) -> ElementId {
        self.container
    }

    pub const fn image(&self) -> ElementId {
        self.image
    }

    pub const fn tip(&self) -> ElementId {
        self.tip
    }

    pub const fn player(&self) -> ElementId {
        self.player
    }

    pub fn thumbnails(&self) -> &[ElementId] {
        &self.thumbnails
    }

    pub fn button(&self, action: ToolbarAction) -> Option<ElementId> {
        self.buttons
            .iter()
            .find(|(candidate, _)| *candidate == action)
            .map(|(_, element)| *element)
    }

    /// Map a clicked toolbar element back to its action via its class.
    pub fn toolbar_action_of(
        &self,
        target: &dyn RenderTarget,
        element: ElementId,
    ) -> Option<ToolbarAction> {
        self.buttons
            .iter()
            .any(|(_, button)| *button == element)
            .then(|| target.attribute(element, "class"))
            .flatten()
            .and_then(|class| ToolbarAction::from_class(&class))
    }

    /// Gallery index of a clicked thumbnail element.
    pub fn thumbnail_index(&self, element: ElementId) -> Option<usize> {
        self.thumbnails.iter().position(|thumb| *thumb == element)
    }

    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    /// Mirror `model` into the element tree.
    pub fn render(&mut self, target: &mut dyn RenderTarget, model: &Model) {
        let Some(session) = &model.session else {
            target.set_style(self.container, "display", "none");
            target.set_style(self.player, "display", "none");
            self.set_listening(target, false);
            self.clear_gallery(target);
            return;
        };
        self.set_listening(target, true);
        target.set_style(self.container, "display", "block");

        let geometry = &session.geometry;
        target.set_attribute(self.image, "src", &session.shown.src);
        target.set_attribute(self.image, "alt", &session.shown.alt);
        target.set_style(self.image, "width", &format!("{}px", geometry.cur_width));
        target.set_style(self.image, "height", &format!("{}px", geometry.cur_height));
        target.set_style(self.image, "margin-left", &format!("{}px", geometry.left));
        target.set_style(self.image, "margin-top", &format!("{}px", geometry.top));
        target.set_style(self.image, "transform", &geometry.transform_css());
        target.set_style(self.image, "filter", geometry.filter_css());
        target.set_text(self.title, &session.shown.alt);

        match &model.tip {
            Some(tip) => {
                target.set_text(self.tip, &tip.text);
                target.set_style(self.tip, "display", "block");
            }
            None => target.set_style(self.tip, "display", "none"),
        }

        if geometry.full_screen {
            let natural = session.natural.unwrap_or(Size::new(0, 0));
            let layout = full_screen_layout(model.config.full_screen_mode, natural, model.window);
            target.set_style(self.player, "display", "block");
            target.set_attribute(self.player_image, "src", &session.shown.src);
            target.set_style(self.player_image, "width", &layout.width.css());
            target.set_style(self.player_image, "height", &layout.height.css());
            target.set_style(self.player_image, "margin-top", &format!("{}px", layout.top));
        } else {
            target.set_style(self.player, "display", "none");
        }

        match (&model.gallery, model.config.gallery) {
            (Some(gallery), true) => {
                target.set_style(self.gallery, "display", "block");
                self.render_gallery(target, gallery);
            }
            _ => {
                target.set_style(self.gallery, "display", "none");
                self.clear_gallery(target);
            }
        }
    }

    fn render_gallery(&mut self, target: &mut dyn RenderTarget, gallery: &GalleryStrip) {
        let hashes: Vec<ContentHash> = gallery.images().iter().map(|i| i.hash.clone()).collect();
        if hashes != self.shown_gallery {
            self.clear_gallery(target);
            for image in gallery.images() {
                let item = target.create_element("li", Some(self.gallery_list));
                let thumb = target.create_element("img", Some(item));
                target.set_attribute(thumb, "src", &image.src);
                target.set_attribute(thumb, "alt", image.alt_text());
                self.thumbnails.push(item);
            }
            self.shown_gallery = hashes;
        }

        for (index, item) in self.thumbnails.iter().enumerate() {
            let class = if Some(index) == gallery.active() {
                "lightbox-thumb active"
            } else {
                "lightbox-thumb"
            };
            target.set_attribute(*item, "class", class);
        }
        target.set_style(
            self.gallery_list,
            "transform",
            &format!("translateX({}px)", gallery.translate_x()),
        );
    }

    fn clear_gallery(&mut self, target: &mut dyn RenderTarget) {
        if self.thumbnails.is_empty() && self.shown_gallery.is_empty() {
            return;
        }
        target.remove_children(self.gallery_list);
        self.thumbnails.clear();
        self.shown_gallery.clear();
    }

    fn set_listening(&mut self, target: &mut dyn RenderTarget, enabled: bool) {
        if self.listening == enabled {
            return;
        }
        for event in OVERLAY_EVENTS {
            if enabled {
                target.add_listener(self.container, event);
            } else {
                target.remove_listener(self.container, event);
            }
        }
        self.listening = enabled;
    }
}
