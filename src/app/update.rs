use crate::app::Model;
use crate::app::model::{Notice, NoticeLevel, ShownImage, TargetImage, ViewerSession};
use crate::document::ImageReference;
use crate::gallery::{GalleryStrip, RenderedImage};
use crate::image::Size;
use crate::ui::ToolbarAction;
use crate::ui::geometry::{Point, WindowSize, ZOOM_STEP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The user activated an image on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub target: TargetImage,
    /// Every rendered image of the document, in page order
    pub rendered: Vec<RenderedImage>,
}

impl Activation {
    pub fn activated(&self) -> RenderedImage {
        RenderedImage::new(self.target.alt.clone(), self.target.src.clone(), true)
    }
}

/// All possible events and actions in the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Session
    /// Open a session for an activated image
    Open(Activation),
    /// Close the session
    Close,
    /// Leave full screen, or close
    Escape,
    /// Advance the clock
    Tick(u64),
    Resize(WindowSize),
    /// A size probe reported
    ImageSized { generation: u64, size: Size },
    /// A size probe failed
    ProbeFailed { generation: u64, reason: String },

    // Pointer on the image
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    PointerLeave,
    /// Wheel notch at a window position
    Wheel { zoom_in: bool, at: Point },

    // Keyboard
    /// Arrow key pressed with the move hotkey held
    ArrowPressed(Direction),
    ArrowReleased(Direction),
    SwitchNext,
    SwitchPrev,

    Toolbar(ToolbarAction),

    // Gallery strip
    GallerySelect(usize),
    GalleryPress(f64),
    GalleryDrag(f64),
    GalleryRelease(f64),

    Notify(Notice),
}

/// Pure state transition.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::Open(activation) => {
            let generation = model.take_generation();
            model.session = Some(ViewerSession::new(activation.target, generation));
            model.gallery = None;
            model.tip = None;
        }
        Message::Close => close(&mut model),
        Message::Escape => {
            if let Some(session) = model.session.as_mut()
                && session.geometry.full_screen
            {
                session.geometry.full_screen = false;
            } else {
                close(&mut model);
            }
        }
        Message::Tick(now_ms) => {
            model.now_ms = now_ms;
            model.expire_tip();
        }
        Message::Resize(window) => {
            model.window = window;
            if let Some(gallery) = model.gallery.as_mut() {
                gallery.center(window.width);
            }
        }
        Message::ImageSized { generation, size } => {
            let window = model.window;
            let fitted = match model.session.as_mut() {
                Some(session) if session.probe_generation == generation => {
                    session.natural = Some(size);
                    session.geometry.fit_to_window(size, window);
                    true
                }
                _ => false,
            };
            if fitted {
                model.show_zoom_tip();
            }
        }
        Message::ProbeFailed { generation, reason } => {
            if model
                .session
                .as_ref()
                .is_some_and(|session| session.probe_generation == generation)
            {
                model.show_notice(
                    NoticeLevel::Warning,
                    format!("Image failed to load: {reason}"),
                );
            }
        }

        Message::PointerDown(point) => {
            if let Some(session) = model.session.as_mut() {
                session.status.dragging = true;
                session.drag_offset = Some(Point::new(
                    session.geometry.left - point.x,
                    session.geometry.top - point.y,
                ));
            }
        }
        Message::PointerMove(point) => {
            if let Some(session) = model.session.as_mut()
                && session.status.dragging
                && let Some(offset) = session.drag_offset
            {
                session
                    .geometry
                    .move_to(point.x + offset.x, point.y + offset.y);
            }
        }
        Message::PointerUp | Message::PointerLeave => {
            if let Some(session) = model.session.as_mut() {
                session.status.dragging = false;
                session.drag_offset = None;
            }
        }
        Message::Wheel { zoom_in, at } => {
            if let Some(session) = model.session.as_mut() {
                let geometry = &mut session.geometry;
                let anchor = Point::new(at.x - geometry.left, at.y - geometry.top);
                let delta = if zoom_in { ZOOM_STEP } else { -ZOOM_STEP };
                geometry.zoom(delta, anchor, false);
                model.show_zoom_tip();
            }
        }

        Message::ArrowPressed(direction) => {
            let speed = f64::from(model.config.move_speed);
            if let Some(session) = model.session.as_mut() {
                let status = &mut session.status;
                let horizontal = if status.arrow_left {
                    -speed
                } else if status.arrow_right {
                    speed
                } else {
                    0.0
                };
                let vertical = if status.arrow_up {
                    -speed
                } else if status.arrow_down {
                    speed
                } else {
                    0.0
                };
                let (dx, dy) = match direction {
                    Direction::Up => (horizontal, -speed),
                    Direction::Down => (horizontal, speed),
                    Direction::Left => (-speed, vertical),
                    Direction::Right => (speed, vertical),
                };
                *arrow_bit(status, direction) = true;
                session.geometry.move_by(dx, dy);
            }
        }
        Message::ArrowReleased(direction) => {
            if let Some(session) = model.session.as_mut() {
                *arrow_bit(&mut session.status, direction) = false;
            }
        }
        Message::SwitchNext => {
            return show_gallery_image(model, |gallery, width| gallery.next(width).map(shown));
        }
        Message::SwitchPrev => {
            return show_gallery_image(model, |gallery, width| gallery.prev(width).map(shown));
        }

        Message::Toolbar(action) => apply_toolbar(&mut model, action),

        Message::GallerySelect(index) => {
            return show_gallery_image(model, |gallery, width| {
                gallery.select(index, width).map(shown)
            });
        }
        Message::GalleryPress(x) => {
            let now_ms = model.now_ms;
            if let Some(gallery) = model.gallery.as_mut() {
                gallery.drag_start(x, now_ms);
            }
        }
        Message::GalleryDrag(x) => {
            let width = model.window.width;
            if let Some(gallery) = model.gallery.as_mut() {
                gallery.drag_move(x, width);
            }
        }
        Message::GalleryRelease(x) => {
            let now_ms = model.now_ms;
            let clicked = model
                .gallery
                .as_mut()
                .and_then(|gallery| gallery.drag_end(x, now_ms));
            if let Some(index) = clicked {
                return show_gallery_image(model, |gallery, width| {
                    gallery.select(index, width).map(shown)
                });
            }
        }

        Message::Notify(notice) => model.notices.push(notice),
    }
    model
}

fn close(model: &mut Model) {
    model.session = None;
    model.gallery = None;
    model.tip = None;
}

const fn arrow_bit(status: &mut crate::app::model::Status, direction: Direction) -> &mut bool {
    match direction {
        Direction::Up => &mut status.arrow_up,
        Direction::Down => &mut status.arrow_down,
        Direction::Left => &mut status.arrow_left,
        Direction::Right => &mut status.arrow_right,
    }
}

fn shown(image: &ImageReference) -> ShownImage {
    ShownImage {
        alt: image.alt_text().to_string(),
        src: image.src.clone(),
    }
}

/// Move the gallery and point the session at the chosen image.
fn show_gallery_image(
    mut model: Model,
    choose: impl FnOnce(&mut GalleryStrip, f64) -> Option<ShownImage>,
) -> Model {
    if model.session.is_none() {
        return model;
    }
    let width = model.window.width;
    let Some(next) = model
        .gallery
        .as_mut()
        .and_then(|gallery| choose(gallery, width))
    else {
        return model;
    };
    let generation = model.take_generation();
    if let Some(session) = model.session.as_mut() {
        session.retarget(next, generation);
    }
    model.tip = None;
    model
}

fn apply_toolbar(model: &mut Model, action: ToolbarAction) {
    let Some(session) = model.session.as_mut() else {
        return;
    };
    let geometry = &mut session.geometry;
    match action {
        ToolbarAction::ZoomToActual => {
            let anchor = geometry.center_anchor();
            geometry.zoom(0.0, anchor, true);
            model.show_zoom_tip();
        }
        ToolbarAction::ZoomIn | ToolbarAction::ZoomOut => {
            let anchor = geometry.center_anchor();
            let delta = if action == ToolbarAction::ZoomIn {
                ZOOM_STEP
            } else {
                -ZOOM_STEP
            };
            geometry.zoom(delta, anchor, false);
            model.show_zoom_tip();
        }
        ToolbarAction::FullScreen => geometry.full_screen = !geometry.full_screen,
        ToolbarAction::Refresh => {
            let shown = session.shown.clone();
            let generation = model.take_generation();
            if let Some(session) = model.session.as_mut() {
                session.retarget(shown, generation);
            }
            model.tip = None;
        }
        ToolbarAction::RotateLeft => geometry.rotate_by(-90),
        ToolbarAction::RotateRight => geometry.rotate_by(90),
        ToolbarAction::ScaleX => geometry.flip_x(),
        ToolbarAction::ScaleY => geometry.flip_y(),
        ToolbarAction::InvertColor => geometry.invert_color = !geometry.invert_color,
        ToolbarAction::Copy => {}
    }
}
