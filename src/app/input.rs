use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use crate::app::update::Direction;
use crate::app::{Message, Model, Viewer};
use crate::image::Clock;
use crate::ui::geometry::Point;
use crate::ui::{ElementId, Hit, RenderTarget, ToolbarAction, hit_test};

const fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

impl<R: RenderTarget> Viewer<R> {
    /// Translate a terminal event into viewer messages.
    pub(super) fn map_event(&mut self, event: &Event, now_ms: u64) -> Vec<Message> {
        match event {
            Event::Key(key) => handle_key(*key, &self.model),
            Event::Mouse(mouse) => handle_mouse(*mouse, &self.model, self.cell_size),
            Event::Resize(columns, rows) => {
                let window = self.cells_to_window(*columns, *rows);
                tracing::debug!(width = window.width, height = window.height, "resize queued");
                self.resize.queue(window, now_ms);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Dispatch a click on one of the overlay's elements.
    ///
    /// Toolbar buttons are recognised by their class, thumbnails by their
    /// position in the strip, and the container itself is the backdrop.
    pub fn click(&mut self, element: ElementId) {
        if !self.model.is_open() {
            return;
        }
        let msg = if let Some(action) = self.overlay.toolbar_action_of(&self.target, element) {
            Message::Toolbar(action)
        } else if let Some(index) = self.overlay.thumbnail_index(element) {
            Message::GallerySelect(index)
        } else if element == self.overlay.container() {
            Message::Close
        } else {
            return;
        };
        self.queue.push_back(Message::Tick(self.clock.now_ms()));
        self.send(msg);
    }
}

pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Vec<Message> {
    if !model.is_open() {
        return Vec::new();
    }
    let config = &model.config;

    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
            KeyCode::Esc if key.kind == KeyEventKind::Press => vec![Message::Escape],
            code => match arrow(code) {
                Some(direction) if config.move_hotkey.matches(key.modifiers) => {
                    vec![Message::ArrowPressed(direction)]
                }
                _ => Vec::new(),
            },
        },
        KeyEventKind::Release => {
            let Some(direction) = arrow(key.code) else {
                return Vec::new();
            };
            let mut messages = vec![Message::ArrowReleased(direction)];
            if config.gallery && config.switch_hotkey.matches(key.modifiers) {
                match direction {
                    Direction::Left => messages.push(Message::SwitchPrev),
                    Direction::Right => messages.push(Message::SwitchNext),
                    Direction::Up | Direction::Down => {}
                }
            }
            messages
        }
    }
}

pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model, cell_size: Point) -> Vec<Message> {
    let Some(session) = &model.session else {
        return Vec::new();
    };
    let point = Point::new(
        f64::from(mouse.column) * cell_size.x,
        f64::from(mouse.row) * cell_size.y,
    );
    let gallery_dragging = model
        .gallery
        .as_ref()
        .is_some_and(crate::gallery::GalleryStrip::is_dragging);

    let message = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match hit_test(model, point) {
            Hit::Image => Message::PointerDown(point),
            Hit::Toolbar(action) => Message::Toolbar(action),
            Hit::Gallery => Message::GalleryPress(point.x),
            Hit::Player => Message::Toolbar(ToolbarAction::FullScreen),
            Hit::Backdrop => Message::Close,
        },
        MouseEventKind::Drag(MouseButton::Left) if session.status.dragging => {
            Message::PointerMove(point)
        }
        MouseEventKind::Drag(MouseButton::Left) if gallery_dragging => {
            Message::GalleryDrag(point.x)
        }
        MouseEventKind::Up(MouseButton::Left) if session.status.dragging => Message::PointerUp,
        MouseEventKind::Up(MouseButton::Left) if gallery_dragging => {
            Message::GalleryRelease(point.x)
        }
        MouseEventKind::ScrollUp => Message::Wheel {
            zoom_in: true,
            at: point,
        },
        MouseEventKind::ScrollDown => Message::Wheel {
            zoom_in: false,
            at: point,
        },
        _ => return Vec::new(),
    };
    vec![message]
}
