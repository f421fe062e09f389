use crate::config::ViewerConfig;
use crate::gallery::GalleryStrip;
use crate::image::Size;
use crate::ui::ElementId;
use crate::ui::geometry::{Geometry, Point, WindowSize};

/// How long the zoom percentage stays visible.
pub const TIP_DURATION_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tip {
    pub text: String,
    pub expires_at_ms: u64,
}

/// Original border styles of a page element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderStyles {
    pub width: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
}

/// The page element a session was opened from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetImage {
    pub element: Option<ElementId>,
    pub alt: String,
    pub src: String,
    pub default_border: BorderStyles,
}

impl TargetImage {
    pub fn new(alt: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            alt: alt.into(),
            src: src.into(),
            ..Self::default()
        }
    }
}

/// What the overlay currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShownImage {
    pub alt: String,
    pub src: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub popup: bool,
    pub dragging: bool,
    pub arrow_up: bool,
    pub arrow_down: bool,
    pub arrow_left: bool,
    pub arrow_right: bool,
}

/// The single open viewer session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSession {
    pub target: TargetImage,
    pub shown: ShownImage,
    pub geometry: Geometry,
    pub status: Status,
    /// Image corner minus pointer, captured on pointer-down
    pub drag_offset: Option<Point>,
    /// Identifies the size probe whose result this session accepts
    pub probe_generation: u64,
    pub natural: Option<Size>,
}

impl ViewerSession {
    pub(super) fn new(target: TargetImage, generation: u64) -> Self {
        let shown = ShownImage {
            alt: target.alt.clone(),
            src: target.src.clone(),
        };
        Self {
            target,
            shown,
            geometry: Geometry::default(),
            status: Status {
                popup: true,
                ..Status::default()
            },
            drag_offset: None,
            probe_generation: generation,
            natural: None,
        }
    }

    /// Point the session at another image; geometry waits for a new probe.
    pub(super) fn retarget(&mut self, shown: ShownImage, generation: u64) {
        self.shown = shown;
        self.geometry = Geometry {
            full_screen: self.geometry.full_screen,
            ..Geometry::default()
        };
        self.status = Status {
            popup: true,
            ..Status::default()
        };
        self.drag_offset = None;
        self.natural = None;
        self.probe_generation = generation;
    }
}

/// The complete viewer state.
///
/// All state lives here; collaborators only ever see it through messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub config: ViewerConfig,
    pub window: WindowSize,
    pub now_ms: u64,
    pub session: Option<ViewerSession>,
    pub gallery: Option<GalleryStrip>,
    pub tip: Option<Tip>,
    pub notices: Vec<Notice>,
    next_generation: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ViewerConfig::default(), WindowSize::default())
    }
}

impl Model {
    pub const fn new(config: ViewerConfig, window: WindowSize) -> Self {
        Self {
            config,
            window,
            now_ms: 0,
            session: None,
            gallery: None,
            tip: None,
            notices: Vec::new(),
            next_generation: 1,
        }
    }

    pub const fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.session.as_ref().map(|session| &session.geometry)
    }

    pub fn show_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub(super) const fn take_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    /// Show the zoom percentage, if enabled.
    pub(super) fn show_zoom_tip(&mut self) {
        if !self.config.image_tip {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        if !session.geometry.is_sized() {
            return;
        }
        self.tip = Some(Tip {
            text: format!("{}%", session.geometry.percent()),
            expires_at_ms: self.now_ms + TIP_DURATION_MS,
        });
    }

    pub(super) fn expire_tip(&mut self) {
        if self
            .tip
            .as_ref()
            .is_some_and(|tip| self.now_ms >= tip.expires_at_ms)
        {
            self.tip = None;
        }
    }
}
