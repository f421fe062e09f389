//! Viewer geometry: initial fit, anchored zoom, full-screen sizing.
//!
//! All values are CSS pixels. The image's position is its top-left corner
//! inside the overlay; zoom anchors are offsets from that corner.

use serde::Serialize;

use crate::config::FullScreenMode;
use crate::image::Size;

/// Largest share of the usable window an image initially covers.
pub const ZOOM_FACTOR: f64 = 0.8;
/// Zoom change per wheel notch or toolbar press.
pub const ZOOM_STEP: f64 = 0.1;
/// Height reserved below the image for the toolbar and gallery.
pub const FOOTER_HEIGHT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl WindowSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Area left for the image once the footer is reserved.
    pub fn usable(self) -> Self {
        Self::new(self.width, (self.height - FOOTER_HEIGHT).max(0.0))
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Size, position and transform of the displayed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub cur_width: f64,
    pub cur_height: f64,
    pub real_width: f64,
    pub real_height: f64,
    /// Degrees, always a multiple of 90 in `0..360`
    pub rotate: i32,
    /// `1.0` or `-1.0`
    pub scale_x: f64,
    pub scale_y: f64,
    pub invert_color: bool,
    pub full_screen: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            cur_width: 0.0,
            cur_height: 0.0,
            real_width: 0.0,
            real_height: 0.0,
            rotate: 0,
            scale_x: 1.0,
            scale_y: 1.0,
            invert_color: false,
            full_screen: false,
        }
    }
}

impl Geometry {
    /// Whether the natural size is known.
    pub fn is_sized(&self) -> bool {
        self.real_width > 0.0 && self.real_height > 0.0
    }

    /// Current size relative to natural size.
    pub fn ratio(&self) -> f64 {
        if self.real_width > 0.0 {
            self.cur_width / self.real_width
        } else {
            0.0
        }
    }

    /// Zoom level as shown to the user, rounded down.
    pub fn percent(&self) -> u32 {
        if self.real_width <= 0.0 {
            return 0;
        }
        (self.cur_width * 100.0 / self.real_width).floor() as u32
    }

    pub fn reset_transform(&mut self) {
        self.rotate = 0;
        self.scale_x = 1.0;
        self.scale_y = 1.0;
        self.invert_color = false;
    }

    /// Scale the image down to fit the usable window and center it.
    ///
    /// Images that already fit keep their natural size.
    pub fn fit_to_window(&mut self, natural: Size, window: WindowSize) {
        self.real_width = f64::from(natural.width);
        self.real_height = f64::from(natural.height);
        let usable = window.usable();
        if !self.is_sized() {
            self.cur_width = 0.0;
            self.cur_height = 0.0;
            return;
        }

        let scale = 1.0_f64
            .min(usable.width * ZOOM_FACTOR / self.real_width)
            .min(usable.height * ZOOM_FACTOR / self.real_height);
        self.cur_width = self.real_width * scale;
        self.cur_height = self.real_height * scale;
        self.left = (usable.width - self.cur_width) / 2.0;
        self.top = (usable.height - self.cur_height) / 2.0;
    }

    /// Zoom by `delta` keeping the point at `anchor` (relative to the
    /// image's top-left corner) in place. Returns the new ratio.
    ///
    /// A positive delta zooms in by `1 + delta`, a negative one zooms out by
    /// `1 / (1 - delta)`. Crossing 100% in either direction, or passing
    /// `actual_size`, lands exactly on 100%.
    pub fn zoom(&mut self, delta: f64, anchor: Point, actual_size: bool) -> f64 {
        let cur_ratio = self.ratio();
        if !self.is_sized() || cur_ratio <= 0.0 {
            return cur_ratio;
        }

        let mut factor = if delta > 0.0 {
            1.0 + delta
        } else {
            1.0 / (1.0 - delta)
        };
        let mut new_ratio = cur_ratio * factor;
        let crosses_actual =
            (cur_ratio < 1.0 && new_ratio >= 1.0) || (cur_ratio > 1.0 && new_ratio <= 1.0);
        if actual_size || crosses_actual {
            new_ratio = 1.0;
            factor = 1.0 / cur_ratio;
        }

        self.cur_width = self.real_width * new_ratio;
        self.cur_height = self.real_height * new_ratio;
        self.left += anchor.x * (1.0 - factor);
        self.top += anchor.y * (1.0 - factor);
        new_ratio
    }

    /// Offset of the image center from its top-left corner.
    pub fn center_anchor(&self) -> Point {
        Point::new(self.cur_width / 2.0, self.cur_height / 2.0)
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.top += dy;
    }

    pub const fn move_to(&mut self, left: f64, top: f64) {
        self.left = left;
        self.top = top;
    }

    pub const fn rotate_by(&mut self, degrees: i32) {
        self.rotate = (self.rotate + degrees).rem_euclid(360);
    }

    pub fn flip_x(&mut self) {
        self.scale_x = -self.scale_x;
    }

    pub fn flip_y(&mut self) {
        self.scale_y = -self.scale_y;
    }

    pub fn transform_css(&self) -> String {
        format!(
            "rotate({}deg) scaleX({}) scaleY({})",
            self.rotate, self.scale_x, self.scale_y
        )
    }

    pub fn filter_css(&self) -> &'static str {
        if self.invert_color {
            "invert(1) hue-rotate(180deg)"
        } else {
            "none"
        }
    }
}

/// A CSS length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    pub fn css(self) -> String {
        match self {
            Self::Px(px) => format!("{px}px"),
            Self::Percent(pct) => format!("{pct}%"),
        }
    }
}

/// Image placement inside the full-screen player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FullScreenLayout {
    pub width: Length,
    pub height: Length,
    pub top: f64,
}

/// Size the image for the full-screen player.
pub fn full_screen_layout(mode: FullScreenMode, natural: Size, window: WindowSize) -> FullScreenLayout {
    match mode {
        FullScreenMode::Stretch => FullScreenLayout {
            width: Length::Px(window.width),
            height: Length::Px(window.height),
            top: 0.0,
        },
        FullScreenMode::Fill => FullScreenLayout {
            width: Length::Percent(100.0),
            height: Length::Percent(100.0),
            top: 0.0,
        },
        FullScreenMode::Fit => {
            if natural.is_empty() {
                return FullScreenLayout {
                    width: Length::Px(0.0),
                    height: Length::Px(0.0),
                    top: window.height / 2.0,
                };
            }
            let real_width = f64::from(natural.width);
            let real_height = f64::from(natural.height);
            let ratio = (window.width / real_width).min(window.height / real_height);
            let height = real_height * ratio;
            FullScreenLayout {
                width: Length::Px(real_width * ratio),
                height: Length::Px(height),
                top: (window.height - height) / 2.0,
            }
        }
    }
}
