//! Viewer presentation.
//!
//! This module contains:
//! - [`geometry`]: Fit, zoom and full-screen math
//! - [`RenderTarget`]: The element-tree primitives the viewer draws with
//! - [`OverlayView`]: The overlay, toolbar, gallery strip and full-screen player

pub mod geometry;

mod overlay;
mod target;

pub use overlay::{Hit, OVERLAY_EVENTS, OverlayView, TARGET_MARKER, ToolbarAction, hit_test};
pub use target::{ElementId, Node, RecordingTarget, RenderTarget};
