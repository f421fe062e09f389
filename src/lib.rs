// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. image::ImageReference)
    clippy::module_name_repetitions
)]

//! # Lightbox
//!
//! An image lightbox for markdown vaults.
//!
//! Lightbox finds every image a markdown note embeds and drives a viewer
//! over them:
//! - Markdown, wiki-link and HTML image syntaxes, link-wrapped or not
//! - Duplicate images told apart by their neighbours
//! - Fit, zoom, drag, rotate, flip and full-screen geometry
//! - A gallery strip for switching between a note's images
//!
//! ## Architecture
//!
//! Lightbox uses The Elm Architecture (TEA) pattern:
//! - **Model**: Viewer state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Mirror the model into a [`ui::RenderTarget`]
//!
//! ## Modules
//!
//! - [`app`]: Viewer state, input mapping and the event loop
//! - [`config`]: Settings and rc-file flags
//! - [`document`]: Scanning notes for images
//! - [`gallery`]: The gallery strip and duplicate resolution
//! - [`image`]: Inventory cache, size probing and copying
//! - [`ui`]: Geometry and overlay rendering

pub mod app;
pub mod config;
pub mod document;
pub mod error;
pub mod gallery;
pub mod image;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{Message, Model, Viewer};
    pub use crate::document::{DocumentImageInventory, ImageReference};
    pub use crate::ui::geometry::Geometry;
}
