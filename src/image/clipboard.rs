//! Copying the displayed image out of the viewer.
//!
//! The image is re-encoded as PNG and handed to a [`ClipboardSink`].
//! [`SystemClipboard`] places it on the OS clipboard; hosts without one
//! plug in [`NoClipboard`].

use std::borrow::Cow;
use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::document::local_path;
use crate::error::ClipboardError;

/// Destination for copied images.
pub trait ClipboardSink {
    /// Store `png` as the clipboard's image content.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard refuses the data.
    fn write_image(&mut self, png: &[u8]) -> Result<(), ClipboardError>;
}

/// Host without an image clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn write_image(&mut self, _png: &[u8]) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

/// The operating system clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_image(&mut self, png: &[u8]) -> Result<(), ClipboardError> {
        let rgba = image::load_from_memory_with_format(png, ImageFormat::Png)?.to_rgba8();
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|err| {
                tracing::warn!(%err, "system clipboard unavailable");
                ClipboardError::Unavailable
            })?;
            self.clipboard = Some(clipboard);
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return Err(ClipboardError::Unavailable);
        };
        clipboard
            .set_image(image_data(&rgba))
            .map_err(|err| ClipboardError::Rejected(err.to_string()))
    }
}

/// RGBA pixels in the layout arboard expects.
fn image_data(image: &RgbaImage) -> arboard::ImageData<'_> {
    arboard::ImageData {
        width: image.width() as usize,
        height: image.height() as usize,
        bytes: Cow::Borrowed(image.as_raw()),
    }
}

/// Keeps the last copied image in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub contents: Option<Vec<u8>>,
}

impl ClipboardSink for MemoryClipboard {
    fn write_image(&mut self, png: &[u8]) -> Result<(), ClipboardError> {
        self.contents = Some(png.to_vec());
        Ok(())
    }
}

/// Writes each copied image to a fixed file.
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ClipboardSink for FileClipboard {
    fn write_image(&mut self, png: &[u8]) -> Result<(), ClipboardError> {
        std::fs::write(&self.path, png).map_err(|err| ClipboardError::Rejected(err.to_string()))
    }
}

/// Encode an image as PNG bytes.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ClipboardError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Load the image behind `url` and encode it as PNG for copying.
///
/// # Errors
///
/// Returns an error for non-local urls, unreadable files or images that
/// cannot be decoded.
pub fn load_png_for_copy(url: &str) -> Result<Vec<u8>, ClipboardError> {
    let path = local_path(url).ok_or_else(|| ClipboardError::Unsupported(url.to_string()))?;
    let bytes = std::fs::read(&path).map_err(|source| ClipboardError::Read {
        path: path.clone(),
        source,
    })?;
    let image = image::load_from_memory(&bytes)?;
    encode_png(&image)
}

/// Copy the image at `url` into `sink`.
///
/// # Errors
///
/// Returns an error if loading, encoding or the sink fails.
pub fn copy_image(url: &str, sink: &mut dyn ClipboardSink) -> Result<(), ClipboardError> {
    let png = load_png_for_copy(url)?;
    sink.write_image(&png)?;
    tracing::info!(bytes = png.len(), "copied image to clipboard");
    Ok(())
}
