//! Error types shared across the viewer.
//!
//! None of these escape the viewer: the event loop turns them into
//! [`Notice`](crate::app::Notice)s and keeps the session alive.

use std::path::PathBuf;
use std::time::Duration;

/// Failure to learn an image's natural size.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("image has no resolvable url")]
    EmptyUrl,
    #[error("cannot probe non-local image url {0}")]
    Unsupported(String),
    #[error("failed to read image dimensions from {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image did not report dimensions within {0:?}")]
    Timeout(Duration),
    #[error("size probe stopped before reporting")]
    Disconnected,
}

/// Failure while copying the displayed image to the clipboard.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("no image is open")]
    NothingOpen,
    #[error("no clipboard is available")]
    Unavailable,
    #[error("cannot copy non-local image url {0}")]
    Unsupported(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode png: {0}")]
    Encode(#[from] image::ImageError),
    #[error("clipboard rejected the image: {0}")]
    Rejected(String),
}
