//! Image-side services: inventory caching, size probing and copying.

mod cache;
mod clipboard;
mod probe;

pub use cache::{Clock, DEFAULT_CAPACITY, InventoryCache, SystemClock};
pub use clipboard::{
    ClipboardSink, FileClipboard, MemoryClipboard, NoClipboard, SystemClipboard, copy_image,
    encode_png, load_png_for_copy,
};
pub use probe::{FsSizeProbe, PROBE_INTERVAL, PROBE_TIMEOUT, PendingProbe, Size, SizeProbe};

#[cfg(test)]
pub(crate) use cache::tests::ManualClock;
