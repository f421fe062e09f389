//! Asynchronous natural-size probing.
//!
//! A probe runs on a worker thread and reports through a channel. The event
//! loop polls it every [`PROBE_INTERVAL`] and gives up after
//! [`PROBE_TIMEOUT`].

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use serde::Serialize;

use crate::document::local_path;
use crate::error::ProbeError;

/// How often the event loop checks a pending probe.
pub const PROBE_INTERVAL: Duration = Duration::from_millis(40);
/// How long a probe may run before it is abandoned.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Natural pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

type ProbeResult = Result<Size, ProbeError>;

/// A size probe that may not have reported yet.
#[derive(Debug, Default)]
pub struct PendingProbe {
    rx: Option<Receiver<ProbeResult>>,
    started_ms: u64,
}

impl PendingProbe {
    /// A probe whose result is already known.
    pub fn ready(result: ProbeResult, now_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self {
            rx: Some(rx),
            started_ms: now_ms,
        }
    }

    /// Run `probe` on a worker thread.
    pub fn spawn<F>(probe: F, now_ms: u64) -> Self
    where
        F: FnOnce() -> ProbeResult + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(probe());
        });
        Self {
            rx: Some(rx),
            started_ms: now_ms,
        }
    }

    /// Check for a result without blocking.
    ///
    /// Returns `None` while the probe is still running. A cancelled or
    /// finished probe never reports again.
    pub fn poll(&mut self, now_ms: u64) -> Option<ProbeResult> {
        let rx = self.rx.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => {
                let elapsed = now_ms.saturating_sub(self.started_ms);
                if u128::from(elapsed) < PROBE_TIMEOUT.as_millis() {
                    return None;
                }
                Err(ProbeError::Timeout(PROBE_TIMEOUT))
            }
            Err(TryRecvError::Disconnected) => Err(ProbeError::Disconnected),
        };
        self.rx = None;
        Some(outcome)
    }

    /// Stop listening; a late result from the worker is discarded.
    pub fn cancel(&mut self) {
        self.rx = None;
    }

    pub const fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}

/// Learns an image's natural size from its URL.
pub trait SizeProbe {
    fn start(&self, url: &str, now_ms: u64) -> PendingProbe;
}

/// Reads dimensions of local images from their file headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSizeProbe;

impl SizeProbe for FsSizeProbe {
    fn start(&self, url: &str, now_ms: u64) -> PendingProbe {
        if url.is_empty() {
            return PendingProbe::ready(Err(ProbeError::EmptyUrl), now_ms);
        }
        let Some(path) = local_path(url) else {
            return PendingProbe::ready(Err(ProbeError::Unsupported(url.to_string())), now_ms);
        };
        tracing::debug!(path = %path.display(), "probing image size");
        PendingProbe::spawn(
            move || {
                image::image_dimensions(&path)
                    .map(|(width, height)| Size::new(width, height))
                    .map_err(|source| ProbeError::Decode { path, source })
            },
            now_ms,
        )
    }
}
