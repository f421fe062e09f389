use crossterm::event::Event;

use crate::app::{Message, Viewer, update};
use crate::image::{Clock, PROBE_INTERVAL};
use crate::ui::RenderTarget;
use crate::ui::geometry::WindowSize;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(WindowSize, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, window: WindowSize, now_ms: u64) {
        self.pending = Some((window, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<WindowSize> {
        let (window, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some(window)
        } else {
            None
        }
    }
}

impl<R: RenderTarget> Viewer<R> {
    /// Apply a message, run its effects and redraw.
    pub fn send(&mut self, msg: Message) {
        self.queue.push_back(msg);
        self.pump();
    }

    /// Feed a terminal event through the viewer.
    pub fn handle_event(&mut self, event: &Event) {
        let now_ms = self.clock.now_ms();
        self.queue.push_back(Message::Tick(now_ms));
        let messages = self.map_event(event, now_ms);
        self.queue.extend(messages);
        self.pump();
    }

    /// Advance timers: clock, pending resize and the size probe.
    pub fn tick(&mut self) {
        let now_ms = self.clock.now_ms();
        self.queue.push_back(Message::Tick(now_ms));
        if let Some(window) = self.resize.take_ready(now_ms) {
            self.queue.push_back(Message::Resize(window));
        }
        if let Some(generation) = self.probe_generation
            && let Some(result) = self.pending.poll(now_ms)
        {
            let msg = match result {
                Ok(size) => {
                    tracing::debug!(generation, width = size.width, height = size.height, "probe finished");
                    Message::ImageSized { generation, size }
                }
                Err(err) => {
                    tracing::warn!(generation, %err, "probe failed");
                    Message::ProbeFailed {
                        generation,
                        reason: err.to_string(),
                    }
                }
            };
            self.queue.push_back(msg);
        }
        self.pump();
    }

    /// Block until the outstanding size probe has reported.
    pub fn wait_for_probe(&mut self) {
        self.tick();
        while self.pending.is_active() {
            std::thread::sleep(PROBE_INTERVAL);
            self.tick();
        }
    }

    fn pump(&mut self) {
        while let Some(msg) = self.queue.pop_front() {
            let previous = self
                .model
                .session
                .as_ref()
                .map(|session| session.target.clone());
            self.model = update(std::mem::take(&mut self.model), msg.clone());
            self.handle_message_side_effects(&msg);
            if let Some(target) = previous
                && !self.model.is_open()
            {
                self.apply_closed_border(&target);
            }
            self.sync_probe();
        }
        self.overlay.render(&mut self.target, &self.model);
    }

    /// Keep exactly one probe running for the shown image, and none
    /// once it is sized or the session is gone.
    fn sync_probe(&mut self) {
        let wanted = self
            .model
            .session
            .as_ref()
            .filter(|session| session.natural.is_none())
            .map(|session| (session.probe_generation, session.shown.src.clone()));
        match wanted {
            Some((generation, _)) if self.probe_generation == Some(generation) => {}
            Some((generation, src)) => {
                if self.pending.is_active() {
                    tracing::debug!(stale = ?self.probe_generation, "probe cancelled");
                }
                self.pending.cancel();
                self.pending = self.probe.start(&src, self.clock.now_ms());
                self.probe_generation = Some(generation);
                tracing::debug!(generation, %src, "probe started");
            }
            None => {
                if self.pending.is_active() {
                    tracing::debug!(stale = ?self.probe_generation, "probe cancelled");
                    self.pending.cancel();
                }
                if self.model.session.is_none() {
                    self.probe_generation = None;
                }
            }
        }
    }
}
