use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::{Hotkey, ImageBorder, ViewerConfig};
use crate::document::{DocumentIdentity, DocumentSource, LinkResolver, SourceDocument};
use crate::error::ProbeError;
use crate::image::{ManualClock, MemoryClipboard, PendingProbe, Size, SizeProbe};
use crate::ui::geometry::{Point, WindowSize};
use crate::ui::{ElementId, RecordingTarget, RenderTarget, TARGET_MARKER, ToolbarAction};

use super::event_loop::ResizeDebouncer;
use super::{
    Activation, Direction, Message, Model, NoticeLevel, TargetImage, Viewer, update,
};

const NOTE: &str = "# Trip\n\
![cat|img](cat.png)\n\
![dog](dog.png)\n\
![cat|img](cat.png)\n\
![[bird.png]]\n\
[![linked](link.png)](https://example.org)\n";

/// (alt, resolved src) of every image in `NOTE`, in page order.
const PAGE: [(&str, &str); 5] = [
    ("cat", "app://local/vault/cat.png"),
    ("dog", "app://local/vault/dog.png"),
    ("cat", "app://local/vault/cat.png"),
    ("bird.png", "app://local/vault/bird.png"),
    ("linked", "app://local/vault/link.png"),
];

struct VaultPrefix;

impl LinkResolver for VaultPrefix {
    fn resolve(&self, link: &str, _source_path: &str) -> Option<String> {
        Some(format!("app://local/vault/{link}"))
    }
}

/// A document the test can swap out.
#[derive(Clone, Default)]
struct SharedDocument(Rc<RefCell<Option<SourceDocument>>>);

impl SharedDocument {
    fn with(text: &str, modified_at: u64) -> Self {
        let shared = Self::default();
        shared.set(text, modified_at);
        shared
    }

    fn set(&self, text: &str, modified_at: u64) {
        let identity = DocumentIdentity::new("notes/trip.md", 1, modified_at);
        *self.0.borrow_mut() = Some(SourceDocument::new(identity, text));
    }
}

impl DocumentSource for SharedDocument {
    fn current_document(&self) -> Option<SourceDocument> {
        self.0.borrow().clone()
    }
}

/// Reports known sizes immediately.
#[derive(Clone, Default)]
struct FixedProbe {
    sizes: HashMap<String, Size>,
    started: Rc<RefCell<Vec<String>>>,
}

impl FixedProbe {
    fn with(entries: &[(&str, Size)]) -> Self {
        Self {
            sizes: entries
                .iter()
                .map(|(src, size)| ((*src).to_string(), *size))
                .collect(),
            started: Rc::default(),
        }
    }
}

impl SizeProbe for FixedProbe {
    fn start(&self, url: &str, now_ms: u64) -> PendingProbe {
        self.started.borrow_mut().push(url.to_string());
        let result = self
            .sizes
            .get(url)
            .copied()
            .ok_or_else(|| ProbeError::Unsupported(url.to_string()));
        PendingProbe::ready(result, now_ms)
    }
}

/// Never reports.
struct SilentProbe;

impl SizeProbe for SilentProbe {
    fn start(&self, _url: &str, _now_ms: u64) -> PendingProbe {
        PendingProbe::default()
    }
}

struct Harness {
    viewer: Viewer<RecordingTarget>,
    page: Vec<ElementId>,
    clock: Rc<ManualClock>,
    probe: FixedProbe,
    document: SharedDocument,
}

fn sizes() -> Vec<(&'static str, Size)> {
    vec![
        ("app://local/vault/cat.png", Size::new(400, 200)),
        ("app://local/vault/dog.png", Size::new(2560, 1400)),
        ("app://local/vault/bird.png", Size::new(800, 600)),
        ("app://local/vault/link.png", Size::new(100, 100)),
    ]
}

fn harness_with(config: ViewerConfig) -> Harness {
    let clock = Rc::new(ManualClock::default());
    clock.set(1_000);
    let probe = FixedProbe::with(&sizes());
    let document = SharedDocument::with(NOTE, 5);
    let mut viewer = Viewer::new(
        RecordingTarget::new(),
        config,
        WindowSize::default(),
        Box::new(document.clone()),
        Box::new(VaultPrefix),
    )
    .with_clock(clock.clone())
    .with_probe(Box::new(probe.clone()));

    let body = viewer.target_mut().create_element("div", None);
    let page = PAGE
        .iter()
        .map(|(alt, src)| {
            let target = viewer.target_mut();
            let img = target.create_element("img", Some(body));
            target.set_attribute(img, "alt", alt);
            target.set_attribute(img, "src", src);
            img
        })
        .collect();
    Harness {
        viewer,
        page,
        clock,
        probe,
        document,
    }
}

fn harness() -> Harness {
    harness_with(ViewerConfig::default())
}

impl Harness {
    fn open(&mut self, index: usize) {
        let element = self.page[index];
        let page = self.page.clone();
        self.viewer.activate(element, &page);
        self.viewer.tick();
    }

    fn model(&self) -> &Model {
        self.viewer.model()
    }

    fn key(&mut self, code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) {
        self.viewer
            .handle_event(&Event::Key(KeyEvent::new_with_kind(code, modifiers, kind)));
    }

    fn tap(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.key(code, modifiers, KeyEventKind::Press);
        self.key(code, modifiers, KeyEventKind::Release);
        self.viewer.tick();
    }

    /// Mouse event at a pixel position; the default cell is 8x16 px.
    fn mouse(&mut self, kind: MouseEventKind, x: u16, y: u16) {
        self.viewer.handle_event(&Event::Mouse(MouseEvent {
            kind,
            column: x / 8,
            row: y / 16,
            modifiers: KeyModifiers::NONE,
        }));
    }

    fn shown_src(&self) -> String {
        self.model().session.as_ref().unwrap().shown.src.clone()
    }
}

fn open_model() -> Model {
    let model = Model::default();
    update(
        model,
        Message::Open(Activation {
            target: TargetImage::new("cat", "app://local/vault/cat.png"),
            rendered: Vec::new(),
        }),
    )
}

fn sized_model(size: Size) -> Model {
    let model = open_model();
    let generation = model.session.as_ref().unwrap().probe_generation;
    update(model, Message::ImageSized { generation, size })
}

fn close_to(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

// ---- pure update ----

#[test]
fn test_open_starts_unsized_popup() {
    let model = open_model();
    let session = model.session.as_ref().unwrap();
    assert!(session.status.popup);
    assert!(!session.geometry.is_sized());
    assert_eq!(session.shown.alt, "cat");
    assert!(model.gallery.is_none());
}

#[test]
fn test_image_sized_fits_and_centers() {
    let model = sized_model(Size::new(2560, 1400));
    let geometry = model.geometry().unwrap();
    assert!(close_to(geometry.cur_width, 1024.0));
    assert!(close_to(geometry.cur_height, 560.0));
    assert!(close_to(geometry.left, 128.0));
    assert!(close_to(geometry.top, 70.0));
    assert_eq!(model.tip.as_ref().unwrap().text, "40%");
}

#[test]
fn test_small_image_keeps_natural_size() {
    let model = sized_model(Size::new(400, 200));
    let geometry = model.geometry().unwrap();
    assert!(close_to(geometry.cur_width, 400.0));
    assert!(close_to(geometry.left, 440.0));
    assert!(close_to(geometry.top, 250.0));
}

#[test]
fn test_stale_probe_result_is_ignored() {
    let model = open_model();
    let generation = model.session.as_ref().unwrap().probe_generation;
    let model = update(
        model,
        Message::ImageSized {
            generation: generation + 7,
            size: Size::new(400, 200),
        },
    );
    assert!(!model.geometry().unwrap().is_sized());

    let model = update(
        model,
        Message::ProbeFailed {
            generation: generation + 7,
            reason: "gone".to_string(),
        },
    );
    assert!(model.notices.is_empty());
}

#[test]
fn test_probe_failure_keeps_session_open_with_warning() {
    let model = open_model();
    let generation = model.session.as_ref().unwrap().probe_generation;
    let model = update(
        model,
        Message::ProbeFailed {
            generation,
            reason: "timed out".to_string(),
        },
    );
    assert!(model.is_open());
    let notice = model.last_notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert!(notice.message.contains("timed out"));
}

#[test]
fn test_escape_leaves_full_screen_before_closing() {
    let model = sized_model(Size::new(400, 200));
    let model = update(model, Message::Toolbar(ToolbarAction::FullScreen));
    assert!(model.geometry().unwrap().full_screen);

    let model = update(model, Message::Escape);
    assert!(model.is_open());
    assert!(!model.geometry().unwrap().full_screen);

    let model = update(model, Message::Escape);
    assert!(!model.is_open());
}

#[test]
fn test_drag_moves_by_pointer_delta() {
    let model = sized_model(Size::new(400, 200));
    let model = update(model, Message::PointerDown(Point::new(500.0, 300.0)));
    assert!(model.session.as_ref().unwrap().status.dragging);
    let model = update(model, Message::PointerMove(Point::new(530.0, 280.0)));
    let geometry = model.geometry().unwrap();
    assert!(close_to(geometry.left, 470.0));
    assert!(close_to(geometry.top, 230.0));

    let model = update(model, Message::PointerLeave);
    let model = update(model, Message::PointerMove(Point::new(900.0, 900.0)));
    assert!(close_to(model.geometry().unwrap().left, 470.0));
}

#[test]
fn test_wheel_zoom_keeps_anchor_in_place() {
    let model = sized_model(Size::new(2560, 1400));
    // pointer at the image's top-left corner: the corner stays put
    let model = update(
        model,
        Message::Wheel {
            zoom_in: true,
            at: Point::new(128.0, 70.0),
        },
    );
    let geometry = model.geometry().unwrap();
    assert!(close_to(geometry.ratio(), 0.44));
    assert!(close_to(geometry.left, 128.0));
    assert!(close_to(geometry.top, 70.0));
}

#[test]
fn test_zoom_in_snaps_to_actual_size() {
    let model = sized_model(Size::new(1100, 100));
    // fit ratio 1024 / 1100 is just under 1, one step crosses 100%
    let model = update(model, Message::Toolbar(ToolbarAction::ZoomIn));
    let geometry = model.geometry().unwrap();
    assert!(close_to(geometry.ratio(), 1.0));
    assert_eq!(model.tip.as_ref().unwrap().text, "100%");
}

#[test]
fn test_zoom_to_actual_then_out() {
    let model = sized_model(Size::new(2560, 1400));
    let model = update(model, Message::Toolbar(ToolbarAction::ZoomToActual));
    assert!(close_to(model.geometry().unwrap().ratio(), 1.0));
    let model = update(model, Message::Toolbar(ToolbarAction::ZoomOut));
    assert!(close_to(model.geometry().unwrap().ratio(), 1.0 / 1.1));
}

#[test]
fn test_transform_toolbar_actions() {
    let mut model = sized_model(Size::new(400, 200));
    for action in [
        ToolbarAction::RotateLeft,
        ToolbarAction::ScaleX,
        ToolbarAction::InvertColor,
    ] {
        model = update(model, Message::Toolbar(action));
    }
    let geometry = model.geometry().unwrap();
    assert_eq!(geometry.rotate, 270);
    assert_eq!(geometry.transform_css(), "rotate(270deg) scaleX(-1) scaleY(1)");
    assert_eq!(geometry.filter_css(), "invert(1) hue-rotate(180deg)");
}

#[test]
fn test_refresh_restarts_probe_generation() {
    let model = sized_model(Size::new(400, 200));
    let before = model.session.as_ref().unwrap().probe_generation;
    let model = update(model, Message::Toolbar(ToolbarAction::Refresh));
    let session = model.session.as_ref().unwrap();
    assert!(session.probe_generation > before);
    assert!(session.natural.is_none());
}

#[test]
fn test_arrow_keys_move_and_chord_diagonally() {
    let model = sized_model(Size::new(400, 200));
    let model = update(model, Message::ArrowPressed(Direction::Up));
    let geometry = model.geometry().unwrap();
    assert!(close_to(geometry.left, 440.0));
    assert!(close_to(geometry.top, 240.0));

    // left while up is held moves diagonally
    let model = update(model, Message::ArrowPressed(Direction::Left));
    let geometry = model.geometry().unwrap();
    assert!(close_to(geometry.left, 430.0));
    assert!(close_to(geometry.top, 230.0));

    let model = update(model, Message::ArrowReleased(Direction::Up));
    let model = update(model, Message::ArrowPressed(Direction::Left));
    let geometry = model.geometry().unwrap();
    assert!(close_to(geometry.left, 420.0));
    assert!(close_to(geometry.top, 230.0));
}

#[test]
fn test_tip_expires_after_a_second() {
    let model = sized_model(Size::new(400, 200));
    assert!(model.tip.is_some());
    let model = update(model, Message::Tick(999));
    assert!(model.tip.is_some());
    let model = update(model, Message::Tick(1_000));
    assert!(model.tip.is_none());
}

#[test]
fn test_image_tip_disabled() {
    let config = ViewerConfig {
        image_tip: false,
        ..ViewerConfig::default()
    };
    let model = Model::new(config, WindowSize::default());
    let model = update(
        model,
        Message::Open(Activation {
            target: TargetImage::new("a", "b"),
            rendered: Vec::new(),
        }),
    );
    let generation = model.session.as_ref().unwrap().probe_generation;
    let model = update(
        model,
        Message::ImageSized {
            generation,
            size: Size::new(10, 10),
        },
    );
    assert!(model.tip.is_none());
}

#[test]
fn test_messages_without_session_are_ignored() {
    let model = Model::default();
    let model = update(model, Message::Toolbar(ToolbarAction::ZoomIn));
    let model = update(model, Message::ArrowPressed(Direction::Down));
    let model = update(model, Message::SwitchNext);
    assert!(!model.is_open());
    assert!(model.gallery.is_none());
}

#[test]
fn test_resize_debouncer_waits() {
    let mut debouncer = ResizeDebouncer::new(50);
    debouncer.queue(WindowSize::new(100.0, 100.0), 10);
    assert_eq!(debouncer.take_ready(40), None);
    debouncer.queue(WindowSize::new(200.0, 100.0), 40);
    assert_eq!(debouncer.take_ready(90), Some(WindowSize::new(200.0, 100.0)));
    assert_eq!(debouncer.take_ready(200), None);
}

// ---- viewer ----

#[test]
fn test_activation_fits_after_probe() {
    let mut h = harness();
    h.open(1);
    let geometry = h.model().geometry().unwrap();
    assert!(close_to(geometry.cur_width, 1024.0));

    let image = h.viewer.overlay().image();
    let target = h.viewer.target();
    assert_eq!(target.attribute(image, "src").unwrap(), "app://local/vault/dog.png");
    assert_eq!(target.style(image, "width").unwrap(), "1024px");
    assert_eq!(target.style(image, "margin-left").unwrap(), "128px");
    assert_eq!(target.text(h.viewer.overlay().tip()), "40%");
}

#[test]
fn test_duplicate_activation_resolves_by_context() {
    let mut h = harness();
    h.open(2);
    let gallery = h.model().gallery.as_ref().unwrap();
    assert_eq!(gallery.len(), 5);
    assert_eq!(gallery.active(), Some(2));
    assert!(gallery.is_unique());

    let thumbs = h.viewer.overlay().thumbnails().to_vec();
    let target = h.viewer.target();
    assert_eq!(
        target.attribute(thumbs[2], "class").unwrap(),
        "lightbox-thumb active"
    );
    assert_eq!(target.attribute(thumbs[0], "class").unwrap(), "lightbox-thumb");
}

#[test]
fn test_first_duplicate_resolves_to_first() {
    let mut h = harness();
    h.open(0);
    let gallery = h.model().gallery.as_ref().unwrap();
    assert_eq!(gallery.active(), Some(0));
    assert!(gallery.is_unique());
}

#[test]
fn test_linked_images_can_be_excluded() {
    let config = ViewerConfig {
        include_linked_images: false,
        ..ViewerConfig::default()
    };
    let mut h = harness_with(config);
    h.open(3);
    let gallery = h.model().gallery.as_ref().unwrap();
    assert_eq!(gallery.len(), 4);
    assert_eq!(gallery.active(), Some(3));
    assert!(gallery.is_unique(), "hidden linked image is still a page neighbour");
}

#[test]
fn test_gallery_disabled() {
    let config = ViewerConfig {
        gallery: false,
        ..ViewerConfig::default()
    };
    let mut h = harness_with(config);
    h.open(0);
    assert!(h.model().gallery.is_none());
    assert!(h.viewer.overlay().thumbnails().is_empty());
    assert!(h.viewer.cache().is_empty());
}

#[test]
fn test_inventory_is_cached_until_document_changes() {
    let mut h = harness();
    h.open(0);
    h.viewer.send(Message::Close);
    assert_eq!(h.viewer.cache().len(), 1);

    h.document.set("![only](only.png)\n", 6);
    h.open(0);
    // the page still shows the old images, but the inventory was rebuilt
    let gallery = h.model().gallery.as_ref().unwrap();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery.active(), None);
    assert_eq!(h.viewer.cache().len(), 1);
}

#[test]
fn test_switch_hotkey_wraps_through_gallery() {
    let mut h = harness();
    h.open(4);
    h.tap(KeyCode::Right, KeyModifiers::CONTROL);
    assert_eq!(h.model().gallery.as_ref().unwrap().active(), Some(0));
    assert_eq!(h.shown_src(), "app://local/vault/cat.png");
    assert!(close_to(h.model().geometry().unwrap().cur_width, 400.0));

    h.tap(KeyCode::Left, KeyModifiers::CONTROL);
    assert_eq!(h.model().gallery.as_ref().unwrap().active(), Some(4));
    assert_eq!(h.shown_src(), "app://local/vault/link.png");
}

#[test]
fn test_switch_keeps_original_target() {
    let mut h = harness();
    h.open(1);
    h.tap(KeyCode::Right, KeyModifiers::CONTROL);
    let session = h.model().session.as_ref().unwrap();
    assert_eq!(session.target.element, Some(h.page[1]));
    assert_eq!(session.shown.alt, "cat");
}

#[test]
fn test_plain_arrows_move_without_switching() {
    let mut h = harness();
    h.open(0);
    h.tap(KeyCode::Right, KeyModifiers::NONE);
    assert_eq!(h.model().gallery.as_ref().unwrap().active(), Some(0));
    assert!(close_to(h.model().geometry().unwrap().left, 450.0));
    assert!(!h.model().session.as_ref().unwrap().status.arrow_right);
}

#[test]
fn test_move_hotkey_gates_arrows() {
    let config = ViewerConfig {
        move_hotkey: Hotkey::Alt,
        ..ViewerConfig::default()
    };
    let mut h = harness_with(config);
    h.open(0);
    h.tap(KeyCode::Down, KeyModifiers::NONE);
    assert!(close_to(h.model().geometry().unwrap().top, 250.0));
    h.tap(KeyCode::Down, KeyModifiers::ALT);
    assert!(close_to(h.model().geometry().unwrap().top, 260.0));
}

#[test]
fn test_escape_key_closes_and_removes_listeners() {
    let mut h = harness();
    h.open(0);
    let container = h.viewer.overlay().container();
    assert!(h.viewer.target().is_listening(container, "wheel"));

    h.key(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press);
    assert!(!h.model().is_open());
    assert!(!h.viewer.target().is_listening(container, "keydown"));
    assert_eq!(
        h.viewer.target().style(container, "display").unwrap(),
        "none"
    );
    assert!(h.viewer.overlay().thumbnails().is_empty());
}

#[test]
fn test_close_applies_configured_border() {
    let config = ViewerConfig {
        border: Some(ImageBorder::default()),
        ..ViewerConfig::default()
    };
    let mut h = harness_with(config);
    let first = h.page[0];
    h.viewer.target_mut().set_style(first, "border-color", "blue");
    h.open(0);
    assert_eq!(
        h.viewer.target().attribute(first, TARGET_MARKER).as_deref(),
        Some("1")
    );

    h.viewer.send(Message::Close);
    let target = h.viewer.target();
    assert_eq!(target.style(first, "border-color").unwrap(), "red");
    assert_eq!(target.style(first, "border-style").unwrap(), "solid");
    assert_eq!(target.style(first, "border-width").unwrap(), "medium");

    // the next activation restores the previous element
    h.open(1);
    let target = h.viewer.target();
    assert_eq!(target.style(first, "border-color").unwrap(), "blue");
    assert_eq!(target.style(first, "border-style"), None);
    assert_eq!(target.attribute(first, TARGET_MARKER), None);
    assert_eq!(
        target.attribute(h.page[1], TARGET_MARKER).as_deref(),
        Some("1")
    );
}

#[test]
fn test_no_border_without_config() {
    let mut h = harness();
    h.open(0);
    h.viewer.send(Message::Close);
    assert_eq!(h.viewer.target().style(h.page[0], "border-color"), None);
}

#[test]
fn test_backdrop_press_closes() {
    let mut h = harness();
    h.open(0);
    h.mouse(MouseEventKind::Down(MouseButton::Left), 16, 16);
    assert!(!h.model().is_open());
}

#[test]
fn test_image_press_drags() {
    let mut h = harness();
    h.open(0);
    // image spans x 440..840, y 250..450
    h.mouse(MouseEventKind::Down(MouseButton::Left), 480, 320);
    assert!(h.model().session.as_ref().unwrap().status.dragging);
    h.mouse(MouseEventKind::Drag(MouseButton::Left), 520, 352);
    let geometry = h.model().geometry().unwrap();
    assert!(close_to(geometry.left, 480.0));
    assert!(close_to(geometry.top, 282.0));
    h.mouse(MouseEventKind::Up(MouseButton::Left), 520, 352);
    assert!(!h.model().session.as_ref().unwrap().status.dragging);
}

#[test]
fn test_scroll_zooms() {
    let mut h = harness();
    h.open(1);
    h.mouse(MouseEventKind::ScrollUp, 128, 80);
    assert!(close_to(h.model().geometry().unwrap().ratio(), 0.44));
    h.mouse(MouseEventKind::ScrollDown, 128, 80);
    assert!(close_to(h.model().geometry().unwrap().ratio(), 0.4));
}

#[test]
fn test_toolbar_click_maps_through_class() {
    let mut h = harness();
    h.open(0);
    let rotate = h.viewer.overlay().button(ToolbarAction::RotateRight).unwrap();
    h.viewer.click(rotate);
    assert_eq!(h.model().geometry().unwrap().rotate, 90);
    assert_eq!(
        h.viewer
            .target()
            .style(h.viewer.overlay().image(), "transform")
            .unwrap(),
        "rotate(90deg) scaleX(1) scaleY(1)"
    );
}

#[test]
fn test_thumbnail_click_selects() {
    let mut h = harness();
    h.open(0);
    let thumb = h.viewer.overlay().thumbnails()[3];
    h.viewer.click(thumb);
    h.viewer.tick();
    assert_eq!(h.model().gallery.as_ref().unwrap().active(), Some(3));
    assert_eq!(h.shown_src(), "app://local/vault/bird.png");
}

#[test]
fn test_container_click_closes() {
    let mut h = harness();
    h.open(0);
    let container = h.viewer.overlay().container();
    h.viewer.click(container);
    assert!(!h.model().is_open());
}

#[test]
fn test_gallery_quick_release_is_click() {
    let mut h = harness();
    h.open(0);
    // active 0 centres at 1280 / 2.5 = 512; thumbnail 1 sits at 564..616
    h.mouse(MouseEventKind::Down(MouseButton::Left), 584, 792);
    h.clock.set(1_100);
    h.mouse(MouseEventKind::Up(MouseButton::Left), 584, 792);
    h.viewer.tick();
    assert_eq!(h.model().gallery.as_ref().unwrap().active(), Some(1));
}

#[test]
fn test_gallery_slow_drag_translates() {
    let mut h = harness();
    h.open(0);
    h.mouse(MouseEventKind::Down(MouseButton::Left), 584, 792);
    h.clock.set(1_500);
    h.mouse(MouseEventKind::Drag(MouseButton::Left), 544, 792);
    assert!(close_to(h.model().gallery.as_ref().unwrap().translate_x(), 472.0));
    h.mouse(MouseEventKind::Up(MouseButton::Left), 544, 792);
    let gallery = h.model().gallery.as_ref().unwrap();
    assert_eq!(gallery.active(), Some(0));
    assert!(!gallery.is_dragging());
}

#[test]
fn test_full_screen_uses_player() {
    let mut h = harness();
    h.open(3);
    h.viewer.send(Message::Toolbar(ToolbarAction::FullScreen));
    let player = h.viewer.overlay().player();
    assert_eq!(h.viewer.target().style(player, "display").unwrap(), "block");

    h.mouse(MouseEventKind::Down(MouseButton::Left), 10, 10);
    assert!(h.model().is_open());
    assert!(!h.model().geometry().unwrap().full_screen);
    assert_eq!(h.viewer.target().style(player, "display").unwrap(), "none");
}

#[test]
fn test_new_activation_replaces_probe() {
    let mut h = harness();
    h.open(0);
    h.open(1);
    let started = h.probe.started.borrow().clone();
    assert_eq!(
        started,
        vec![
            "app://local/vault/cat.png".to_string(),
            "app://local/vault/dog.png".to_string()
        ]
    );
    assert_eq!(h.shown_src(), "app://local/vault/dog.png");
}

#[test]
fn test_silent_probe_leaves_session_unsized() {
    let mut h = harness();
    h.viewer = Viewer::new(
        RecordingTarget::new(),
        ViewerConfig::default(),
        WindowSize::default(),
        Box::new(h.document.clone()),
        Box::new(VaultPrefix),
    )
    .with_probe(Box::new(SilentProbe));
    let img = h.viewer.target_mut().create_element("img", None);
    h.viewer.target_mut().set_attribute(img, "src", "app://local/vault/cat.png");
    h.viewer.activate(img, &[img]);
    h.viewer.wait_for_probe();
    assert!(h.model().is_open());
    assert!(!h.model().geometry().unwrap().is_sized());
}

#[test]
fn test_unknown_image_reports_probe_failure() {
    let mut h = harness();
    let img = h.viewer.target_mut().create_element("img", None);
    h.viewer
        .target_mut()
        .set_attribute(img, "src", "https://example.org/x.png");
    h.viewer.activate(img, &[img]);
    h.viewer.tick();
    assert!(h.model().is_open());
    assert_eq!(h.model().last_notice().unwrap().level, NoticeLevel::Warning);
}

#[test]
fn test_copy_reports_failure_for_remote_image() {
    let mut h = harness();
    h.viewer = Viewer::new(
        RecordingTarget::new(),
        ViewerConfig::default(),
        WindowSize::default(),
        Box::new(h.document.clone()),
        Box::new(VaultPrefix),
    )
    .with_probe(Box::new(h.probe.clone()))
    .with_clipboard(Box::new(MemoryClipboard::default()));
    let img = h.viewer.target_mut().create_element("img", None);
    h.viewer
        .target_mut()
        .set_attribute(img, "src", "https://example.org/x.png");
    h.viewer.activate(img, &[img]);
    h.viewer.send(Message::Toolbar(ToolbarAction::Copy));
    let notice = h.model().last_notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.starts_with("Copy failed"));
}

#[test]
fn test_copy_local_image_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shot.png");
    image::RgbaImage::new(3, 3).save(&path).unwrap();
    let url = crate::document::local_url(&path);

    let mut h = harness();
    h.viewer = Viewer::new(
        RecordingTarget::new(),
        ViewerConfig::default(),
        WindowSize::default(),
        Box::new(h.document.clone()),
        Box::new(VaultPrefix),
    )
    .with_clipboard(Box::new(MemoryClipboard::default()));
    let img = h.viewer.target_mut().create_element("img", None);
    h.viewer.target_mut().set_attribute(img, "src", &url);
    h.viewer.activate(img, &[img]);
    h.viewer.wait_for_probe();
    assert!(close_to(h.model().geometry().unwrap().cur_width, 3.0));

    h.viewer.send(Message::Toolbar(ToolbarAction::Copy));
    assert_eq!(h.model().last_notice().unwrap().level, NoticeLevel::Info);
}
