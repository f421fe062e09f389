//! Lightbox - inspect the images of a markdown note and drive the viewer.
//!
//! # Usage
//!
//! ```bash
//! lightbox notes/trip.md
//! lightbox notes/trip.md --vault ~/vault --json
//! lightbox notes/trip.md --open 2 --key ctrl+right --key zoom_in
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::Serialize;

use lightbox::app::{Message, Model, Viewer};
use lightbox::config::{
    BorderStyle, BorderWidth, ConfigFlags, FullScreenMode, Hotkey, ViewerConfig,
    clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use lightbox::document::{
    DocumentImageInventory, FsDocumentSource, VaultLinkResolver, build_inventory,
};
use lightbox::image::{Clock, FileClipboard, SystemClipboard, SystemClock};
use lightbox::ui::geometry::{Geometry, WindowSize};
use lightbox::ui::{RecordingTarget, RenderTarget, ToolbarAction};

/// Image inventory and lightbox viewer for markdown notes
#[derive(Parser, Debug)]
#[command(name = "lightbox", version, about, long_about = None)]
struct Cli {
    /// Markdown note to inspect
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Vault root for resolving wiki links (defaults to the note's directory)
    #[arg(long, value_name = "DIR")]
    vault: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Open the viewer on the Nth image of the note (0-based) and print its state
    #[arg(long, value_name = "N")]
    open: Option<usize>,

    /// Window size used for fitting
    #[arg(long, value_name = "WxH", default_value = "1280x800", value_parser = parse_window)]
    window: WindowSize,

    /// Key or toolbar action to send once open (e.g. right, ctrl+left, esc, zoom_in)
    #[arg(long = "key", value_name = "KEY")]
    keys: Vec<String>,

    /// Write images copied with the copy action to this file instead of the system clipboard
    #[arg(long, value_name = "PATH")]
    copy_to: Option<PathBuf>,

    /// Leave link-wrapped images out of the gallery
    #[arg(long)]
    no_linked_images: bool,

    /// Modifiers that must be held for arrow keys to move the image
    #[arg(long, value_enum)]
    move_hotkey: Option<Hotkey>,

    /// Modifiers that must be held for left/right to switch images
    #[arg(long, value_enum)]
    switch_hotkey: Option<Hotkey>,

    /// Pixels moved per arrow key
    #[arg(long, value_name = "PX")]
    move_speed: Option<u32>,

    /// How the image is sized in full-screen mode
    #[arg(long, value_enum)]
    full_screen: Option<FullScreenMode>,

    /// Number of notes whose image inventory is kept
    #[arg(long, value_name = "N")]
    cache_capacity: Option<usize>,

    /// Hide the zoom percentage tip
    #[arg(long)]
    no_image_tip: bool,

    /// Hide the gallery strip
    #[arg(long)]
    no_gallery: bool,

    /// Outline the viewed image after closing
    #[arg(long)]
    border: bool,

    #[arg(long, value_enum)]
    border_width: Option<BorderWidth>,

    #[arg(long, value_enum)]
    border_style: Option<BorderStyle>,

    #[arg(long, value_name = "COLOR")]
    border_color: Option<String>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn parse_window(value: &str) -> Result<WindowSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    let width: u32 = width.trim().parse().map_err(|_| format!("bad width: {width}"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("bad height: {height}"))?;
    Ok(WindowSize::new(f64::from(width), f64::from(height)))
}

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Key(KeyCode, KeyModifiers),
    Action(ToolbarAction),
}

fn parse_step(token: &str) -> Result<Step> {
    if let Some(action) = ToolbarAction::from_class(&format!("toolbar_{token}")) {
        return Ok(Step::Action(action));
    }
    let mut modifiers = KeyModifiers::NONE;
    let mut parts = token.split('+').collect::<Vec<_>>();
    let key = parts.pop().unwrap_or_default();
    for part in parts {
        modifiers |= match part.to_ascii_lowercase().as_str() {
            "ctrl" => KeyModifiers::CONTROL,
            "alt" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            other => anyhow::bail!("unknown modifier '{other}' in key '{token}'"),
        };
    }
    let code = match key.to_ascii_lowercase().as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        _ => anyhow::bail!("unknown key '{token}'"),
    };
    Ok(Step::Key(code, modifiers))
}

#[derive(Serialize)]
struct ShownReport {
    alt: String,
    src: String,
    geometry: Geometry,
    percent: u32,
}

#[derive(Serialize)]
struct GalleryReport {
    len: usize,
    active: Option<usize>,
    unique: bool,
    translate_x: f64,
}

#[derive(Serialize)]
struct SessionReport {
    open: bool,
    shown: Option<ShownReport>,
    gallery: Option<GalleryReport>,
    tip: Option<String>,
    notices: Vec<String>,
}

impl SessionReport {
    fn from_model(model: &Model) -> Self {
        Self {
            open: model.is_open(),
            shown: model.session.as_ref().map(|session| ShownReport {
                alt: session.shown.alt.clone(),
                src: session.shown.src.clone(),
                geometry: session.geometry.clone(),
                percent: session.geometry.percent(),
            }),
            gallery: model.gallery.as_ref().map(|gallery| GalleryReport {
                len: gallery.len(),
                active: gallery.active(),
                unique: gallery.is_unique(),
                translate_x: gallery.translate_x(),
            }),
            tip: model.tip.as_ref().map(|tip| tip.text.clone()),
            notices: model
                .notices
                .iter()
                .map(|notice| format!("{:?}: {}", notice.level, notice.message))
                .collect(),
        }
    }

    fn print_text(&self) {
        println!("open: {}", if self.open { "yes" } else { "no" });
        if let Some(shown) = &self.shown {
            let geometry = &shown.geometry;
            println!("image: {} ({})", shown.alt, shown.src);
            println!(
                "size: {}x{} at {},{} ({}%)",
                geometry.cur_width, geometry.cur_height, geometry.left, geometry.top, shown.percent
            );
            println!("transform: {}", geometry.transform_css());
            if geometry.invert_color {
                println!("colors: inverted");
            }
            if geometry.full_screen {
                println!("full screen: yes");
            }
        }
        if let Some(gallery) = &self.gallery {
            let active = gallery
                .active
                .map_or_else(|| "-".to_string(), |index| (index + 1).to_string());
            println!(
                "gallery: {active}/{}{}",
                gallery.len,
                if gallery.unique { "" } else { " (ambiguous)" }
            );
        }
        for notice in &self.notices {
            println!("{notice}");
        }
    }
}

fn print_inventory(inventory: &DocumentImageInventory, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(inventory)?);
        return Ok(());
    }
    for (index, image) in inventory.images.iter().enumerate() {
        let mut notes = Vec::new();
        if image.link {
            notes.push("linked".to_string());
        }
        if let Some(width) = image.width {
            notes.push(format!("width={width}"));
        }
        if image.convert && image.src.is_empty() {
            notes.push("unresolved".to_string());
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!(" [{}]", notes.join(", "))
        };
        println!(
            "{index}\t{}\t{}\t{}{notes}",
            image.hash,
            image.alt_text(),
            image.src
        );
    }
    Ok(())
}

fn run_session(
    cli: &Cli,
    index: usize,
    inventory: &DocumentImageInventory,
    resolver: VaultLinkResolver,
    config: ViewerConfig,
) -> Result<()> {
    if index >= inventory.len() {
        anyhow::bail!(
            "No image {index}: the note shows {} image(s)",
            inventory.len()
        );
    }

    let mut viewer = Viewer::new(
        RecordingTarget::new(),
        config,
        cli.window,
        Box::new(FsDocumentSource::new(cli.file.clone())),
        Box::new(resolver),
    );
    viewer = match &cli.copy_to {
        Some(path) => viewer.with_clipboard(Box::new(FileClipboard::new(path.clone()))),
        None => viewer.with_clipboard(Box::new(SystemClipboard::new())),
    };

    let target = viewer.target_mut();
    let body = target.create_element("div", None);
    let page: Vec<_> = inventory
        .images
        .iter()
        .map(|image| {
            let img = target.create_element("img", Some(body));
            target.set_attribute(img, "alt", image.alt_text());
            target.set_attribute(img, "src", &image.src);
            img
        })
        .collect();
    tracing::debug!(count = page.len(), index, "opening viewer");

    viewer.activate(page[index], &page);
    viewer.wait_for_probe();

    for token in &cli.keys {
        match parse_step(token)? {
            Step::Key(code, modifiers) => {
                for kind in [KeyEventKind::Press, KeyEventKind::Release] {
                    let key = KeyEvent::new_with_kind(code, modifiers, kind);
                    viewer.handle_event(&Event::Key(key));
                }
            }
            Step::Action(action) => viewer.send(Message::Toolbar(action)),
        }
        viewer.wait_for_probe();
    }

    let report = SessionReport::from_model(viewer.model());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_text();
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let config = file_flags.union(&cli_flags).resolve();

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }
    let document = FsDocumentSource::new(cli.file.clone())
        .load()
        .context("Failed to load note")?;
    let vault = cli.vault.clone().unwrap_or_else(|| {
        cli.file
            .parent()
            .map(PathBuf::from)
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let resolver = VaultLinkResolver::new(vault);
    let inventory = build_inventory(&document, &resolver, SystemClock.now_ms());

    match cli.open {
        Some(index) => run_session(&cli, index, &inventory, resolver, config),
        None => print_inventory(&inventory, cli.json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window("800x600"), Ok(WindowSize::new(800.0, 600.0)));
        assert!(parse_window("800").is_err());
        assert!(parse_window("axb").is_err());
    }

    #[test]
    fn test_parse_step_keys_and_actions() {
        assert_eq!(
            parse_step("ctrl+right").unwrap(),
            Step::Key(KeyCode::Right, KeyModifiers::CONTROL)
        );
        assert_eq!(
            parse_step("esc").unwrap(),
            Step::Key(KeyCode::Esc, KeyModifiers::NONE)
        );
        assert_eq!(
            parse_step("zoom_in").unwrap(),
            Step::Action(ToolbarAction::ZoomIn)
        );
        assert!(parse_step("hyper+left").is_err());
        assert!(parse_step("enter").is_err());
    }
}
