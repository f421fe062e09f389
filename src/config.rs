use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use crossterm::event::KeyModifiers;
use serde::Serialize;

/// Modifier combination that gates a keyboard action.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Hotkey {
    None,
    Ctrl,
    Alt,
    Shift,
    CtrlAlt,
    CtrlShift,
    ShiftAlt,
    CtrlShiftAlt,
}

impl Hotkey {
    pub const fn modifiers(self) -> KeyModifiers {
        match self {
            Self::None => KeyModifiers::NONE,
            Self::Ctrl => KeyModifiers::CONTROL,
            Self::Alt => KeyModifiers::ALT,
            Self::Shift => KeyModifiers::SHIFT,
            Self::CtrlAlt => KeyModifiers::CONTROL.union(KeyModifiers::ALT),
            Self::CtrlShift => KeyModifiers::CONTROL.union(KeyModifiers::SHIFT),
            Self::ShiftAlt => KeyModifiers::SHIFT.union(KeyModifiers::ALT),
            Self::CtrlShiftAlt => KeyModifiers::CONTROL
                .union(KeyModifiers::SHIFT)
                .union(KeyModifiers::ALT),
        }
    }

    /// True when exactly this combination of ctrl/alt/shift is held.
    pub fn matches(self, held: KeyModifiers) -> bool {
        let relevant = held & (KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT);
        relevant == self.modifiers()
    }
}

/// How the image is sized in full-screen mode.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FullScreenMode {
    #[default]
    Fit,
    Fill,
    Stretch,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderWidth {
    Thin,
    #[default]
    Medium,
    Thick,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    Dotted,
    Dashed,
    #[default]
    Solid,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

/// Border drawn around the activated image once the viewer closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBorder {
    pub width: BorderWidth,
    pub style: BorderStyle,
    pub color: String,
}

impl Default for ImageBorder {
    fn default() -> Self {
        Self {
            width: BorderWidth::default(),
            style: BorderStyle::default(),
            color: "red".to_string(),
        }
    }
}

impl ImageBorder {
    pub fn width_css(&self) -> String {
        value_name(self.width)
    }

    pub fn style_css(&self) -> String {
        value_name(self.style)
    }
}

/// Fully resolved viewer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewerConfig {
    pub include_linked_images: bool,
    pub move_hotkey: Hotkey,
    pub switch_hotkey: Hotkey,
    /// Pixels per arrow-key move
    pub move_speed: u32,
    pub full_screen_mode: FullScreenMode,
    pub cache_capacity: usize,
    /// Show the zoom percentage after fitting and zooming
    pub image_tip: bool,
    pub gallery: bool,
    pub border: Option<ImageBorder>,
}

pub const DEFAULT_MOVE_HOTKEY: Hotkey = Hotkey::None;
pub const DEFAULT_SWITCH_HOTKEY: Hotkey = Hotkey::Ctrl;
pub const DEFAULT_MOVE_SPEED: u32 = 10;

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            include_linked_images: true,
            move_hotkey: DEFAULT_MOVE_HOTKEY,
            switch_hotkey: DEFAULT_SWITCH_HOTKEY,
            move_speed: DEFAULT_MOVE_SPEED,
            full_screen_mode: FullScreenMode::Fit,
            cache_capacity: crate::image::DEFAULT_CAPACITY,
            image_tip: true,
            gallery: true,
            border: None,
        }
    }
}

impl ViewerConfig {
    /// Make the move and switch hotkeys differ.
    ///
    /// The move hotkey falls back to its default first; if it already is the
    /// default, the switch hotkey falls back instead. Returns whether
    /// anything changed.
    pub fn resolve_hotkey_conflict(&mut self) -> bool {
        if self.move_hotkey != self.switch_hotkey {
            return false;
        }
        let clashing = self.move_hotkey;
        if self.move_hotkey == DEFAULT_MOVE_HOTKEY {
            self.switch_hotkey = DEFAULT_SWITCH_HOTKEY;
        } else {
            self.move_hotkey = DEFAULT_MOVE_HOTKEY;
        }
        tracing::warn!(
            hotkey = %value_name(clashing),
            move_hotkey = %value_name(self.move_hotkey),
            switch_hotkey = %value_name(self.switch_hotkey),
            "move and switch hotkeys clashed; reset to defaults"
        );
        true
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_linked_images: bool,
    pub move_hotkey: Option<Hotkey>,
    pub switch_hotkey: Option<Hotkey>,
    pub move_speed: Option<u32>,
    pub full_screen: Option<FullScreenMode>,
    pub cache_capacity: Option<usize>,
    pub no_image_tip: bool,
    pub no_gallery: bool,
    pub border: bool,
    pub border_width: Option<BorderWidth>,
    pub border_style: Option<BorderStyle>,
    pub border_color: Option<String>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_linked_images: self.no_linked_images || other.no_linked_images,
            move_hotkey: other.move_hotkey.or(self.move_hotkey),
            switch_hotkey: other.switch_hotkey.or(self.switch_hotkey),
            move_speed: other.move_speed.or(self.move_speed),
            full_screen: other.full_screen.or(self.full_screen),
            cache_capacity: other.cache_capacity.or(self.cache_capacity),
            no_image_tip: self.no_image_tip || other.no_image_tip,
            no_gallery: self.no_gallery || other.no_gallery,
            border: self.border || other.border,
            border_width: other.border_width.or(self.border_width),
            border_style: other.border_style.or(self.border_style),
            border_color: other
                .border_color
                .clone()
                .or_else(|| self.border_color.clone()),
        }
    }

    /// Fill in defaults and settle hotkey conflicts.
    pub fn resolve(&self) -> ViewerConfig {
        let defaults = ViewerConfig::default();
        let border = self.border.then(|| {
            let fallback = ImageBorder::default();
            ImageBorder {
                width: self.border_width.unwrap_or(fallback.width),
                style: self.border_style.unwrap_or(fallback.style),
                color: self.border_color.clone().unwrap_or(fallback.color),
            }
        });
        let mut config = ViewerConfig {
            include_linked_images: !self.no_linked_images,
            move_hotkey: self.move_hotkey.unwrap_or(defaults.move_hotkey),
            switch_hotkey: self.switch_hotkey.unwrap_or(defaults.switch_hotkey),
            move_speed: self.move_speed.unwrap_or(defaults.move_speed),
            full_screen_mode: self.full_screen.unwrap_or(defaults.full_screen_mode),
            cache_capacity: self
                .cache_capacity
                .unwrap_or(defaults.cache_capacity)
                .max(1),
            image_tip: !self.no_image_tip,
            gallery: !self.no_gallery,
            border,
        };
        config.resolve_hotkey_conflict();
        config
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("lightbox").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("lightbox")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("lightbox").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("lightbox")
                .join("config");
        }
    }

    PathBuf::from(".lightboxrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".lightboxrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# lightbox defaults (saved with --save)".to_string());
    if flags.no_linked_images {
        lines.push("--no-linked-images".to_string());
    }
    if let Some(hotkey) = flags.move_hotkey {
        lines.push(format!("--move-hotkey {}", value_name(hotkey)));
    }
    if let Some(hotkey) = flags.switch_hotkey {
        lines.push(format!("--switch-hotkey {}", value_name(hotkey)));
    }
    if let Some(speed) = flags.move_speed {
        lines.push(format!("--move-speed {speed}"));
    }
    if let Some(mode) = flags.full_screen {
        lines.push(format!("--full-screen {}", value_name(mode)));
    }
    if let Some(capacity) = flags.cache_capacity {
        lines.push(format!("--cache-capacity {capacity}"));
    }
    if flags.no_image_tip {
        lines.push("--no-image-tip".to_string());
    }
    if flags.no_gallery {
        lines.push("--no-gallery".to_string());
    }
    if flags.border {
        lines.push("--border".to_string());
    }
    if let Some(width) = flags.border_width {
        lines.push(format!("--border-width {}", value_name(width)));
    }
    if let Some(style) = flags.border_style {
        lines.push(format!("--border-style {}", value_name(style)));
    }
    if let Some(color) = &flags.border_color {
        lines.push(format!("--border-color {color}"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--no-linked-images" {
            flags.no_linked_images = true;
        } else if token == "--no-image-tip" {
            flags.no_image_tip = true;
        } else if token == "--no-gallery" {
            flags.no_gallery = true;
        } else if token == "--border" {
            flags.border = true;
        } else if let Some(value) = flag_value(tokens, &mut i, "--move-hotkey") {
            flags.move_hotkey = parse_value(value);
        } else if let Some(value) = flag_value(tokens, &mut i, "--switch-hotkey") {
            flags.switch_hotkey = parse_value(value);
        } else if let Some(value) = flag_value(tokens, &mut i, "--move-speed") {
            flags.move_speed = value.parse().ok();
        } else if let Some(value) = flag_value(tokens, &mut i, "--full-screen") {
            flags.full_screen = parse_value(value);
        } else if let Some(value) = flag_value(tokens, &mut i, "--cache-capacity") {
            flags.cache_capacity = value.parse().ok();
        } else if let Some(value) = flag_value(tokens, &mut i, "--border-width") {
            flags.border_width = parse_value(value);
        } else if let Some(value) = flag_value(tokens, &mut i, "--border-style") {
            flags.border_style = parse_value(value);
        } else if let Some(value) = flag_value(tokens, &mut i, "--border-color") {
            flags.border_color = Some(value.to_string());
        }
        i += 1;
    }
    flags
}

/// Value of `name` given as `name value` or `name=value`.
fn flag_value<'a>(tokens: &'a [String], i: &mut usize, name: &str) -> Option<&'a str> {
    let token = tokens.get(*i)?;
    if token == name {
        let value = tokens.get(*i + 1)?;
        *i += 1;
        return Some(value);
    }
    token.strip_prefix(name)?.strip_prefix('=')
}

fn parse_value<T: ValueEnum>(s: &str) -> Option<T> {
    T::from_str(s, true).ok()
}

fn value_name<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "lightbox",
            "--no-linked-images",
            "--move-hotkey",
            "ctrl-alt",
            "--switch-hotkey=shift",
            "--move-speed",
            "25",
            "--full-screen=stretch",
            "--cache-capacity",
            "4",
            "--no-image-tip",
            "--border",
            "--border-style",
            "dashed",
            "notes.md",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.no_linked_images);
        assert_eq!(flags.move_hotkey, Some(Hotkey::CtrlAlt));
        assert_eq!(flags.switch_hotkey, Some(Hotkey::Shift));
        assert_eq!(flags.move_speed, Some(25));
        assert_eq!(flags.full_screen, Some(FullScreenMode::Stretch));
        assert_eq!(flags.cache_capacity, Some(4));
        assert!(flags.no_image_tip);
        assert!(!flags.no_gallery);
        assert!(flags.border);
        assert_eq!(flags.border_style, Some(BorderStyle::Dashed));
    }

    #[test]
    fn test_unknown_values_are_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--move-hotkey", "meta", "--move-speed=fast"]));
        assert_eq!(flags.move_hotkey, None);
        assert_eq!(flags.move_speed, None);
    }

    #[test]
    fn test_defaults() {
        let config = ConfigFlags::default().resolve();
        assert!(config.include_linked_images);
        assert_eq!(config.move_hotkey, Hotkey::None);
        assert_eq!(config.switch_hotkey, Hotkey::Ctrl);
        assert_eq!(config.move_speed, 10);
        assert_eq!(config.full_screen_mode, FullScreenMode::Fit);
        assert_eq!(config.cache_capacity, 10);
        assert!(config.image_tip);
        assert!(config.gallery);
        assert_eq!(config.border, None);
    }

    #[test]
    fn test_border_defaults_when_enabled() {
        let flags = ConfigFlags {
            border: true,
            border_color: Some("#00ff00".to_string()),
            ..ConfigFlags::default()
        };
        let border = flags.resolve().border.unwrap();
        assert_eq!(border.width_css(), "medium");
        assert_eq!(border.style_css(), "solid");
        assert_eq!(border.color, "#00ff00");
    }

    #[test]
    fn test_conflict_resets_move_hotkey() {
        let flags = ConfigFlags {
            move_hotkey: Some(Hotkey::Alt),
            switch_hotkey: Some(Hotkey::Alt),
            ..ConfigFlags::default()
        };
        let config = flags.resolve();
        assert_eq!(config.move_hotkey, Hotkey::None);
        assert_eq!(config.switch_hotkey, Hotkey::Alt);
    }

    #[test]
    fn test_conflict_on_default_move_resets_switch_hotkey() {
        let flags = ConfigFlags {
            switch_hotkey: Some(Hotkey::None),
            ..ConfigFlags::default()
        };
        let config = flags.resolve();
        assert_eq!(config.move_hotkey, Hotkey::None);
        assert_eq!(config.switch_hotkey, Hotkey::Ctrl);
    }

    #[test]
    fn test_hotkey_matching_is_exact() {
        assert!(Hotkey::None.matches(KeyModifiers::NONE));
        assert!(!Hotkey::None.matches(KeyModifiers::CONTROL));
        assert!(Hotkey::Ctrl.matches(KeyModifiers::CONTROL));
        assert!(!Hotkey::Ctrl.matches(KeyModifiers::CONTROL | KeyModifiers::SHIFT));
        assert!(Hotkey::CtrlShiftAlt.matches(
            KeyModifiers::CONTROL | KeyModifiers::SHIFT | KeyModifiers::ALT
        ));
        assert!(Hotkey::Shift.matches(KeyModifiers::SHIFT | KeyModifiers::SUPER));
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            no_gallery: true,
            move_speed: Some(5),
            full_screen: Some(FullScreenMode::Fill),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            border: true,
            move_speed: Some(30),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.no_gallery);
        assert!(merged.border);
        assert_eq!(merged.move_speed, Some(30));
        assert_eq!(merged.full_screen, Some(FullScreenMode::Fill));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".lightboxrc");
        let flags = ConfigFlags {
            no_linked_images: true,
            move_hotkey: Some(Hotkey::ShiftAlt),
            switch_hotkey: Some(Hotkey::CtrlShift),
            move_speed: Some(12),
            full_screen: Some(FullScreenMode::Fill),
            cache_capacity: Some(3),
            no_image_tip: true,
            no_gallery: true,
            border: true,
            border_width: Some(BorderWidth::Thick),
            border_style: Some(BorderStyle::Double),
            border_color: Some("blue".to_string()),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }
}
