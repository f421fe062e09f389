//! Embedded image extraction from raw markdown lines.
//!
//! Three embed syntaxes are recognised, each optionally wrapped in an outer
//! hyperlink:
//!
//! - bracket embeds: `![alt|width](src)`
//! - wiki embeds: `![[src|alt|width]]`
//! - HTML tags: `<img src=".." alt="..">`
//!
//! Lines inside fenced code blocks are skipped, and on lines carrying inline
//! code only the text outside the outermost back-ticks is scanned.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::is_image_path;
use super::types::ImageReference;

/// Scheme the host serves local files under.
pub const LOCAL_RESOURCE_SCHEME: &str = "app://local/";

/// Shortest remainder that can still hold an embed (`![](a)` plus one).
const MIN_MATCH_LEN: usize = 7;
/// Sources starting with this are block references, not images.
const BLOCK_REF_PREFIX: &str = "#^";
const FENCE: &str = "```";

static LINKED_BRACKET_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*(!\[(.*?)\]\((<[^>]*>|.*?)\))\s*\]\(.*?\)").expect("valid regex")
});
static BRACKET_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((<[^>]*>|.*?)\)").expect("valid regex"));
static LINKED_WIKI_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*(!\[\[(.*?)\]\])\s*\]\(.*?\)").expect("valid regex"));
static WIKI_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[(.*?)\]\]").expect("valid regex"));
static LINKED_IMG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\b.*?(<img\b.*?\bsrc\s*=\s*['"](.*?)['"].*?>).*?</a>"#)
        .expect("valid regex")
});
static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b.*?\bsrc\s*=\s*['"](.*?)['"].*?>"#).expect("valid regex")
});
static IMG_TAG_ALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\balt\s*=\s*['"](.*?)['"]"#).expect("valid regex"));
static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+\-.]+:/").expect("valid regex"));
static DRIVE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]:[\\/]").expect("valid regex"));

/// Grammar rules in priority order; earlier variants win ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rule {
    LinkedBracket,
    Bracket,
    LinkedWiki,
    Wiki,
    LinkedTag,
    Tag,
}

#[derive(Debug)]
struct Candidate {
    start: usize,
    end: usize,
    rule: Rule,
    reference: ImageReference,
}

/// Scan raw source text.
pub fn scan_source(source: &str) -> Vec<ImageReference> {
    let lines: Vec<&str> = source.lines().collect();
    scan_lines(&lines)
}

/// Scan raw document lines for embedded images, in document order.
///
/// Duplicates are kept: two identical embeds yield two equal references.
pub fn scan_lines<S: AsRef<str>>(lines: &[S]) -> Vec<ImageReference> {
    let mut images = Vec::new();
    let mut in_fence = false;

    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }
        if line.starts_with(FENCE) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        match outside_inline_code(line) {
            Some(segments) => {
                for segment in segments {
                    scan_text(segment, &mut images);
                }
            }
            None => scan_text(line, &mut images),
        }
    }

    tracing::debug!(lines = lines.len(), images = images.len(), "scanned document");
    images
}

/// Text before the first and after the last back-tick, when a line has at
/// least two back-ticks.
fn outside_inline_code(line: &str) -> Option<Vec<&str>> {
    let first = line.find('`')?;
    let last = line.rfind('`')?;
    if first == last {
        return None;
    }
    let mut segments = Vec::with_capacity(2);
    if first > 0 {
        segments.push(&line[..first]);
    }
    if last + 1 < line.len() {
        segments.push(&line[last + 1..]);
    }
    Some(segments)
}

fn scan_text(text: &str, images: &mut Vec<ImageReference>) {
    let mut rest = text;
    while let Some(candidate) = next_candidate(rest) {
        images.push(candidate.reference);
        rest = &rest[candidate.end..];
        if rest.len() < MIN_MATCH_LEN {
            break;
        }
    }
}

/// Earliest accepted embed in `text`, ties going to the higher-priority rule.
fn next_candidate(text: &str) -> Option<Candidate> {
    [
        first_accepted(&LINKED_BRACKET_EMBED, text, Rule::LinkedBracket, |caps| {
            bracket_reference(group(caps, 2), group(caps, 3), true)
        }),
        first_accepted(&BRACKET_EMBED, text, Rule::Bracket, |caps| {
            bracket_reference(group(caps, 1), group(caps, 2), false)
        }),
        first_accepted(&LINKED_WIKI_EMBED, text, Rule::LinkedWiki, |caps| {
            wiki_reference(group(caps, 2), true)
        }),
        first_accepted(&WIKI_EMBED, text, Rule::Wiki, |caps| {
            wiki_reference(group(caps, 1), false)
        }),
        first_accepted(&LINKED_IMG_TAG, text, Rule::LinkedTag, |caps| {
            tag_reference(group(caps, 1), group(caps, 2), true)
        }),
        first_accepted(&IMG_TAG, text, Rule::Tag, |caps| {
            tag_reference(group(caps, 0), group(caps, 1), false)
        }),
    ]
    .into_iter()
    .flatten()
    .min_by_key(|candidate| (candidate.start, candidate.rule))
}

/// First match of `re` that `build` accepts; rejected matches are retried one
/// character further on.
fn first_accepted(
    re: &Regex,
    text: &str,
    rule: Rule,
    build: impl Fn(&Captures<'_>) -> Option<ImageReference>,
) -> Option<Candidate> {
    let mut from = 0;
    while from < text.len() {
        let caps = re.captures_at(text, from)?;
        let whole = caps.get(0)?;
        if let Some(reference) = build(&caps) {
            return Some(Candidate {
                start: whole.start(),
                end: whole.end(),
                rule,
                reference,
            });
        }
        from = text[whole.start()..]
            .chars()
            .next()
            .map_or(text.len(), |c| whole.start() + c.len_utf8());
    }
    None
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

/// `![alt|alt2|width](src)`.
///
/// Only the first pipe segment becomes the alt text, matching how the page
/// renders it: `![cat|img](cat.png)` shows alt `cat`, and `![a|b|200](x.png)`
/// shows alt `a` at width 200. Middle segments are display hints and are
/// dropped.
fn bracket_reference(alt: &str, raw_src: &str, link: bool) -> Option<ImageReference> {
    if alt.contains('[') && alt.contains(']') {
        return None;
    }
    let src = clean_markdown_src(raw_src);
    if src.is_empty() || src.starts_with(BLOCK_REF_PREFIX) {
        return None;
    }
    let mut segments = alt.split('|');
    let display_alt = segments.next().unwrap_or_default().trim();
    let width = segments.next_back().and_then(parse_width);
    let source = normalize_source(src);
    Some(ImageReference::new(
        Some(display_alt.to_string()),
        source.src,
        link,
        source.name,
        source.convert,
        width,
    ))
}

/// `![[src|alt1|alt2|width]]`; wiki embeds always point into the vault.
fn wiki_reference(content: &str, link: bool) -> Option<ImageReference> {
    let mut segments = content.split('|');
    let src = segments.next().unwrap_or_default().trim();
    if src.is_empty() || src.starts_with(BLOCK_REF_PREFIX) || !is_image_path(src) {
        return None;
    }
    let rest: Vec<&str> = segments.collect();
    let (alt, width) = match rest.split_last() {
        None => (src.to_string(), None),
        Some((last, head)) => match parse_width(last) {
            Some(width) => (head.join("|"), Some(width)),
            None => (rest.join("|"), None),
        },
    };
    Some(ImageReference::new(
        Some(alt),
        src.to_string(),
        link,
        Some(file_name(src).to_string()),
        true,
        width,
    ))
}

/// `<img src=".." alt="..">`, optionally inside `<a>..</a>`.
fn tag_reference(tag: &str, raw_src: &str, link: bool) -> Option<ImageReference> {
    let src = raw_src.trim();
    if src.is_empty() {
        return None;
    }
    let alt = IMG_TAG_ALT
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    let source = normalize_source(src);
    Some(ImageReference::new(
        alt,
        source.src,
        link,
        source.name,
        source.convert,
        None,
    ))
}

fn parse_width(segment: &str) -> Option<u32> {
    let segment = segment.trim();
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Strip `<...>` wrapping and a trailing `"title"` from a markdown source.
fn clean_markdown_src(raw: &str) -> &str {
    let src = raw.trim();
    if let Some((inner, _)) = src.strip_prefix('<').and_then(|s| s.split_once('>')) {
        return inner.trim();
    }
    match src.find(" \"").or_else(|| src.find(" '")) {
        Some(idx) => src[..idx].trim_end(),
        None => src,
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[derive(Debug, PartialEq, Eq)]
struct NormalizedSource {
    src: String,
    convert: bool,
    name: Option<String>,
}

impl NormalizedSource {
    fn unchanged(src: &str) -> Self {
        Self {
            src: src.to_string(),
            convert: false,
            name: None,
        }
    }

    fn local(path: &str) -> Self {
        Self {
            src: format!("{LOCAL_RESOURCE_SCHEME}{}", path.trim_start_matches('/')),
            convert: false,
            name: None,
        }
    }
}

/// Map a raw source onto something the host can display, or mark it for
/// vault resolution.
fn normalize_source(src: &str) -> NormalizedSource {
    if let Some(rest) = src.strip_prefix("file:") {
        return NormalizedSource::local(rest);
    }
    if URL_SCHEME.is_match(src) {
        return NormalizedSource::unchanged(src);
    }
    if DRIVE_PATH.is_match(src) || (src.starts_with('/') && !src.starts_with("//")) {
        return NormalizedSource::local(src);
    }
    if is_image_path(src) {
        return NormalizedSource {
            src: src.to_string(),
            convert: true,
            name: Some(file_name(src).to_string()),
        };
    }
    NormalizedSource::unchanged(src)
}
