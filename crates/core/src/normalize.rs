use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Serialize;

use crate::feed::{ContentKind, FeedEntry};

/// Minimum cleaned length, in characters, for an entry to count as a sample.
pub const DEFAULT_MIN_SAMPLE_CHARS: usize = 40;

const BLOCK_ELEMENTS: [&str; 27] = [
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "ul",
    "ol",
    "dl",
    "dt",
    "dd",
    "blockquote",
    "pre",
    "table",
    "tr",
    "td",
    "th",
    "section",
    "article",
    "aside",
    "header",
    "footer",
    "figcaption",
    "hr",
];

const NON_PROSE_ELEMENTS: [&str; 8] = ["script", "style", "noscript", "iframe", "svg", "button", "form", "figure"];

const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

static WIDGET_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(subscription-widget|subscribe-widget|share-dialog|button-wrapper|footnote-anchor|image-link-expand|post-ufi)")
        .expect("widget class pattern")
});

static BOILERPLATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(subscribe( now)?|share|share this post|leave a comment|upgrade to paid|give a gift subscription|listen now|read more|continue reading.*|thanks for reading\b.*\bsubscribe\b.*)$",
    )
    .expect("boilerplate line pattern")
});

/// Configuration for turning entry bodies into plain-text samples.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Entries whose cleaned text is shorter than this (in characters) are dropped.
    pub min_chars: usize,
    /// Remove embeds, widgets, and call-to-action lines before extraction.
    pub strip_boilerplate: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self { min_chars: DEFAULT_MIN_SAMPLE_CHARS, strip_boilerplate: true }
    }
}

/// A feed entry reduced to plain, readable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanEntry {
    pub position: usize,
    pub title: String,
    /// Markup-free text; paragraphs separated by single newlines.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl CleanEntry {
    /// Length of the text in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Cleans one entry with the default configuration.
pub fn normalize(entry: &FeedEntry) -> CleanEntry {
    normalize_with_config(entry, &NormalizeConfig::default())
}

/// Cleans one entry. Never drops it; see [`normalize_entries`] for filtering.
pub fn normalize_with_config(entry: &FeedEntry, config: &NormalizeConfig) -> CleanEntry {
    let title = content_to_text(&entry.title, entry.title_kind, false).lines().collect::<Vec<_>>().join(" ");
    let text = content_to_text(&entry.raw_body, entry.body_kind, config.strip_boilerplate);

    CleanEntry { position: entry.position, title, text, link: entry.link.clone() }
}

/// Cleans every entry in feed order, omitting those below `min_chars`.
pub fn normalize_entries(entries: &[FeedEntry], config: &NormalizeConfig) -> Vec<CleanEntry> {
    entries
        .iter()
        .map(|entry| normalize_with_config(entry, config))
        .filter(|clean| {
            let keep = clean.char_count() >= config.min_chars.max(1);
            if !keep {
                tracing::debug!(
                    position = clean.position,
                    title = %clean.title,
                    chars = clean.char_count(),
                    "dropping short entry"
                );
            }
            keep
        })
        .collect()
}

fn content_to_text(content: &str, kind: ContentKind, strip_boilerplate: bool) -> String {
    match kind {
        ContentKind::Html => html_to_text(content, strip_boilerplate),
        ContentKind::Text => plain_to_text(content, strip_boilerplate),
    }
}

/// Tidies text that is already plain: no markup parsing or entity decoding,
/// only whitespace collapse, blank-line squeeze, and boilerplate lines.
pub fn plain_to_text(text: &str, strip_boilerplate: bool) -> String {
    tidy_lines(text, strip_boilerplate)
}

/// Converts an HTML fragment into plain text.
///
/// Block elements become line boundaries, `<br>` becomes a newline, character
/// references are decoded, whitespace inside a line collapses to one space, and
/// runs of blank lines collapse to at most one.
pub fn html_to_text(html: &str, strip_boilerplate: bool) -> String {
    let html = if strip_boilerplate { remove_boilerplate_elements(html) } else { html.to_string() };

    let fragment = Html::parse_fragment(&html);
    let mut raw = String::new();
    collect_text(fragment.root_element(), &mut raw);

    tidy_lines(&raw, strip_boilerplate)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            push_inline_text(out, text);
            continue;
        }

        let Some(child_element) = ElementRef::wrap(child) else {
            continue;
        };

        let tag = child_element.value().name().to_lowercase();
        if SKIPPED_ELEMENTS.contains(&tag.as_str()) {
            continue;
        }

        if tag == "br" {
            out.push('\n');
            continue;
        }

        let is_block = BLOCK_ELEMENTS.contains(&tag.as_str());
        if is_block {
            end_line(out);
        }
        collect_text(child_element, out);
        if is_block {
            end_line(out);
        }
    }
}

/// Appends a text node, treating its internal newlines as ordinary spaces.
fn push_inline_text(out: &mut String, text: &str) {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
            }
            in_space = true;
        } else {
            collapsed.push(ch);
            in_space = false;
        }
    }

    if out.is_empty() || out.ends_with('\n') {
        out.push_str(collapsed.trim_start());
    } else {
        out.push_str(&collapsed);
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn tidy_lines(raw: &str, strip_boilerplate: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in raw.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");

        if strip_boilerplate && BOILERPLATE_LINE.is_match(&collapsed) {
            continue;
        }

        if collapsed.is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
            continue;
        }

        lines.push(collapsed);
    }

    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Removes non-prose elements and newsletter widgets from an HTML fragment.
fn remove_boilerplate_elements(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: NON_PROSE_ELEMENTS
                .iter()
                .map(|tag| {
                    lol_html::element!(*tag, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .chain(std::iter::once(lol_html::element!("[class]", |el| {
                    if let Some(class) = el.get_attribute("class")
                        && WIDGET_CLASS.is_match(&class)
                    {
                        el.remove();
                    }
                    Ok(())
                })))
                .collect(),
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    output
}
