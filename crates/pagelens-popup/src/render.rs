//! HTML for the popup's result area.
//!
//! `markdown_to_html` covers the markdown subset the summary and search
//! prompts ask for:
//! - `**bold**` → `<strong>`, `*italic*` → `<em>`
//! - `*` / `-` bullet lines → `<ul><li>`
//! - blank-line separated paragraphs → `<p>`
//! - `` `code` `` → `<code>`, `[text](url)` → `<a>` for http(s) and mailto links
//! - `#` headings → stripped to plain paragraphs
//!
//! Input is escaped before any tag is introduced.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::controller::{ResultView, UiState};
use crate::flashcards::Deck;

pub const NO_EXCERPTS_MESSAGE: &str = "No highlighted excerpts returned by the model.";

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*]\s+(.*)$").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#{1,6}\s+(.*)$").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").unwrap());

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Convert model markdown to HTML.
pub fn markdown_to_html(text: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut items: Vec<String> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = BULLET.captures(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            items.push(caps[1].trim().to_string());
        } else if line.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            flush_list(&mut items, &mut blocks);
        } else {
            flush_list(&mut items, &mut blocks);
            let line = match HEADING.captures(line) {
                Some(caps) => caps[1].trim().to_string(),
                None => line.trim().to_string(),
            };
            paragraph.push(line);
        }
    }
    flush_paragraph(&mut paragraph, &mut blocks);
    flush_list(&mut items, &mut blocks);

    blocks.join("\n")
}

fn flush_paragraph(lines: &mut Vec<String>, blocks: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    blocks.push(format!("<p>{}</p>", inline(&lines.join("\n"))));
    lines.clear();
}

fn flush_list(items: &mut Vec<String>, blocks: &mut Vec<String>) {
    if items.is_empty() {
        return;
    }
    let body: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", inline(item)))
        .collect();
    blocks.push(format!("<ul>{body}</ul>"));
    items.clear();
}

/// Inline formatting for one block.
fn inline(text: &str) -> String {
    // Protect code spans from the other rules.
    let mut codes: Vec<String> = Vec::new();
    let text = INLINE_CODE.replace_all(text, |caps: &Captures| {
        let idx = codes.len();
        codes.push(caps[1].to_string());
        format!("\x00IC{idx}\x00")
    });

    let text = escape_html(&text);
    let text = LINK.replace_all(&text, |caps: &Captures| {
        if is_safe_href(&caps[2]) {
            format!(r#"<a href="{}">{}</a>"#, &caps[2], &caps[1])
        } else {
            caps[1].to_string()
        }
    });
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");

    let mut text = text.into_owned();
    for (idx, code) in codes.iter().enumerate() {
        text = text.replace(
            &format!("\x00IC{idx}\x00"),
            &format!("<code>{}</code>", escape_html(code)),
        );
    }
    text
}

/// Only web and mail links become anchors.
fn is_safe_href(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    ["http://", "https://", "mailto:"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

/// The excerpt list shown after a key-info run.
pub fn highlights_html(excerpts: &[String]) -> String {
    let items: String = excerpts
        .iter()
        .map(|e| format!("<li>{}</li>", escape_html(e)))
        .collect();
    format!("<strong>Highlights:</strong><ul>{items}</ul>")
}

/// One card with its navigation controls.
pub fn deck_html(deck: &Deck) -> String {
    let face = if deck.is_flipped() {
        format!(
            "<div class=\"flashcard-face flashcard-back\"><p>{}</p></div>",
            escape_html(&deck.current().answer)
        )
    } else {
        format!(
            "<div class=\"flashcard-face flashcard-front\"><h3>{}</h3></div>",
            escape_html(&deck.display_question())
        )
    };
    let disabled = |enabled: bool| if enabled { "" } else { " disabled" };

    format!(
        "<div class=\"flashcard-view\"><div class=\"flashcard\">{face}</div>\
         <div class=\"flashcard-controls\">\
         <button class=\"btn-nav\" data-nav=\"previous\"{}>Previous</button>\
         <span class=\"card-indicator\">{}</span>\
         <button class=\"btn-nav\" data-nav=\"next\"{}>Next</button>\
         </div></div>",
        disabled(deck.can_previous()),
        deck.indicator(),
        disabled(deck.can_next()),
    )
}

/// HTML for a finished result.
pub fn render_view(view: &ResultView) -> String {
    match view {
        ResultView::Prose(text) => markdown_to_html(text),
        ResultView::Highlights { excerpts, .. } => highlights_html(excerpts),
        ResultView::NoExcerpts => format!("<p><strong>{NO_EXCERPTS_MESSAGE}</strong></p>"),
        ResultView::Flashcards(deck) => deck_html(deck),
    }
}

/// HTML for whatever the popup is showing. Idle renders nothing.
pub fn render_state(state: &UiState) -> String {
    match state {
        UiState::Idle => String::new(),
        UiState::Loading { .. } => "<div class=\"loader\"></div>".to_string(),
        UiState::Result(view) => render_view(view),
        UiState::Error(message) => format!("<p class=\"error\">{}</p>", escape_html(message)),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
