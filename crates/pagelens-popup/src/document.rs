//! Page document: markup chunks and text nodes, plus the highlight adapter.
//!
//! `PageDocument::parse` is a tolerant single-pass tokenizer, not a full HTML
//! parser: it only needs to tell markup from text, keep `<script>`/`<style>`
//! bodies out of the text nodes, and know which tags break lines so the
//! visible text reads like the rendered page.
//!
//! A text node keeps its original text forever. Highlighting stores the split
//! pieces next to it, so clearing highlights restores the node exactly.

use tracing::debug;

use crate::highlight::{plan_highlights, HighlightPlan, HighlightReport, NodeEdit, NodeId, Segment, TextNode};
use crate::render::escape_html;

/// CSS class on every highlight marker.
pub const HIGHLIGHT_CLASS: &str = "pagelens-highlight";

/// `id` of the marker the page should scroll to.
pub const SCROLL_TARGET_ID: &str = "pagelens-first-highlight";

const HIGHLIGHT_STYLE: &str = "background:#fff176;padding:2px 2px;border-radius:3px";

/// Tags whose text content is never visible.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Tags that start a new line in the rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

#[derive(Clone, Debug, PartialEq)]
enum Chunk {
    /// Tags, comments, and raw-text bodies, emitted verbatim.
    Markup { raw: String, breaks_line: bool },
    Text(TextChunk),
}

#[derive(Clone, Debug, PartialEq)]
struct TextChunk {
    /// Source form (entities still encoded).
    raw: String,
    /// Decoded text, i.e. the node's value.
    text: String,
    /// False inside `<head>`.
    visible: bool,
    /// Present while the node is highlighted.
    segments: Option<Vec<Segment>>,
}

/// A parsed page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageDocument {
    chunks: Vec<Chunk>,
    scroll_target: Option<NodeId>,
}

impl PageDocument {
    /// Tokenize an HTML string.
    pub fn parse(html: &str) -> Self {
        let mut chunks = Vec::new();
        let mut in_head = false;
        let mut rest = html;

        while !rest.is_empty() {
            let Some(open) = rest.find('<') else {
                push_text(&mut chunks, rest, !in_head);
                break;
            };
            if open > 0 {
                push_text(&mut chunks, &rest[..open], !in_head);
                rest = &rest[open..];
                continue;
            }

            // Comments and doctype.
            if rest.starts_with("<!--") {
                let end = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
                push_markup(&mut chunks, &rest[..end], false);
                rest = &rest[end..];
                continue;
            }

            let Some(close) = rest.find('>') else {
                // Unterminated `<` is literal text.
                push_text(&mut chunks, rest, !in_head);
                break;
            };
            let tag = &rest[..=close];
            let name = tag_name(tag);
            rest = &rest[close + 1..];

            if name.is_empty() {
                if tag.starts_with("<!") || tag.starts_with("<?") {
                    push_markup(&mut chunks, tag, false);
                } else {
                    push_text(&mut chunks, tag, !in_head);
                }
                continue;
            }

            match name.as_str() {
                "head" => in_head = true,
                "/head" | "body" => in_head = false,
                _ => {}
            }

            let bare = name.trim_start_matches('/');
            push_markup(&mut chunks, tag, BLOCK_TAGS.contains(&bare));

            if RAW_TEXT_TAGS.contains(&name.as_str()) && !tag.ends_with("/>") {
                let end = find_closing(rest, &name).unwrap_or(rest.len());
                if end > 0 {
                    push_markup(&mut chunks, &rest[..end], false);
                }
                rest = &rest[end..];
            }
        }

        PageDocument {
            chunks,
            scroll_target: None,
        }
    }

    /// Visible text nodes in document order, as the planner sees them.
    pub fn text_nodes(&self) -> Vec<TextNode> {
        self.chunks
            .iter()
            .enumerate()
            .filter_map(|(id, chunk)| match chunk {
                Chunk::Text(t) if t.visible => Some(TextNode::new(id, t.text.clone())),
                _ => None,
            })
            .collect()
    }

    /// The page's visible text: what the page-text collaborator returns.
    ///
    /// Block tags become line breaks; runs of spaces and blank lines collapse.
    pub fn visible_text(&self) -> String {
        let mut raw = String::new();
        for chunk in &self.chunks {
            match chunk {
                Chunk::Text(t) if t.visible => raw.push_str(&t.text),
                Chunk::Markup {
                    breaks_line: true, ..
                } => raw.push('\n'),
                _ => {}
            }
        }
        collapse_whitespace(&raw)
    }

    /// Concatenated text of every visible node, highlighted or not.
    pub fn text_content(&self) -> String {
        self.chunks
            .iter()
            .filter_map(|chunk| match chunk {
                Chunk::Text(t) if t.visible => Some(match &t.segments {
                    Some(segments) => segments.iter().map(|s| s.text.as_str()).collect(),
                    None => t.text.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Remove all markers, then match `excerpts` and apply the result.
    pub fn highlight(&mut self, excerpts: &[String]) -> HighlightReport {
        let removed = self.clear_highlights();
        if removed > 0 {
            debug!(removed, "Cleared previous highlights");
        }

        let plan = plan_highlights(&self.text_nodes(), excerpts);
        self.apply(&plan);

        let report = HighlightReport::from(plan);
        debug!(
            excerpts = excerpts.len(),
            matched = report.matched_count(),
            "Highlight pass complete"
        );
        report
    }

    /// Apply a plan produced from this document's [`text_nodes`](Self::text_nodes).
    ///
    /// Edits naming a node that isn't a text node are ignored.
    pub fn apply(&mut self, plan: &HighlightPlan) {
        for (id, edit) in &plan.edits {
            if let (Some(Chunk::Text(t)), NodeEdit::Split(segments)) = (self.chunks.get_mut(*id), edit) {
                t.segments = Some(segments.clone());
            }
        }
        self.scroll_target = plan.first_marked_node();
    }

    /// Restore every highlighted node to its original text. Returns the
    /// number of markers removed.
    pub fn clear_highlights(&mut self) -> usize {
        let mut removed = 0;
        for chunk in &mut self.chunks {
            if let Chunk::Text(t) = chunk {
                if let Some(segments) = t.segments.take() {
                    removed += segments.iter().filter(|s| s.is_marked()).count();
                }
            }
        }
        self.scroll_target = None;
        removed
    }

    /// Number of markers currently applied.
    pub fn marker_count(&self) -> usize {
        self.chunks
            .iter()
            .map(|chunk| match chunk {
                Chunk::Text(TextChunk {
                    segments: Some(segments),
                    ..
                }) => segments.iter().filter(|s| s.is_marked()).count(),
                _ => 0,
            })
            .sum()
    }

    /// Node the view should scroll to after the last highlight pass.
    pub fn scroll_target(&self) -> Option<NodeId> {
        self.scroll_target
    }

    /// Serialize back to HTML with markers as styled `<span>`s.
    ///
    /// Untouched chunks are emitted exactly as parsed.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for (id, chunk) in self.chunks.iter().enumerate() {
            match chunk {
                Chunk::Markup { raw, .. } => out.push_str(raw),
                Chunk::Text(TextChunk {
                    raw,
                    segments: None,
                    ..
                }) => out.push_str(raw),
                Chunk::Text(TextChunk {
                    segments: Some(segments),
                    ..
                }) => {
                    let mut target = self.scroll_target == Some(id);
                    for segment in segments {
                        match segment.marker {
                            None => out.push_str(&escape_html(&segment.text)),
                            Some(excerpt) => {
                                let id_attr = if target {
                                    target = false;
                                    format!(" id=\"{SCROLL_TARGET_ID}\"")
                                } else {
                                    String::new()
                                };
                                out.push_str(&format!(
                                    "<span class=\"{HIGHLIGHT_CLASS}\"{id_attr} data-excerpt=\"{excerpt}\" style=\"{HIGHLIGHT_STYLE}\">{}</span>",
                                    escape_html(&segment.text)
                                ));
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

// ─────────────────────────────────────────────
// Tokenizer helpers
// ─────────────────────────────────────────────

fn push_text(chunks: &mut Vec<Chunk>, raw: &str, visible: bool) {
    chunks.push(Chunk::Text(TextChunk {
        raw: raw.to_string(),
        text: decode_entities(raw),
        visible,
        segments: None,
    }));
}

fn push_markup(chunks: &mut Vec<Chunk>, raw: &str, breaks_line: bool) {
    chunks.push(Chunk::Markup {
        raw: raw.to_string(),
        breaks_line,
    });
}

/// Lowercase tag name including a leading `/` for end tags; empty when the
/// `<` doesn't start a tag.
fn tag_name(tag: &str) -> String {
    let inner = tag.trim_start_matches('<');
    let (slash, inner) = match inner.strip_prefix('/') {
        Some(rest) => ("/", rest),
        None => ("", inner),
    };
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    if name.is_empty() || !inner.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return String::new();
    }
    format!("{slash}{name}")
}

/// Byte offset of `</name` in `rest`, case-insensitively.
fn find_closing(rest: &str, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    rest.to_ascii_lowercase().find(&needle)
}

/// Decode the entities pages actually use; unknown ones stay literal.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Collapse spaces within lines and drop blank lines.
///
/// Only ASCII whitespace collapses. `&nbsp;` stays U+00A0 so excerpts copied
/// from this text still match their text node.
fn collapse_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            line.split(|c: char| c.is_ascii_whitespace())
                .filter(|word| !word.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
