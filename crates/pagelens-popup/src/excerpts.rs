//! `<HIGHLIGHT>` span extraction from a key-info response.

use std::sync::LazyLock;

use regex::Regex;

static HIGHLIGHT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<HIGHLIGHT>(.*?)</HIGHLIGHT>").unwrap());

/// Every `<HIGHLIGHT>…</HIGHLIGHT>` body, in order, trimmed, empties dropped.
///
/// Tags match case-insensitively and may span lines. Text outside the tags
/// and unterminated tags are ignored. No cap is applied here; the prompt
/// asks for at most twelve.
pub fn extract_excerpts(raw: &str) -> Vec<String> {
    HIGHLIGHT_SPAN
        .captures_iter(raw)
        .map(|caps| caps[1].trim().to_string())
        .filter(|excerpt| !excerpt.is_empty())
        .collect()
}
