//! Excerpt matching: a pure function from text nodes to edits.
//!
//! Nothing here touches a document. [`plan_highlights`] takes the page's text
//! nodes in document order and returns, per node, either `Unchanged` or the
//! pieces the node splits into. [`PageDocument`](crate::PageDocument) applies
//! the plan.
//!
//! Rules:
//! - excerpts are processed in input order;
//! - each excerpt marks its first case-insensitive occurrence inside a single
//!   node and stops, no further occurrences and no fuzzy matching;
//! - text already inside a marker is never matched again;
//! - an excerpt with no occurrence is recorded as unmatched, not an error.

use serde::Serialize;

/// Position of a text node in its document.
pub type NodeId = usize;

/// One text node, as handed to the planner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextNode {
    pub id: NodeId,
    pub text: String,
}

impl TextNode {
    pub fn new(id: NodeId, text: impl Into<String>) -> Self {
        TextNode {
            id,
            text: text.into(),
        }
    }
}

/// A piece of a split node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Index of the excerpt this piece highlights; `None` for plain text.
    pub marker: Option<usize>,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Segment {
            text: text.to_string(),
            marker: None,
        }
    }

    fn marked(text: &str, excerpt: usize) -> Self {
        Segment {
            text: text.to_string(),
            marker: Some(excerpt),
        }
    }

    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }
}

/// What happens to one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeEdit {
    Unchanged,
    /// Replace the node with these pieces; their texts concatenate to the
    /// node's original text.
    Split(Vec<Segment>),
}

/// Per-excerpt result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExcerptOutcome {
    pub excerpt: String,
    pub matched: bool,
    /// Node holding the marker, when matched.
    #[serde(skip)]
    pub node: Option<NodeId>,
}

/// Output of [`plan_highlights`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightPlan {
    /// One entry per input node, same order.
    pub edits: Vec<(NodeId, NodeEdit)>,
    /// One entry per excerpt, same order.
    pub outcomes: Vec<ExcerptOutcome>,
}

impl HighlightPlan {
    /// First node, in document order, that received a marker.
    pub fn first_marked_node(&self) -> Option<NodeId> {
        self.edits.iter().find_map(|(id, edit)| match edit {
            NodeEdit::Split(segments) if segments.iter().any(Segment::is_marked) => Some(*id),
            _ => None,
        })
    }

    pub fn matched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.matched).count()
    }
}

/// What a highlight pass reports back to the popup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HighlightReport {
    pub outcomes: Vec<ExcerptOutcome>,
    /// Marker to scroll into view: the first one in document order.
    #[serde(skip)]
    pub scroll_target: Option<NodeId>,
}

impl HighlightReport {
    pub fn matched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.matched).count()
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| !o.matched)
            .map(|o| o.excerpt.as_str())
    }
}

impl From<HighlightPlan> for HighlightReport {
    fn from(plan: HighlightPlan) -> Self {
        HighlightReport {
            scroll_target: plan.first_marked_node(),
            outcomes: plan.outcomes,
        }
    }
}

/// Plan highlight edits for `excerpts` over `nodes`.
pub fn plan_highlights(nodes: &[TextNode], excerpts: &[String]) -> HighlightPlan {
    let mut working: Vec<Vec<Segment>> = nodes
        .iter()
        .map(|n| vec![Segment::plain(&n.text)])
        .collect();

    let outcomes = excerpts
        .iter()
        .enumerate()
        .map(|(index, excerpt)| {
            let node = mark_first(nodes, &mut working, excerpt, index);
            ExcerptOutcome {
                excerpt: excerpt.clone(),
                matched: node.is_some(),
                node,
            }
        })
        .collect();

    let edits = nodes
        .iter()
        .zip(working)
        .map(|(node, segments)| {
            let edit = if segments.len() == 1 && !segments[0].is_marked() {
                NodeEdit::Unchanged
            } else {
                NodeEdit::Split(segments)
            };
            (node.id, edit)
        })
        .collect();

    HighlightPlan { edits, outcomes }
}

/// Mark the first unmarked occurrence of `excerpt`; returns the node it
/// landed in.
fn mark_first(
    nodes: &[TextNode],
    working: &mut [Vec<Segment>],
    excerpt: &str,
    index: usize,
) -> Option<NodeId> {
    for (node, segments) in nodes.iter().zip(working.iter_mut()) {
        for pos in 0..segments.len() {
            if segments[pos].is_marked() {
                continue;
            }
            let Some((start, end)) = find_ignore_case(&segments[pos].text, excerpt) else {
                continue;
            };

            let text = std::mem::take(&mut segments[pos].text);
            let mut pieces = Vec::with_capacity(3);
            if start > 0 {
                pieces.push(Segment::plain(&text[..start]));
            }
            pieces.push(Segment::marked(&text[start..end], index));
            if end < text.len() {
                pieces.push(Segment::plain(&text[end..]));
            }
            segments.splice(pos..=pos, pieces);
            return Some(node.id);
        }
    }
    None
}

/// Byte range of the first case-insensitive occurrence of `needle`.
///
/// Folding is per character, so the range always lands on char boundaries
/// of `haystack` even when lowercasing changes a character's length.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let folded: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if folded.is_empty() {
        return None;
    }
    haystack
        .char_indices()
        .find_map(|(start, _)| match_len(&haystack[start..], &folded).map(|len| (start, start + len)))
}

/// Length in bytes of the prefix of `rest` that folds to `folded`.
fn match_len(rest: &str, folded: &[char]) -> Option<usize> {
    let mut want = folded.iter();
    let mut next = want.next();
    for (offset, ch) in rest.char_indices() {
        for lower in ch.to_lowercase() {
            match next {
                Some(&w) if w == lower => next = want.next(),
                _ => return None,
            }
        }
        if next.is_none() {
            return Some(offset + ch.len_utf8());
        }
    }
    None
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
