//! Flashcard parsing and the deck cursor.
//!
//! Models asked for "strictly valid JSON" still wrap it in code fences or
//! prose often enough that a strict parse alone isn't usable. The parser
//! tries the whole text first, then the outermost `[ { … } ]` it can find.

use std::sync::LazyLock;

use pagelens_core::Flashcard;
use regex::Regex;
use tracing::debug;

use crate::error::StructuredOutputError;

static CARD_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").unwrap());

/// Parse a model response into flashcards.
///
/// Fails with [`StructuredOutputError::Malformed`] when no JSON array of
/// objects can be recovered and [`StructuredOutputError::Empty`] when the
/// array has no cards.
pub fn parse_flashcards(raw: &str) -> Result<Vec<Flashcard>, StructuredOutputError> {
    let cards = match serde_json::from_str::<Vec<Flashcard>>(raw.trim()) {
        Ok(cards) => cards,
        Err(strict) => {
            debug!(error = %strict, "Strict flashcard parse failed, trying lenient extraction");
            let candidate = CARD_ARRAY
                .find(raw)
                .ok_or_else(|| StructuredOutputError::Malformed {
                    detail: strict.to_string(),
                })?;
            serde_json::from_str::<Vec<Flashcard>>(candidate.as_str()).map_err(|e| {
                StructuredOutputError::Malformed {
                    detail: e.to_string(),
                }
            })?
        }
    };

    if cards.is_empty() {
        return Err(StructuredOutputError::Empty);
    }
    Ok(cards)
}

// ─────────────────────────────────────────────
// Deck
// ─────────────────────────────────────────────

/// A non-empty list of cards with a cursor and a flipped flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Flashcard>,
    cursor: usize,
    flipped: bool,
}

impl Deck {
    /// `None` for an empty list.
    pub fn new(cards: Vec<Flashcard>) -> Option<Self> {
        if cards.is_empty() {
            return None;
        }
        Some(Deck {
            cards,
            cursor: 0,
            flipped: false,
        })
    }

    pub fn current(&self) -> &Flashcard {
        &self.cards[self.cursor]
    }

    /// Question text, or `Q <n>` when the model left it blank.
    pub fn display_question(&self) -> String {
        let question = self.current().question.trim();
        if question.is_empty() {
            format!("Q {}", self.cursor + 1)
        } else {
            question.to_string()
        }
    }

    /// Zero-based cursor.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn can_previous(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_next(&self) -> bool {
        self.cursor + 1 < self.cards.len()
    }

    /// Advance; returns false at the last card. Shows the question side.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.cursor += 1;
        self.flipped = false;
        true
    }

    /// Step back; returns false at the first card. Shows the question side.
    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.cursor -= 1;
        self.flipped = false;
        true
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// `"2 / 5"`.
    pub fn indicator(&self) -> String {
        format!("{} / {}", self.cursor + 1, self.cards.len())
    }
}
