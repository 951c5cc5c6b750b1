//! PageLens popup: everything between a user action and what ends up on
//! screen.
//!
//! - **document** / **source**: the page model and where pages come from
//! - **highlight**: pure excerpt matching over text nodes
//! - **excerpts** / **flashcards**: lenient parsing of structured model output
//! - **background**: prompt building + dispatch, optionally on its own task
//! - **controller**: the idle/loading/result/error state machine
//! - **render**: HTML for prose, highlight lists, and the flashcard deck

pub mod background;
pub mod controller;
pub mod document;
pub mod error;
pub mod excerpts;
pub mod flashcards;
pub mod highlight;
pub mod render;
pub mod source;

pub use background::{Background, BackgroundHandle};
pub use controller::{Applied, Popup, PopupController, ResultView, Ticket, UiState};
pub use document::PageDocument;
pub use error::{PageError, StructuredOutputError};
pub use flashcards::Deck;
pub use highlight::{plan_highlights, HighlightPlan, HighlightReport};
pub use source::{Page, PageSource, StaticPageSource, UrlPageSource};
