//! Popup state machine and the action driver.
//!
//! [`PopupController`] owns the one visible state. Every request gets a
//! [`Ticket`] stamped with a generation number; starting another request or
//! dismissing the popup bumps the generation, so a response that arrives for
//! an older ticket is dropped instead of overwriting newer state.
//!
//! [`Popup`] wires the controller to a page source and the background
//! service and runs one action end to end.

use std::sync::Arc;

use pagelens_core::{Action, NormalizedResponse, RequestEnvelope};
use tracing::{debug, info};

use crate::background::BackgroundHandle;
use crate::document::PageDocument;
use crate::error::StructuredOutputError;
use crate::excerpts::extract_excerpts;
use crate::flashcards::{parse_flashcards, Deck};
use crate::highlight::HighlightReport;
use crate::source::{Page, PageSource};

/// What the popup shows. Exactly one at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum UiState {
    Idle,
    Loading { action: Action },
    Result(ResultView),
    Error(String),
}

/// A finished result.
#[derive(Clone, Debug, PartialEq)]
pub enum ResultView {
    /// Summary or search answer, still markdown.
    Prose(String),
    /// Excerpts from a key-info run. `report` is absent when there was no
    /// page document to highlight.
    Highlights {
        excerpts: Vec<String>,
        report: Option<HighlightReport>,
    },
    /// Key-info run that produced no excerpts.
    NoExcerpts,
    Flashcards(Deck),
}

/// Identifies one in-flight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    action: Action,
}

impl Ticket {
    pub fn action(&self) -> Action {
        self.action
    }
}

/// Whether a completion changed the visible state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Rendered,
    /// The ticket was superseded; nothing changed.
    Stale,
}

pub struct PopupController {
    state: UiState,
    model: String,
    generation: u64,
}

impl PopupController {
    pub fn new(model: impl Into<String>) -> Self {
        PopupController {
            state: UiState::Idle,
            model: model.into(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model used for the next request. In-flight requests keep theirs.
    pub fn select_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        debug!(model = %self.model, "Model selected");
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, UiState::Loading { .. })
    }

    /// Enter `Loading` for `action`. Any earlier ticket becomes stale.
    pub fn begin(&mut self, action: Action) -> Ticket {
        self.generation += 1;
        self.state = UiState::Loading { action };
        Ticket {
            generation: self.generation,
            action,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation && self.is_loading()
    }

    /// Show `message` as the error for `ticket`.
    pub fn fail(&mut self, ticket: Ticket, message: impl Into<String>) -> Applied {
        if !self.is_current(&ticket) {
            debug!(action = %ticket.action, "Dropping stale failure");
            return Applied::Stale;
        }
        self.state = UiState::Error(message.into());
        Applied::Rendered
    }

    /// Turn the background's response for `ticket` into the visible state.
    ///
    /// Key-info excerpts are highlighted in `page` when one is given.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        response: NormalizedResponse,
        page: Option<&mut PageDocument>,
    ) -> Applied {
        if !self.is_current(&ticket) {
            debug!(action = %ticket.action, "Dropping stale response");
            return Applied::Stale;
        }

        self.state = match response.into_result() {
            Err(message) => UiState::Error(message),
            Ok(text) => match ticket.action {
                Action::Summary | Action::Search => UiState::Result(ResultView::Prose(text)),
                Action::KeyInfo => UiState::Result(key_info_view(&text, page)),
                Action::Analyze => match parse_flashcards(&text).map(Deck::new) {
                    Ok(Some(deck)) => UiState::Result(ResultView::Flashcards(deck)),
                    Ok(None) => UiState::Error(StructuredOutputError::Empty.to_string()),
                    Err(e) => {
                        debug!(error = ?e, "Unusable flashcard output");
                        UiState::Error(e.to_string())
                    }
                },
            },
        };
        Applied::Rendered
    }

    /// Back to `Idle` from anything. In-flight requests become stale.
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.state = UiState::Idle;
    }

    /// The deck, while flashcards are showing.
    pub fn deck_mut(&mut self) -> Option<&mut Deck> {
        match &mut self.state {
            UiState::Result(ResultView::Flashcards(deck)) => Some(deck),
            _ => None,
        }
    }
}

fn key_info_view(text: &str, page: Option<&mut PageDocument>) -> ResultView {
    let excerpts = extract_excerpts(text);
    if excerpts.is_empty() {
        return ResultView::NoExcerpts;
    }
    let report = page.map(|document| document.highlight(&excerpts));
    if let Some(report) = &report {
        info!(
            excerpts = excerpts.len(),
            matched = report.matched_count(),
            "Highlights applied"
        );
    }
    ResultView::Highlights { excerpts, report }
}

// ─────────────────────────────────────────────
// Popup
// ─────────────────────────────────────────────

/// Controller + page source + background service.
pub struct Popup {
    controller: PopupController,
    background: BackgroundHandle,
    source: Arc<dyn PageSource>,
    page: Option<Page>,
}

impl Popup {
    pub fn new(
        model: impl Into<String>,
        background: BackgroundHandle,
        source: Arc<dyn PageSource>,
    ) -> Self {
        Popup {
            controller: PopupController::new(model),
            background,
            source,
            page: None,
        }
    }

    pub fn state(&self) -> &UiState {
        self.controller.state()
    }

    pub fn controller(&self) -> &PopupController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PopupController {
        &mut self.controller
    }

    /// The page loaded by the last page-reading action.
    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Run `action` to completion.
    ///
    /// `input` is the query for [`Action::Search`] and ignored otherwise. A
    /// blank query does nothing. Page errors end in `Error` without a
    /// request being sent.
    pub async fn run(&mut self, action: Action, input: Option<&str>) -> &UiState {
        let query = input.unwrap_or_default().trim();
        if action == Action::Search && query.is_empty() {
            debug!("Ignoring blank search");
            return self.controller.state();
        }

        let ticket = self.controller.begin(action);

        let payload = if action.reads_page() {
            match self.source.load().await {
                Ok(page) => {
                    let text = page.text();
                    self.page = Some(page);
                    text
                }
                Err(e) => {
                    info!(action = %action, error = ?e, "Page unavailable");
                    self.page = None;
                    self.controller.fail(ticket, e.to_string());
                    return self.controller.state();
                }
            }
        } else {
            query.to_string()
        };

        let request = RequestEnvelope::new(action, payload, self.controller.model());
        let response = self.background.send(request).await;

        let document = self.page.as_mut().map(|page| &mut page.document);
        self.controller.complete(ticket, response, document);
        self.controller.state()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Background;
    use crate::source::StaticPageSource;
    use pagelens_core::config::{Config, ProviderConfig};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARTICLE: &str = "<html><body>\
        <h1>Photosynthesis</h1>\
        <p>Plants convert light energy into chemical energy.</p>\
        <p>Chlorophyll absorbs mostly blue and red light.</p>\
        </body></html>";

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.providers.openai = ProviderConfig {
            api_key: "sk-test".into(),
            api_base: Some(server.uri()),
        };
        config.providers.gemini = ProviderConfig {
            api_key: "AIza-test".into(),
            api_base: Some(server.uri()),
        };
        config
    }

    fn popup(server: &MockServer, url: &str, model: &str) -> Popup {
        let (handle, _task) = Background::from_config(&config_for(server)).spawn(4);
        Popup::new(model, handle, Arc::new(StaticPageSource::new(url, ARTICLE)))
    }

    async fn openai_replying(content: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .mount(&server)
            .await;
        server
    }

    // ── controller ──

    #[test]
    fn test_begin_enters_loading() {
        let mut c = PopupController::new("gpt-4");
        let ticket = c.begin(Action::Summary);
        assert_eq!(c.state(), &UiState::Loading { action: Action::Summary });
        assert!(c.is_current(&ticket));
        assert_eq!(ticket.action(), Action::Summary);
    }

    #[test]
    fn test_newer_request_makes_older_stale() {
        let mut c = PopupController::new("gpt-4");
        let old = c.begin(Action::Summary);
        let new = c.begin(Action::Search);

        let applied = c.complete(old, NormalizedResponse::success("old answer"), None);
        assert_eq!(applied, Applied::Stale);
        assert_eq!(c.state(), &UiState::Loading { action: Action::Search });

        assert_eq!(
            c.complete(new, NormalizedResponse::success("new answer"), None),
            Applied::Rendered
        );
        assert_eq!(
            c.state(),
            &UiState::Result(ResultView::Prose("new answer".into()))
        );
    }

    #[test]
    fn test_dismiss_invalidates_in_flight() {
        let mut c = PopupController::new("gpt-4");
        let ticket = c.begin(Action::Analyze);
        c.dismiss();
        assert_eq!(c.state(), &UiState::Idle);
        assert_eq!(c.fail(ticket, "late"), Applied::Stale);
        assert_eq!(c.state(), &UiState::Idle);
    }

    #[test]
    fn test_completed_ticket_cannot_apply_twice() {
        let mut c = PopupController::new("gpt-4");
        let ticket = c.begin(Action::Search);
        c.complete(ticket, NormalizedResponse::success("first"), None);
        assert_eq!(
            c.complete(ticket, NormalizedResponse::success("second"), None),
            Applied::Stale
        );
        assert_eq!(c.state(), &UiState::Result(ResultView::Prose("first".into())));
    }

    #[test]
    fn test_failure_response_shows_message() {
        let mut c = PopupController::new("gpt-4");
        let ticket = c.begin(Action::Summary);
        c.complete(ticket, NormalizedResponse::failure("Gemini API Error: quota"), None);
        assert_eq!(c.state(), &UiState::Error("Gemini API Error: quota".into()));
    }

    #[test]
    fn test_key_info_without_excerpts() {
        let mut c = PopupController::new("gpt-4");
        let ticket = c.begin(Action::KeyInfo);
        c.complete(ticket, NormalizedResponse::success(""), None);
        assert_eq!(c.state(), &UiState::Result(ResultView::NoExcerpts));
    }

    #[test]
    fn test_key_info_without_document_has_no_report() {
        let mut c = PopupController::new("gpt-4");
        let ticket = c.begin(Action::KeyInfo);
        c.complete(
            ticket,
            NormalizedResponse::success("<HIGHLIGHT>a</HIGHLIGHT>"),
            None,
        );
        assert_eq!(
            c.state(),
            &UiState::Result(ResultView::Highlights {
                excerpts: vec!["a".into()],
                report: None,
            })
        );
    }

    #[test]
    fn test_analyze_empty_array_is_error() {
        let mut c = PopupController::new("gpt-4");
        let ticket = c.begin(Action::Analyze);
        c.complete(ticket, NormalizedResponse::success("[]"), None);
        assert_eq!(
            c.state(),
            &UiState::Error("Model did not return flashcards in JSON.".into())
        );
        assert!(c.deck_mut().is_none());
    }

    #[test]
    fn test_select_model_applies_to_next_request() {
        let mut c = PopupController::new("gpt-3.5-turbo");
        c.select_model("gemini-1.5-flash");
        assert_eq!(c.model(), "gemini-1.5-flash");
    }

    // ── end to end ──

    #[tokio::test]
    async fn test_unauthorized_error_shown_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided: sk-test.", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut popup = popup(&server, "https://example.com/plants", "gpt-4");
        let state = popup.run(Action::Summary, None).await;

        assert_eq!(
            state,
            &UiState::Error("OpenAI API Error: Incorrect API key provided: sk-test.".into())
        );
    }

    #[tokio::test]
    async fn test_key_info_highlights_each_excerpt() {
        let server = openai_replying(
            "<HIGHLIGHT>convert light energy</HIGHLIGHT>\n\
             <HIGHLIGHT>not in the article</HIGHLIGHT>\n\
             <HIGHLIGHT>BLUE AND RED</HIGHLIGHT>",
        )
        .await;

        let mut popup = popup(&server, "https://example.com/plants", "gpt-4");
        let state = popup.run(Action::KeyInfo, None).await.clone();

        let UiState::Result(ResultView::Highlights { excerpts, report }) = state else {
            panic!("expected highlights");
        };
        assert_eq!(excerpts.len(), 3);
        let report = report.expect("page was loaded");
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.matched_count(), 2);
        assert_eq!(report.unmatched().collect::<Vec<_>>(), vec!["not in the article"]);

        let page = popup.page().unwrap();
        assert_eq!(page.document.marker_count(), 2);
        assert!(page.document.to_html().contains(">blue and red</span>"));
    }

    #[tokio::test]
    async fn test_gemini_key_info_attempts_every_span() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{
                    "text": "<HIGHLIGHT>light</HIGHLIGHT><HIGHLIGHT>light</HIGHLIGHT><HIGHLIGHT>light</HIGHLIGHT>"
                }]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut popup = popup(&server, "https://example.com/plants", "gemini-1.5-flash");
        let state = popup.run(Action::KeyInfo, None).await.clone();

        let UiState::Result(ResultView::Highlights { excerpts, report }) = state else {
            panic!("expected highlights");
        };
        assert_eq!(excerpts, vec!["light", "light", "light"]);
        let report = report.expect("page was loaded");
        assert_eq!(report.outcomes.len(), 3);
        // "light" occurs twice in the article; the third attempt finds nothing unmarked.
        assert_eq!(report.matched_count(), 2);
    }

    #[tokio::test]
    async fn test_fenced_flashcards_single_card_deck() {
        let server = openai_replying(
            "```json\n[{\"question\":\"What do plants convert?\",\"answer\":\"Light energy.\"}]\n```",
        )
        .await;

        let mut popup = popup(&server, "https://example.com/plants", "gpt-4");
        popup.run(Action::Analyze, None).await;

        let deck = popup.controller_mut().deck_mut().expect("deck showing");
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.display_question(), "What do plants convert?");
        assert!(!deck.can_previous());
        assert!(!deck.can_next());
        assert_eq!(deck.indicator(), "1 / 1");
    }

    #[tokio::test]
    async fn test_restricted_page_never_reaches_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut popup = popup(&server, "chrome://extensions", "gpt-4");
        for action in [Action::Summary, Action::KeyInfo, Action::Analyze] {
            let state = popup.run(action, None).await;
            assert_eq!(state, &UiState::Error("Cannot analyze Chrome pages.".into()));
        }
        assert!(popup.page().is_none());
    }

    #[tokio::test]
    async fn test_blank_search_is_a_no_op() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut popup = popup(&server, "chrome://newtab", "gpt-4");
        assert_eq!(popup.run(Action::Search, Some("   ")).await, &UiState::Idle);
        assert_eq!(popup.run(Action::Search, None).await, &UiState::Idle);
    }

    #[tokio::test]
    async fn test_search_skips_page_and_routes_to_gemini() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "**Rust** is a language."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Restricted page: search must not care.
        let mut popup = popup(&server, "chrome://newtab", "gemini-1.5-flash");
        let state = popup.run(Action::Search, Some("  what is rust ")).await;

        assert_eq!(
            state,
            &UiState::Result(ResultView::Prose("**Rust** is a language.".into()))
        );
        assert!(popup.page().is_none());
    }
}
