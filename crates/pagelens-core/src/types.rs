//! Core types for PageLens: the popup ↔ background message protocol.
//!
//! The wire shapes are fixed: a request is `{action, text|query, model}` and
//! a response is `{success, summary|error}`. They must stay byte-compatible
//! whether the two halves share a process or talk over a channel.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────

/// A user-triggered action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Two-paragraph summary of the page.
    Summary,
    /// Free-form answer to a user query (does not read the page).
    Search,
    /// Verbatim excerpts to highlight on the page.
    KeyInfo,
    /// Study flashcards generated from the page.
    Analyze,
}

impl Action {
    /// All actions, in menu order.
    pub const ALL: [Action; 4] = [
        Action::Summary,
        Action::Search,
        Action::KeyInfo,
        Action::Analyze,
    ];

    /// The `action` value used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Action::Summary => "getSummary",
            Action::Search => "getSearchResponse",
            Action::KeyInfo => "findKeyInfo",
            Action::Analyze => "analyzePage",
        }
    }

    /// Whether the action needs the active page's text.
    pub fn reads_page(self) -> bool {
        !matches!(self, Action::Search)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ─────────────────────────────────────────────
// Request envelope
// ─────────────────────────────────────────────

/// One popup → background request. Created per user action and dropped after
/// the round trip.
///
/// Serialized with the action as an internal tag:
/// `{"action":"getSummary","text":"…","model":"gpt-4"}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action")]
pub enum RequestEnvelope {
    #[serde(rename = "getSummary")]
    Summary { text: String, model: String },

    #[serde(rename = "getSearchResponse")]
    Search { query: String, model: String },

    #[serde(rename = "findKeyInfo")]
    KeyInfo { text: String, model: String },

    #[serde(rename = "analyzePage")]
    Analyze { text: String, model: String },
}

impl RequestEnvelope {
    /// Build an envelope; `payload` is page text, or the query for
    /// [`Action::Search`].
    pub fn new(action: Action, payload: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        match action {
            Action::Summary => RequestEnvelope::Summary {
                text: payload.into(),
                model,
            },
            Action::Search => RequestEnvelope::Search {
                query: payload.into(),
                model,
            },
            Action::KeyInfo => RequestEnvelope::KeyInfo {
                text: payload.into(),
                model,
            },
            Action::Analyze => RequestEnvelope::Analyze {
                text: payload.into(),
                model,
            },
        }
    }

    pub fn action(&self) -> Action {
        match self {
            RequestEnvelope::Summary { .. } => Action::Summary,
            RequestEnvelope::Search { .. } => Action::Search,
            RequestEnvelope::KeyInfo { .. } => Action::KeyInfo,
            RequestEnvelope::Analyze { .. } => Action::Analyze,
        }
    }

    /// Page text or query string.
    pub fn payload(&self) -> &str {
        match self {
            RequestEnvelope::Summary { text, .. }
            | RequestEnvelope::KeyInfo { text, .. }
            | RequestEnvelope::Analyze { text, .. } => text,
            RequestEnvelope::Search { query, .. } => query,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            RequestEnvelope::Summary { model, .. }
            | RequestEnvelope::Search { model, .. }
            | RequestEnvelope::KeyInfo { model, .. }
            | RequestEnvelope::Analyze { model, .. } => model,
        }
    }
}

// ─────────────────────────────────────────────
// Normalized response
// ─────────────────────────────────────────────

/// The provider-agnostic result of one round trip.
///
/// Wire form: `{"success":true,"summary":"…"}` or
/// `{"success":false,"error":"…"}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NormalizedResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedResponse {
    /// A successful response carrying generated text.
    pub fn success(text: impl Into<String>) -> Self {
        NormalizedResponse {
            success: true,
            summary: Some(text.into()),
            error: None,
        }
    }

    /// A failed response carrying a user-facing message.
    pub fn failure(message: impl Into<String>) -> Self {
        NormalizedResponse {
            success: false,
            summary: None,
            error: Some(message.into()),
        }
    }

    /// Collapse into `Ok(text)` / `Err(message)`.
    ///
    /// A failure without a message maps to `"API request failed."`.
    pub fn into_result(self) -> Result<String, String> {
        if self.success {
            Ok(self.summary.unwrap_or_default())
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "API request failed.".to_string()))
        }
    }
}

// ─────────────────────────────────────────────
// Flashcards
// ─────────────────────────────────────────────

/// A question/answer pair produced by [`Action::Analyze`].
///
/// Missing fields deserialize as empty strings; the deck fills in a
/// placeholder question when rendering.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flashcard {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Flashcard {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_request_wire_shape() {
        let req = RequestEnvelope::new(Action::Summary, "page body", "gpt-4");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            json!({"action": "getSummary", "text": "page body", "model": "gpt-4"})
        );
    }

    #[test]
    fn test_search_request_uses_query_field() {
        let req = RequestEnvelope::new(Action::Search, "what is rust?", "gemini-1.5-flash");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"], "getSearchResponse");
        assert_eq!(json["query"], "what is rust?");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_request_deserializes_from_wire() {
        let req: RequestEnvelope = serde_json::from_value(json!({
            "action": "analyzePage",
            "text": "content",
            "model": "gpt-4o"
        }))
        .unwrap();
        assert_eq!(req.action(), Action::Analyze);
        assert_eq!(req.payload(), "content");
        assert_eq!(req.model(), "gpt-4o");
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result: Result<RequestEnvelope, _> = serde_json::from_value(json!({
            "action": "translatePage",
            "text": "x",
            "model": "gpt-4"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_action_wire_names_match_envelope_tags() {
        for action in Action::ALL {
            let req = RequestEnvelope::new(action, "x", "gpt-4");
            let json = serde_json::to_value(&req).unwrap();
            assert_eq!(json["action"], action.wire_name());
            assert_eq!(req.action(), action);
        }
    }

    #[test]
    fn test_only_search_skips_page() {
        assert!(Action::Summary.reads_page());
        assert!(Action::KeyInfo.reads_page());
        assert!(Action::Analyze.reads_page());
        assert!(!Action::Search.reads_page());
    }

    #[test]
    fn test_success_response_wire_shape() {
        let resp = NormalizedResponse::success("done");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"success": true, "summary": "done"}));
    }

    #[test]
    fn test_failure_response_wire_shape() {
        let resp = NormalizedResponse::failure("boom");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(
            NormalizedResponse::success("ok").into_result(),
            Ok("ok".to_string())
        );
        assert_eq!(
            NormalizedResponse::failure("bad").into_result(),
            Err("bad".to_string())
        );
        let bare: NormalizedResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert_eq!(bare.into_result(), Err("API request failed.".to_string()));
    }

    #[test]
    fn test_flashcard_missing_fields_default() {
        let card: Flashcard = serde_json::from_value(json!({"question": "Q"})).unwrap();
        assert_eq!(card.question, "Q");
        assert_eq!(card.answer, "");
    }
}
