//! Google Gemini `generateContent` adapter.
//!
//! The key travels as a `key` query parameter, not a header. A 200 response
//! with no candidates means the prompt or output was withheld (usually a
//! safety block), which is reported distinctly from an HTTP error.

use std::time::Duration;

use async_trait::async_trait;
use pagelens_core::config::ProviderConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::http::{build_client, join_url, send_json};
use crate::registry::ProviderKind;
use crate::traits::{LlmProvider, LlmRequestConfig};

const PROVIDER: &str = "Gemini";

const BLOCKED_REASON: &str =
    "No content was generated. It may have been blocked for safety reasons.";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(default, rename = "blockReason")]
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            warn!(provider = PROVIDER, block_reason = %reason, "Prompt blocked");
        }
        let candidate = self.candidates.into_iter().next()?;
        if let Some(reason) = &candidate.finish_reason {
            debug!(provider = PROVIDER, finish_reason = %reason, "Candidate finished");
        }
        candidate
            .content?
            .parts
            .into_iter()
            .next()
            .and_then(|p| p.text)
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

pub struct GeminiProvider {
    client: Client,
    api_base: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiProvider {
    /// Create from config; `api_base` falls back to the vendor default.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| ProviderKind::Gemini.spec().default_api_base.to_string());

        GeminiProvider {
            client: build_client(timeout),
            api_base,
            api_key: config.api_key.clone(),
        }
    }

    /// Endpoint for `model`, without the key.
    fn generate_url(&self, model: &str) -> String {
        join_url(&self.api_base, &format!("models/{model}:generateContent"))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<String, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey { provider: PROVIDER });
        }

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            },
        };

        debug!(provider = PROVIDER, model = model, prompt_chars = prompt.len(), "Calling LLM");

        let request = self
            .client
            .post(self.generate_url(model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response: GenerateResponse = send_json(request, PROVIDER).await?;

        response
            .into_text()
            .map(|text| text.trim().to_string())
            .ok_or(ProviderError::NoContent {
                provider: PROVIDER,
                reason: BLOCKED_REASON,
            })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GeminiProvider {
        let config = ProviderConfig {
            api_key: "AIza-test".to_string(),
            api_base: Some(server.uri()),
        };
        GeminiProvider::new(&config, Duration::from_secs(5))
    }

    #[test]
    fn test_default_url_shape() {
        let provider = GeminiProvider::new(&ProviderConfig::new("k"), Duration::from_secs(5));
        assert_eq!(
            provider.generate_url("gemini-1.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_complete_sends_exact_body_with_query_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "AIza-test"))
            .and(body_json(json!({
                "contents": [{"parts": [{"text": "Summarize"}]}],
                "generationConfig": {"temperature": 0.5, "maxOutputTokens": 1024}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "\n**Summary:** fine.  "}], "role": "model"},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let text = provider
            .complete("Summarize", "gemini-1.5-flash", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(text, "**Summary:** fine.");
    }

    #[tokio::test]
    async fn test_no_candidates_reports_safety_block() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let resp = provider
            .generate("x", "gemini-pro", &LlmRequestConfig::default())
            .await;

        assert!(!resp.success);
        assert_eq!(
            resp.error.as_deref(),
            Some("Gemini API Error: No content was generated. It may have been blocked for safety reasons.")
        );
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let config = ProviderConfig {
            api_key: "AIza-SUPER-SECRET".to_string(),
            api_base: Some("http://127.0.0.1:1".to_string()),
        };
        let provider = GeminiProvider::new(&config, Duration::from_secs(5));

        let resp = provider
            .generate("x", "gemini-pro", &LlmRequestConfig::default())
            .await;

        assert!(!resp.success);
        let error = resp.error.unwrap_or_default();
        assert!(error.starts_with("Gemini request failed"), "{error}");
        assert!(!error.contains("AIza-SUPER-SECRET"), "{error}");
        assert!(!error.contains("key="), "{error}");
    }

    #[tokio::test]
    async fn test_candidate_without_content_is_no_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .complete("x", "gemini-pro", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::NoContent { .. }));
    }

    #[tokio::test]
    async fn test_http_error_surfaces_vendor_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .complete("x", "gemini-1.5-flash", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "Gemini API Error: API key not valid. Please pass a valid API key."
        );
    }
}
