//! OpenAI chat completions adapter.
//!
//! `POST {base}/chat/completions`, bearer auth, one user message.

use std::time::Duration;

use async_trait::async_trait;
use pagelens_core::config::ProviderConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::http::{build_client, join_url, send_json};
use crate::registry::ProviderKind;
use crate::traits::{LlmProvider, LlmRequestConfig};

const PROVIDER: &str = "OpenAI";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}

// ─────────────────────────────────────────────
// OpenAiProvider
// ─────────────────────────────────────────────

pub struct OpenAiProvider {
    client: Client,
    api_base: String,
    api_key: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create from config; `api_base` falls back to the vendor default.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| ProviderKind::OpenAi.spec().default_api_base.to_string());

        OpenAiProvider {
            client: build_client(timeout),
            api_base,
            api_key: config.api_key.clone(),
        }
    }

    fn completions_url(&self) -> String {
        join_url(&self.api_base, "chat/completions")
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<String, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey { provider: PROVIDER });
        }

        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        debug!(provider = PROVIDER, model = model, prompt_chars = prompt.len(), "Calling LLM");

        let request = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatResponse = send_json(request, PROVIDER).await?;

        response
            .into_text()
            .map(|text| text.trim().to_string())
            .ok_or(ProviderError::NoContent {
                provider: PROVIDER,
                reason: "No content was generated.",
            })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, key: &str) -> OpenAiProvider {
        let config = ProviderConfig {
            api_key: key.to_string(),
            api_base: Some(server.uri()),
        };
        OpenAiProvider::new(&config, Duration::from_secs(5))
    }

    #[test]
    fn test_default_api_base() {
        let provider = OpenAiProvider::new(&ProviderConfig::new("k"), Duration::from_secs(5));
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_complete_sends_exact_body_and_trims() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(json!({
                "model": "gpt-4",
                "messages": [{"role": "user", "content": "Say hi"}],
                "max_tokens": 1024,
                "temperature": 0.5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "message": {"role": "assistant", "content": "  Hi there!\n"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, "sk-test");
        let text = provider
            .complete("Say hi", "gpt-4", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(text, "Hi there!");
    }

    #[tokio::test]
    async fn test_unauthorized_surfaces_vendor_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Incorrect API key provided: sk-bad.",
                    "type": "invalid_request_error",
                    "code": "invalid_api_key"
                }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, "sk-bad");
        let resp = provider
            .generate("x", "gpt-4", &LlmRequestConfig::default())
            .await;

        assert!(!resp.success);
        assert_eq!(
            resp.error.as_deref(),
            Some("OpenAI API Error: Incorrect API key provided: sk-bad.")
        );
    }

    #[tokio::test]
    async fn test_missing_choices_is_no_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider = provider_for(&server, "sk-test");
        let err = provider
            .complete("x", "gpt-4", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::NoContent { .. }));
        assert_eq!(err.to_string(), "OpenAI API Error: No content was generated.");
    }

    #[tokio::test]
    async fn test_malformed_json_is_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = provider_for(&server, "sk-test");
        let resp = provider
            .generate("x", "gpt-4", &LlmRequestConfig::default())
            .await;

        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("malformed response"));
    }

    #[tokio::test]
    async fn test_network_error_is_failure() {
        let config = ProviderConfig {
            api_key: "sk-test".into(),
            api_base: Some("http://127.0.0.1:1".into()),
        };
        let provider = OpenAiProvider::new(&config, Duration::from_secs(5));

        let resp = provider
            .generate("x", "gpt-4", &LlmRequestConfig::default())
            .await;

        assert!(!resp.success);
        assert!(resp.error.unwrap().starts_with("OpenAI request failed"));
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider_for(&server, "");
        let err = provider
            .complete("x", "gpt-4", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "OpenAI API key is not configured");
    }
}
