//! LLM Provider trait: the seam between the dispatcher and the vendor codecs.

use async_trait::async_trait;
use pagelens_core::config::Defaults;
use pagelens_core::NormalizedResponse;
use tracing::{debug, error};

use crate::error::ProviderError;
use crate::registry::ProviderKind;

/// Generation parameters passed to each call.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.5,
        }
    }
}

impl From<&Defaults> for LlmRequestConfig {
    fn from(defaults: &Defaults) -> Self {
        Self {
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }
}

/// One vendor's request/response codec.
///
/// Implementors only produce the generated text or a typed error;
/// [`LlmProvider::generate`] does the normalization, so no adapter can leak
/// an error past the boundary.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` to `model` and return the generated text, trimmed.
    ///
    /// Exactly one HTTP attempt.
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<String, ProviderError>;

    /// Which provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Display name for logging.
    fn display_name(&self) -> &str {
        self.kind().display_name()
    }

    /// [`complete`](LlmProvider::complete), folded into a [`NormalizedResponse`].
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        config: &LlmRequestConfig,
    ) -> NormalizedResponse {
        match self.complete(prompt, model, config).await {
            Ok(text) => {
                debug!(provider = self.display_name(), chars = text.len(), "LLM response received");
                NormalizedResponse::success(text)
            }
            Err(e) => {
                error!(provider = self.display_name(), model = model, error = %e, "API call failed");
                NormalizedResponse::failure(e.to_string())
            }
        }
    }
}
