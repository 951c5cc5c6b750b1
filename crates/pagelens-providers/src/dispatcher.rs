//! Provider dispatcher: one prompt, one model, one adapter.
//!
//! The model identifier is resolved to a [`ProviderKind`] before anything
//! else happens. Unknown identifiers fail immediately with no network call;
//! there is no fan-out and no fallback to the other provider.

use std::sync::Arc;
use std::time::Duration;

use pagelens_core::config::Config;
use pagelens_core::NormalizedResponse;
use tracing::{debug, warn};

use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;
use crate::registry::ProviderKind;
use crate::traits::{LlmProvider, LlmRequestConfig};

pub struct Dispatcher {
    openai: Arc<dyn LlmProvider>,
    gemini: Arc<dyn LlmProvider>,
    request: LlmRequestConfig,
}

impl Dispatcher {
    /// Build from explicit adapters (used by tests and custom wiring).
    pub fn new(
        openai: Arc<dyn LlmProvider>,
        gemini: Arc<dyn LlmProvider>,
        request: LlmRequestConfig,
    ) -> Self {
        Dispatcher {
            openai,
            gemini,
            request,
        }
    }

    /// Build both HTTP adapters from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.defaults.timeout_secs);
        Dispatcher::new(
            Arc::new(OpenAiProvider::new(&config.providers.openai, timeout)),
            Arc::new(GeminiProvider::new(&config.providers.gemini, timeout)),
            LlmRequestConfig::from(&config.defaults),
        )
    }

    /// The adapter that handles `kind`.
    pub fn adapter(&self, kind: ProviderKind) -> &Arc<dyn LlmProvider> {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Gemini => &self.gemini,
        }
    }

    /// Route `prompt` to the adapter selected by `model`'s prefix.
    pub async fn dispatch(&self, prompt: &str, model: &str) -> NormalizedResponse {
        let kind = match ProviderKind::from_model(model) {
            Ok(kind) => kind,
            Err(e) => {
                warn!(model = model, "Unknown model provider");
                return NormalizedResponse::failure(e.to_string());
            }
        };

        debug!(provider = kind.display_name(), model = model, "Dispatching prompt");
        self.adapter(kind)
            .generate(prompt, model, &self.request)
            .await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
