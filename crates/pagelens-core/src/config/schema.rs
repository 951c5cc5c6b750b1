//! Configuration schema.
//!
//! Hierarchy: `Config` → `Defaults`, `ProvidersConfig` → `ProviderConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

/// Model selected when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.pagelens/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub defaults: Defaults,
    pub providers: ProvidersConfig,
}

// ─────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────

/// Request defaults shared by both providers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Defaults {
    /// Model identifier; its prefix picks the provider.
    pub model: String,
    /// Sampling temperature sent to the vendor.
    pub temperature: f64,
    /// Output length cap (`max_tokens` / `maxOutputTokens`).
    pub max_tokens: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            max_tokens: 1024,
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Credentials and endpoint override for one provider.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Static API key.
    pub api_key: String,
    /// Custom API base URL (overrides the vendor default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: None,
        }
    }

    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// Keys stay out of logs and panic messages.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &if self.is_configured() { "<set>" } else { "<empty>" })
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Both provider configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub gemini: ProviderConfig,
}

impl ProvidersConfig {
    /// Get a provider config by name (`"openai"` or `"gemini"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "openai" => Some(&self.openai),
            "gemini" => Some(&self.gemini),
            _ => None,
        }
    }
}
