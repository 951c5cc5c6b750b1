//! Provider registry: the two supported vendors and model matching.
//!
//! A model identifier is resolved to a [`ProviderKind`] exactly once, at the
//! dispatch boundary. Matching is by prefix only; an identifier that matches
//! neither prefix is a terminal error for that request.

use crate::error::ProviderError;

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name, also the config key (e.g. `"openai"`).
    pub name: &'static str,
    /// Human-readable name for logs and error messages.
    pub display_name: &'static str,
    /// Model identifier prefix that selects this provider.
    pub model_prefix: &'static str,
    /// Vendor API base URL.
    pub default_api_base: &'static str,
    /// Environment variable the vendor's own tooling reads the key from.
    pub env_key: &'static str,
    /// Where the credential travels.
    pub auth: AuthPlacement,
}

/// How the static credential is attached to a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPlacement {
    /// `Authorization: Bearer <key>` header.
    BearerHeader,
    /// `?key=<key>` query parameter.
    QueryParam,
}

/// Both providers, in matching order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        model_prefix: "gpt-",
        default_api_base: "https://api.openai.com/v1",
        env_key: "OPENAI_API_KEY",
        auth: AuthPlacement::BearerHeader,
    },
    ProviderSpec {
        name: "gemini",
        display_name: "Gemini",
        model_prefix: "gemini-",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        env_key: "GEMINI_API_KEY",
        auth: AuthPlacement::QueryParam,
    },
];

// ─────────────────────────────────────────────
// ProviderKind
// ─────────────────────────────────────────────

/// The closed set of providers a request can be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Resolve a model identifier by prefix.
    pub fn from_model(model: &str) -> Result<Self, ProviderError> {
        if model.starts_with(ProviderKind::OpenAi.spec().model_prefix) {
            Ok(ProviderKind::OpenAi)
        } else if model.starts_with(ProviderKind::Gemini.spec().model_prefix) {
            Ok(ProviderKind::Gemini)
        } else {
            Err(ProviderError::UnknownModel(model.to_string()))
        }
    }

    pub fn spec(self) -> &'static ProviderSpec {
        match self {
            ProviderKind::OpenAi => &PROVIDERS[0],
            ProviderKind::Gemini => &PROVIDERS[1],
        }
    }

    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }
}
