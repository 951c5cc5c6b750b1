//! Provider error taxonomy.
//!
//! Every variant renders to the single message the popup shows; the
//! dispatcher converts it into a failed [`NormalizedResponse`] so nothing
//! escapes the adapter boundary.
//!
//! [`NormalizedResponse`]: pagelens_core::NormalizedResponse

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The model identifier's prefix maps to no known provider.
    #[error("Unknown or unsupported model: {0}")]
    UnknownModel(String),

    /// No credential configured for the selected provider.
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    /// Non-success HTTP status; `message` is the vendor's own error text.
    #[error("{provider} API Error: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Success status, but the generated-content field is absent.
    #[error("{provider} API Error: {reason}")]
    NoContent {
        provider: &'static str,
        reason: &'static str,
    },

    /// Connection-level failure (DNS, refused, TLS, timeout).
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the JSON shape the vendor documents.
    #[error("{provider} returned a malformed response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    /// HTTP status for [`ProviderError::Api`].
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// `{"error": {"message": "..."}}`: the error envelope both vendors use.
#[derive(Debug, Deserialize)]
struct VendorErrorBody {
    error: VendorErrorDetail,
}

#[derive(Debug, Deserialize)]
struct VendorErrorDetail {
    message: String,
}

/// Pull the vendor's message out of an error body, falling back to the
/// status line when the body isn't the documented envelope.
pub(crate) fn vendor_error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<VendorErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.to_string()
            } else {
                format!("{status}: {}", pagelens_core::utils::truncate_string(trimmed, 300))
            }
        }
    }
}
