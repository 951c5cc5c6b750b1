//! Popup-side error kinds. Each renders to the fixed message the user sees.

use thiserror::Error;

/// The active page could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    /// Browser-internal page; never sent to a provider.
    #[error("Cannot analyze Chrome pages.")]
    Restricted { url: String },

    /// Fetch, read, or extraction failed, or the page has no visible text.
    #[error("Could not access page content.")]
    Unavailable { url: String, reason: String },
}

/// The model's structured output could not be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuredOutputError {
    /// No parseable JSON array of flashcards, even after lenient extraction.
    #[error("Model did not return flashcards in JSON.")]
    Malformed { detail: String },

    /// A valid but empty array.
    #[error("Model did not return flashcards in JSON.")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        let restricted = PageError::Restricted {
            url: "chrome://settings".into(),
        };
        assert_eq!(restricted.to_string(), "Cannot analyze Chrome pages.");

        let unavailable = PageError::Unavailable {
            url: "https://example.com".into(),
            reason: "404".into(),
        };
        assert_eq!(unavailable.to_string(), "Could not access page content.");

        assert_eq!(
            StructuredOutputError::Empty.to_string(),
            "Model did not return flashcards in JSON."
        );
    }
}
