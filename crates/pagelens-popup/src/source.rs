//! Where "the active page" comes from.
//!
//! [`PageSource`] is the collaborator the popup asks for page text. The
//! shipped sources fetch an `http(s)` URL, read a local HTML file, or hold a
//! fixed document. Browser-internal URLs are refused before any I/O.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::document::PageDocument;
use crate::error::PageError;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) PageLens/0.1";

/// URL schemes the browser never lets an extension script.
pub const RESTRICTED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "edge://",
    "devtools://",
    "about:",
    "view-source:",
];

/// True when `url` is a page that must not be analyzed. An empty URL counts.
pub fn is_restricted(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return true;
    }
    let lower = url.to_ascii_lowercase();
    RESTRICTED_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// A loaded page.
#[derive(Clone, Debug)]
pub struct Page {
    pub url: String,
    pub document: PageDocument,
}

impl Page {
    /// The page's visible text.
    pub fn text(&self) -> String {
        self.document.visible_text()
    }
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Load the current page. Fails with [`PageError::Restricted`] for
    /// browser-internal pages and [`PageError::Unavailable`] when the page
    /// can't be read or has no visible text.
    async fn load(&self) -> Result<Page, PageError>;
}

/// Reject empty pages.
fn into_page(url: &str, document: PageDocument) -> Result<Page, PageError> {
    if document.visible_text().is_empty() {
        warn!(url = url, "Page has no visible text");
        return Err(PageError::Unavailable {
            url: url.to_string(),
            reason: "no visible text".to_string(),
        });
    }
    Ok(Page {
        url: url.to_string(),
        document,
    })
}

// ─────────────────────────────────────────────
// UrlPageSource
// ─────────────────────────────────────────────

/// Reads a page from an `http(s)` URL, a `file://` URL, or a plain path.
pub struct UrlPageSource {
    url: String,
    client: Client,
}

impl UrlPageSource {
    pub fn new(url: impl Into<String>) -> Self {
        UrlPageSource {
            url: url.into(),
            client: Client::builder()
                .user_agent(USER_AGENT)
                .redirect(reqwest::redirect::Policy::limited(5))
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String, String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| format!("fetch failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| format!("failed to read body: {e}"))
    }

    async fn read_file(&self, path: &Path) -> Result<String, String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("failed to read {}: {e}", path.display()))
    }
}

#[async_trait]
impl PageSource for UrlPageSource {
    async fn load(&self) -> Result<Page, PageError> {
        if is_restricted(&self.url) {
            debug!(url = %self.url, "Refusing restricted page");
            return Err(PageError::Restricted {
                url: self.url.clone(),
            });
        }

        let lower = self.url.to_ascii_lowercase();
        let html = if lower.starts_with("http://") || lower.starts_with("https://") {
            self.fetch().await
        } else {
            let path = self.url.strip_prefix("file://").unwrap_or(&self.url);
            self.read_file(Path::new(path)).await
        };

        let html = html.map_err(|reason| {
            warn!(url = %self.url, reason = %reason, "Could not load page");
            PageError::Unavailable {
                url: self.url.clone(),
                reason,
            }
        })?;

        debug!(url = %self.url, bytes = html.len(), "Page loaded");
        into_page(&self.url, PageDocument::parse(&html))
    }
}

// ─────────────────────────────────────────────
// StaticPageSource
// ─────────────────────────────────────────────

/// A fixed page, for tests and the stdio bridge.
#[derive(Clone, Debug)]
pub struct StaticPageSource {
    url: String,
    html: String,
}

impl StaticPageSource {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        StaticPageSource {
            url: url.into(),
            html: html.into(),
        }
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn load(&self) -> Result<Page, PageError> {
        if is_restricted(&self.url) {
            return Err(PageError::Restricted {
                url: self.url.clone(),
            });
        }
        into_page(&self.url, PageDocument::parse(&self.html))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
