//! Shared HTTP plumbing for the two adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{vendor_error_message, ProviderError};

/// Build a client with the configured timeout.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Send a prepared request and decode a success body as `T`.
///
/// Non-success statuses become [`ProviderError::Api`] carrying the vendor's
/// own message. Transport errors drop the request URL, which can carry a key.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &'static str,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Transport {
            provider,
            source: source.without_url(),
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Transport {
            provider,
            source: source.without_url(),
        })?;

    if !status.is_success() {
        warn!(provider = provider, status = %status, "API error");
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            message: vendor_error_message(&body, status),
        });
    }

    serde_json::from_str(&body).map_err(|source| ProviderError::Decode { provider, source })
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
