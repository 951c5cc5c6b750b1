//! Background service: request envelope in, normalized response out.
//!
//! [`Background::handle`] is the whole service: build the prompt for the
//! action, dispatch it to the model's provider. [`Background::spawn`] moves
//! it onto its own task behind an mpsc queue so the popup talks to it only
//! through messages, one request at a time, each answered on its own
//! oneshot channel.

use pagelens_core::config::Config;
use pagelens_core::prompts::build_prompt;
use pagelens_core::utils::word_count;
use pagelens_core::{NormalizedResponse, RequestEnvelope};
use pagelens_providers::Dispatcher;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Returned when the service task has gone away.
pub const NO_RESPONSE: &str = "No response from background.";

pub struct Background {
    dispatcher: Dispatcher,
}

impl Background {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Background { dispatcher }
    }

    pub fn from_config(config: &Config) -> Self {
        Background::new(Dispatcher::from_config(config))
    }

    /// Build the prompt for `request` and dispatch it.
    pub async fn handle(&self, request: &RequestEnvelope) -> NormalizedResponse {
        let action = request.action();
        info!(
            action = action.wire_name(),
            model = request.model(),
            input_chars = request.payload().len(),
            input_words = word_count(request.payload()),
            "Handling request"
        );

        let prompt = build_prompt(action, request.payload());
        let response = self.dispatcher.dispatch(&prompt, request.model()).await;

        if !response.success {
            warn!(
                action = action.wire_name(),
                error = response.error.as_deref().unwrap_or_default(),
                "Request failed"
            );
        }
        response
    }

    /// One JSON request line in, one JSON response line out.
    ///
    /// Undecodable requests are answered with a failure response rather than
    /// dropped.
    pub async fn handle_json(&self, line: &str) -> String {
        let response = match serde_json::from_str::<RequestEnvelope>(line) {
            Ok(request) => self.handle(&request).await,
            Err(e) => {
                warn!(error = %e, "Invalid request message");
                NormalizedResponse::failure(format!("Invalid request: {e}"))
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"success":false,"error":"Failed to encode response."}"#.to_string()
        })
    }

    /// Run the service on its own task. Requests are processed in arrival
    /// order; the task ends when every handle is dropped.
    pub fn spawn(self, buffer: usize) -> (BackgroundHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Job>(buffer.max(1));

        let task = tokio::spawn(async move {
            debug!("Background service started");
            while let Some(job) = rx.recv().await {
                let response = self.handle(&job.request).await;
                if job.reply.send(response).is_err() {
                    debug!("Requester went away before the response was ready");
                }
            }
            debug!("Background service stopped");
        });

        (BackgroundHandle { tx }, task)
    }
}

struct Job {
    request: RequestEnvelope,
    reply: oneshot::Sender<NormalizedResponse>,
}

/// Cheap, cloneable sender side of a spawned [`Background`].
#[derive(Clone)]
pub struct BackgroundHandle {
    tx: mpsc::Sender<Job>,
}

impl BackgroundHandle {
    /// Send one request and wait for its response.
    pub async fn send(&self, request: RequestEnvelope) -> NormalizedResponse {
        let (reply, response) = oneshot::channel();
        if self.tx.send(Job { request, reply }).await.is_err() {
            warn!("Background service is not running");
            return NormalizedResponse::failure(NO_RESPONSE);
        }
        response
            .await
            .unwrap_or_else(|_| NormalizedResponse::failure(NO_RESPONSE))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
