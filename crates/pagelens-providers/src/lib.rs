//! LLM provider layer for PageLens.
//!
//! # Architecture
//!
//! - [`registry`]: the closed set of providers and model-prefix resolution
//! - [`traits::LlmProvider`]: trait both adapters implement
//! - [`openai::OpenAiProvider`] / [`gemini::GeminiProvider`]: vendor codecs
//! - [`dispatcher::Dispatcher`]: routes one prompt to exactly one adapter

pub mod dispatcher;
pub mod error;
pub mod gemini;
mod http;
pub mod openai;
pub mod registry;
pub mod traits;

pub use dispatcher::Dispatcher;
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use registry::{ProviderKind, ProviderSpec, PROVIDERS};
pub use traits::{LlmProvider, LlmRequestConfig};
