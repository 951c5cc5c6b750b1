//! PageLens core: the pieces shared by the popup, the background service,
//! and the provider adapters.
//!
//! - [`types`]: the popup ↔ background message protocol and result shapes
//! - [`prompts`]: the four instruction templates
//! - [`config`]: `~/.pagelens/config.json` schema, loading, env overrides
//! - [`utils`]: data paths and small string helpers

pub mod config;
pub mod prompts;
pub mod types;
pub mod utils;

pub use types::{Action, Flashcard, NormalizedResponse, RequestEnvelope};
