//! Configuration system: schema, loading, and env var overrides.
//!
//! Credentials live here, resolved once at process start; nothing in the
//! source tree embeds a key.
//!
//! # Usage
//! ```no_run
//! use pagelens_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Model: {}", cfg.defaults.model);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, Defaults, ProviderConfig, ProvidersConfig};
