//! Config loader: reads `~/.pagelens/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.pagelens/config.json`
//! 3. Environment variables `PAGELENS_<SECTION>__<FIELD>`
//! 4. Vendor variables `OPENAI_API_KEY` / `GEMINI_API_KEY`, only for keys
//!    still empty after steps 1–3

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `PAGELENS_DEFAULTS__MODEL` → `defaults.model`
/// - `PAGELENS_DEFAULTS__TEMPERATURE` → `defaults.temperature`
/// - `PAGELENS_DEFAULTS__MAX_TOKENS` → `defaults.max_tokens`
/// - `PAGELENS_DEFAULTS__TIMEOUT_SECS` → `defaults.timeout_secs`
/// - `PAGELENS_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `PAGELENS_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("PAGELENS_DEFAULTS__MODEL") {
        config.defaults.model = val;
    }
    if let Ok(val) = std::env::var("PAGELENS_DEFAULTS__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.defaults.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("PAGELENS_DEFAULTS__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.defaults.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("PAGELENS_DEFAULTS__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.defaults.timeout_secs = n;
        }
    }

    apply_provider_env(&mut config.providers.openai, "OPENAI");
    apply_provider_env(&mut config.providers.gemini, "GEMINI");

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("PAGELENS_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("PAGELENS_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if !provider.is_configured() {
        if let Ok(val) = std::env::var(format!("{name}_API_KEY")) {
            debug!(provider = name, "Using vendor API key variable");
            provider.api_key = val;
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
