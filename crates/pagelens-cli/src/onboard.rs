//! `pagelens onboard`: create `~/.pagelens/config.json` with defaults.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use pagelens_core::config::{get_config_path, save_config, Config};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔎 PageLens Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "  Add your keys under {} in the config,",
        "providers.openai.apiKey / providers.gemini.apiKey".bold()
    );
    println!(
        "  or export {} / {}.",
        "OPENAI_API_KEY".bold(),
        "GEMINI_API_KEY".bold()
    );
    println!();
    println!(
        "{}",
        "  Setup complete! Try `pagelens summarize https://example.com`.".green()
    );
    println!();

    Ok(())
}

/// Write `Config::default()` to `path` unless a file is already there.
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".pagelens").join("config.json");

        assert!(write_default_config(&path).unwrap());
        assert!(path.exists());

        std::fs::write(&path, r#"{"defaults":{"model":"gpt-4"}}"#).unwrap();
        assert!(!write_default_config(&path).unwrap());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("gpt-4"));
    }
}
