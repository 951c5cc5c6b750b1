//! `pagelens status`: show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use pagelens_core::config::{get_config_path, load_config};
use pagelens_providers::{ProviderKind, PROVIDERS};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🔎 PageLens Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    let model = &config.defaults.model;
    let routed = match ProviderKind::from_model(model) {
        Ok(kind) => format!("→ {}", kind.display_name()).dimmed().to_string(),
        Err(_) => "(unknown provider)".red().to_string(),
    };
    println!("  {:<18} {} {}", "Model:".bold(), model, routed);

    println!(
        "  {:<18} {} | max_tokens: {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", config.defaults.temperature).dimmed(),
        format!("{}", config.defaults.max_tokens).dimmed(),
        config.defaults.timeout_secs,
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let status = match config.providers.get_by_name(spec.name) {
            Some(provider) if provider.is_configured() => format!("{} (key set)", "✓".green()),
            _ => format!(
                "{}",
                format!("· not configured (set {})", spec.env_key).dimmed()
            ),
        };
        println!(
            "    {:<20} {}",
            format!("{} ({}*)", spec.display_name, spec.model_prefix),
            status
        );
    }
    println!();

    Ok(())
}
