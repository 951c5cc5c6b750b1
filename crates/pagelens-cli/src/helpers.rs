//! Shared CLI helpers: path expansion, result printing, file output.

use std::path::{Path, PathBuf};

use colored::Colorize;

use pagelens_core::utils::file_stamp;
use pagelens_popup::HighlightReport;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// `pagelens-highlights-<stamp>.html` in the current directory.
pub fn default_highlights_path() -> PathBuf {
    PathBuf::from(format!("pagelens-highlights-{}.html", file_stamp()))
}

/// Write `html`, creating parent directories.
pub fn write_html(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
}

/// Print a summary or search answer.
pub fn print_prose(text: &str) {
    println!();
    println!("{}", "🔎 PageLens".cyan().bold());
    if text.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{text}");
    }
    println!();
}

pub fn print_notice(message: &str) {
    println!("{}", message.yellow());
}

/// Print the excerpt list, marking which ones were found on the page.
pub fn print_highlights(excerpts: &[String], report: Option<&HighlightReport>) {
    println!();
    println!("{}", "Highlights:".bold());
    match report {
        Some(report) => {
            for outcome in &report.outcomes {
                let mark = if outcome.matched {
                    "✓".green()
                } else {
                    "✗".red()
                };
                println!("  {mark} {}", outcome.excerpt);
            }
            println!(
                "{}",
                format!(
                    "  {} of {} found on the page",
                    report.matched_count(),
                    report.outcomes.len()
                )
                .dimmed()
            );
        }
        None => {
            for excerpt in excerpts {
                println!("  • {excerpt}");
            }
        }
    }
}

pub fn print_saved(what: &str, path: &Path) {
    println!();
    println!("  {} {what} written to {}", "✓".green(), path.display());
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/foo/bar");
        assert!(result.ends_with("foo/bar"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn default_path_is_stamped_html() {
        let name = default_highlights_path().to_string_lossy().into_owned();
        assert!(name.starts_with("pagelens-highlights-"));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn write_html_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.html");
        write_html(&path, "<p>hi</p>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>hi</p>");
    }
}
