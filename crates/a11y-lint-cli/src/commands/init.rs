//! Init command implementation.

use a11y_lint_core::CONFIG_CANDIDATES;
use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# a11y-lint configuration

# Analyzer set: "recommended" (default), "strict" or "minimal"
preset = "recommended"

# Minimum severity reported: "info", "warning" or "error"
min_severity = "info"

[index]
# Workspace root, relative to this file
root = "."

# Glob patterns to exclude from indexing
exclude = [
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/.git/**",
    "**/vendor/**",
    "**/coverage/**",
]

# Respect .gitignore files
respect_gitignore = true

# Pages are built with page scope when more files than this are found
max_project_files = 2000

# Analyzer configurations
# Each analyzer can be enabled/disabled and have its severity overridden

[rules.focus-management]
enabled = true
# severity = "warning"
# Lines between an element's removal and a focus move that still count
line_window = 5

[rules.keyboard-handlers]
enabled = true
# Single-key shortcuts that are known to be remappable
# allowed_shortcuts = ["?"]

# [rules.widget-patterns]
# patterns = ["tabs", "dialog", "combobox"]

# [rules.hidden-focusable]
# enabled = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_CANDIDATES[0]), force)?;

    println!("Created {}", CONFIG_CANDIDATES[0]);
    println!("\nNext steps:");
    println!("  1. Edit {} to configure analyzers", CONFIG_CANDIDATES[0]);
    println!("  2. Run: a11y-lint check <snapshot.json>...");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}
