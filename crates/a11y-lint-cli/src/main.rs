//! a11y-lint CLI tool.
//!
//! Usage:
//! ```bash
//! a11y-lint check [OPTIONS] <SNAPSHOT>...
//! a11y-lint list-rules
//! a11y-lint init
//! ```
//!
//! `check` reads page snapshots: JSON-serialized document models written by
//! an external producer that parsed the markup, scripts and stylesheets.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Cross-file accessibility linter for web projects
#[derive(Parser)]
#[command(name = "a11y-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "A11Y_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze page snapshots
    Check {
        /// Snapshot files (JSON document models)
        #[arg(required = true)]
        snapshots: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific analyzers (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Minimum severity to report
        #[arg(long)]
        min_severity: Option<SeverityArg>,
    },

    /// List available analyzers
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Diagnostics with source snippets.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-issue compact format.
    Compact,
}

/// Severity threshold accepted on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SeverityArg {
    /// Report everything.
    Info,
    /// Report warnings and errors.
    Warning,
    /// Report errors only.
    Error,
}

impl From<SeverityArg> for a11y_lint_core::Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Self::Info,
            SeverityArg::Warning => Self::Warning,
            SeverityArg::Error => Self::Error,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            snapshots,
            format,
            rules,
            min_severity,
        } => {
            let cwd = std::env::current_dir()?;
            let source = config_resolver::resolve(&cwd, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                format,
                rules,
                min_severity: min_severity.map(Into::into),
            };
            let report = commands::check::run(&snapshots, &options, &source)?;
            if report.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
