//! Check command implementation.

use a11y_lint_core::{
    AnalysisContext, AnalysisReport, AnalyzerBox, AnalyzerRegistry, DocumentModel,
    IssueAggregator, Severity,
};
use a11y_lint_rules::{all_analyzers, configure, registry};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Options of the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated analyzer names or codes; the configured preset if `None`.
    pub rules: Option<String>,
    /// Overrides the configured minimum severity.
    pub min_severity: Option<Severity>,
}

/// Runs the check command and returns the printed report.
pub fn run(snapshots: &[PathBuf], options: &CheckOptions, source: &ConfigSource) -> Result<AnalysisReport> {
    let mut config = source.load()?;
    if let Some(severity) = options.min_severity {
        config.min_severity = Some(severity);
    }

    let registry = match &options.rules {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            let analyzers: Vec<AnalyzerBox> = filter_analyzers(&names)
                .into_iter()
                .map(|analyzer| configure(&config, analyzer))
                .collect();
            AnalyzerRegistry::new().with_all(analyzers).with_config(config)
        }
        None => registry(config),
    };

    tracing::info!(
        "Checking {} snapshot(s) with {} analyzer(s)",
        snapshots.len(),
        registry.len()
    );

    let mut per_page = Vec::with_capacity(snapshots.len());
    for path in snapshots {
        let model = load_snapshot(path)?;
        let outcome = registry.analyze(&AnalysisContext::for_model(&model));
        for failure in &outcome.failures {
            tracing::warn!("{} on {}", failure, path.display());
        }
        per_page.push(outcome.issues);
    }

    // Pages sharing a script report its issues once.
    let report = AnalysisReport {
        issues: IssueAggregator::new(registry.config().min_severity()).aggregate(&per_page),
        pages_analyzed: snapshots.len(),
    };
    super::output::print(&report, options.format)?;
    Ok(report)
}

/// Reads a serialized page model.
pub fn load_snapshot(path: &Path) -> Result<DocumentModel> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let model: DocumentModel = serde_json::from_str(&content)
        .with_context(|| format!("Invalid snapshot: {}", path.display()))?;
    if !model.bindings_are_valid() {
        bail!(
            "Snapshot {} binds actions to elements outside its markup",
            path.display()
        );
    }
    Ok(model)
}

fn filter_analyzers(names: &[&str]) -> Vec<AnalyzerBox> {
    let available = all_analyzers();
    for name in names {
        if !available.iter().any(|a| a.name() == *name || a.code() == *name) {
            tracing::warn!("Unknown analyzer: {}", name);
        }
    }
    available
        .into_iter()
        .filter(|a| names.contains(&a.name()) || names.contains(&a.code()))
        .collect()
}
