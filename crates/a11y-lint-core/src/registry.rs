//! Analyzer registry: runs every analyzer over a page in isolation.

use crate::aggregate::IssueAggregator;
use crate::analyzer::{AnalysisContext, Analyzer, AnalyzerBox, AnalyzerFn, FnAnalyzer};
use crate::config::Config;
use crate::suppression::Suppressions;
use crate::types::Issue;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, error};

/// An analyzer panicked. Recorded, never reported as an accessibility issue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("analyzer {analyzer} failed: {message}")]
pub struct AnalyzerFailure {
    /// Analyzer name.
    pub analyzer: String,
    /// Panic message.
    pub message: String,
}

/// Raw per-analyzer output of [`AnalyzerRegistry::run`].
#[derive(Debug, Default)]
pub struct RunOutput {
    /// One list per analyzer that ran, in registration order.
    pub results: Vec<(String, Vec<Issue>)>,
    /// Analyzers that panicked.
    pub failures: Vec<AnalyzerFailure>,
}

/// Result of [`AnalyzerRegistry::analyze`].
#[derive(Debug, Default)]
pub struct AnalysisOutcome {
    /// Aggregated issues.
    pub issues: Vec<Issue>,
    /// Analyzers that panicked.
    pub failures: Vec<AnalyzerFailure>,
}

/// The set of analyzers applied to every page.
#[derive(Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<AnalyzerBox>,
    config: Config,
}

impl std::fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerRegistry")
            .field("analyzers", &self.names())
            .finish_non_exhaustive()
    }
}

impl AnalyzerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration used for enable flags, severity overrides
    /// and the minimum severity.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Adds an analyzer.
    #[must_use]
    pub fn with<A: Analyzer + 'static>(mut self, analyzer: A) -> Self {
        self.register(analyzer);
        self
    }

    /// Adds several boxed analyzers.
    #[must_use]
    pub fn with_all(mut self, analyzers: impl IntoIterator<Item = AnalyzerBox>) -> Self {
        self.analyzers.extend(analyzers);
        self
    }

    /// Adds an analyzer.
    pub fn register<A: Analyzer + 'static>(&mut self, analyzer: A) {
        self.analyzers.push(Box::new(analyzer));
    }

    /// Adds a boxed analyzer.
    pub fn register_box(&mut self, analyzer: AnalyzerBox) {
        self.analyzers.push(analyzer);
    }

    /// Adds a plain function as an analyzer.
    pub fn register_fn(&mut self, name: &'static str, code: &'static str, func: AnalyzerFn) {
        self.register(FnAnalyzer::new(name, code, func));
    }

    /// Registered analyzers in order.
    #[must_use]
    pub fn analyzers(&self) -> &[AnalyzerBox] {
        &self.analyzers
    }

    /// Registered analyzer names.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    /// Number of registered analyzers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    /// Returns true if no analyzer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every enabled analyzer.
    ///
    /// A panicking analyzer is recorded in [`RunOutput::failures`] and the
    /// others still run. Configured severity overrides are applied.
    #[must_use]
    pub fn run(&self, ctx: &AnalysisContext<'_>) -> RunOutput {
        let mut output = RunOutput::default();
        for analyzer in &self.analyzers {
            let name = analyzer.name();
            if !self.config.is_rule_enabled(name) {
                debug!("Skipping disabled analyzer: {}", name);
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| analyzer.analyze(ctx))) {
                Ok(issues) => {
                    let issues = self.apply_severity_override(name, issues);
                    output.results.push((name.to_string(), issues));
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("Analyzer {} panicked: {}", name, message);
                    output.failures.push(AnalyzerFailure {
                        analyzer: name.to_string(),
                        message,
                    });
                }
            }
        }
        output
    }

    /// Runs, applies markup suppressions, and aggregates.
    #[must_use]
    pub fn analyze(&self, ctx: &AnalysisContext<'_>) -> AnalysisOutcome {
        let output = self.run(ctx);
        let suppressions = ctx.tree().map(Suppressions::from_tree).unwrap_or_default();
        let results: Vec<Vec<Issue>> = output
            .results
            .into_iter()
            .map(|(name, issues)| {
                let requires_reason = self
                    .analyzers
                    .iter()
                    .find(|a| a.name() == name)
                    .is_some_and(|a| a.requires_allow_reason());
                suppressions.apply(&name, requires_reason, issues)
            })
            .collect();
        let issues = IssueAggregator::new(self.config.min_severity()).aggregate(&results);
        debug!(
            "{} issue(s) from {} analyzer(s) at {} scope",
            issues.len(),
            results.len(),
            ctx.scope()
        );
        AnalysisOutcome {
            issues,
            failures: output.failures,
        }
    }

    fn apply_severity_override(&self, name: &str, mut issues: Vec<Issue>) -> Vec<Issue> {
        if let Some(severity) = self.config.rule_severity(name) {
            for issue in &mut issues {
                issue.severity = severity;
            }
        }
        issues
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::ActionNode;
    use crate::scope::AnalysisScope;
    use crate::types::{Location, Severity};

    fn one_issue(ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        ctx.nodes()
            .iter()
            .map(|n| Issue::new("seen", Severity::Warning, "node").at(n.location.clone()))
            .collect()
    }

    fn info_issue(ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        ctx.nodes()
            .iter()
            .map(|n| Issue::new("note", Severity::Info, "node").at(n.location.clone()))
            .collect()
    }

    fn explode(_: &AnalysisContext<'_>) -> Vec<Issue> {
        panic!("boom")
    }

    fn nodes() -> Vec<ActionNode> {
        vec![ActionNode::handler("#a", "click", &[], Location::new("a.js", 1, 1))]
    }

    #[test]
    fn panicking_analyzer_is_isolated() {
        let mut registry = AnalyzerRegistry::new();
        registry.register_fn("explode", "T002", explode);
        registry.register_fn("seen", "T001", one_issue);
        let nodes = nodes();
        let ctx = AnalysisContext::nodes_only(&nodes, AnalysisScope::File);
        let outcome = registry.analyze(&ctx);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].analyzer, "explode");
        assert_eq!(outcome.failures[0].message, "boom");
    }

    #[test]
    fn config_disables_and_overrides() {
        let config = Config::parse(
            "[rules.seen]\nseverity = \"error\"\n[rules.note]\nenabled = false\n",
        )
        .expect("config");
        let registry = AnalyzerRegistry::new()
            .with(FnAnalyzer::new("seen", "T001", one_issue))
            .with(FnAnalyzer::new("note", "T003", info_issue))
            .with_config(config);
        let nodes = nodes();
        let ctx = AnalysisContext::nodes_only(&nodes, AnalysisScope::File);
        let output = registry.run(&ctx);
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].1[0].severity, Severity::Error);
    }

    #[test]
    fn min_severity_filters() {
        let config = Config::parse("min_severity = \"warning\"\n").expect("config");
        let registry = AnalyzerRegistry::new()
            .with(FnAnalyzer::new("seen", "T001", one_issue))
            .with(FnAnalyzer::new("note", "T003", info_issue))
            .with_config(config);
        let nodes = nodes();
        let ctx = AnalysisContext::nodes_only(&nodes, AnalysisScope::File);
        let outcome = registry.analyze(&ctx);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].issue_type, "seen");
        assert_eq!(registry.names(), vec!["seen", "note"]);
    }
}
