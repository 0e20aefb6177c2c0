//! Page builders for analyzer unit tests.

use a11y_lint_core::fixture::FixtureProducer;
use a11y_lint_core::{
    ActionNode, AnalysisContext, AnalysisScope, Analyzer, DocumentModel, DocumentModelBuilder,
    Issue, LeafProducer, PageSources, SourceText,
};
use std::path::Path;
use std::sync::Arc;

/// Builds a page-scope model from fixture markup, behavior and style.
pub(crate) fn page(markup: &str, behavior: &str, style: &str) -> DocumentModel {
    let mut sources = PageSources::new(SourceText::present("index.html", markup));
    if !behavior.is_empty() {
        sources = sources.behavior(SourceText::present("app.js", behavior));
    }
    if !style.is_empty() {
        sources = sources.style(SourceText::present("site.css", style));
    }
    DocumentModelBuilder::new(Arc::new(FixtureProducer))
        .build(&sources, AnalysisScope::Page)
        .expect("fixture page builds")
}

/// Parses a fixture behavior file on its own.
pub(crate) fn nodes(behavior: &str) -> Vec<ActionNode> {
    FixtureProducer
        .parse_behavior(Path::new("app.js"), behavior)
        .expect("fixture behavior parses")
}

/// Runs one analyzer over a page model.
pub(crate) fn run_page(analyzer: &dyn Analyzer, model: &DocumentModel) -> Vec<Issue> {
    analyzer.analyze(&AnalysisContext::for_model(model))
}

/// Runs one analyzer over a lone behavior file.
pub(crate) fn run_file(analyzer: &dyn Analyzer, behavior: &str) -> Vec<Issue> {
    let nodes = nodes(behavior);
    analyzer.analyze(&AnalysisContext::nodes_only(&nodes, AnalysisScope::File))
}

/// Issue types in output order.
pub(crate) fn types(issues: &[Issue]) -> Vec<&str> {
    issues.iter().map(|i| i.issue_type.as_str()).collect()
}
