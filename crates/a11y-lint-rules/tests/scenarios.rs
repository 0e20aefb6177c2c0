//! End-to-end checks of the built-in analyzers over fixture pages.

use a11y_lint_core::fixture::FixtureProducer;
use a11y_lint_core::{
    standards, AnalysisContext, AnalysisScope, Analyzer, AnalyzerRegistry, Config,
    ConfidenceLevel, DocumentModel, DocumentModelBuilder, ElementTree, Issue, LeafProducer,
    PageSources, Severity, SourceText,
};
use a11y_lint_rules::{all_analyzers, registry, MouseOnlyClick, WidgetPatterns};
use std::path::Path;
use std::sync::Arc;

fn builder() -> DocumentModelBuilder {
    DocumentModelBuilder::new(Arc::new(FixtureProducer))
}

fn build(markup: &str, behavior: &[(&str, &str)], scope: AnalysisScope) -> DocumentModel {
    let mut sources = PageSources::new(SourceText::present("index.html", markup));
    for (path, text) in behavior {
        sources = sources.behavior(SourceText::present(*path, *text));
    }
    builder().build(&sources, scope).unwrap()
}

fn strict() -> AnalyzerRegistry {
    registry(Config::parse("preset = \"strict\"").unwrap())
}

fn of_type<'a>(issues: &'a [Issue], issue_type: &str) -> Vec<&'a Issue> {
    issues.iter().filter(|i| i.issue_type == issue_type).collect()
}

#[test]
fn static_button_role_is_one_error() {
    let model = build("div id=b role=button\n", &[], AnalysisScope::Page);
    let outcome = strict().analyze(&AnalysisContext::for_model(&model));
    let found = of_type(&outcome.issues, "interactive-role-static");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Error);
    assert!(found[0].standard_refs.iter().any(|r| r == standards::KEYBOARD));
}

#[test]
fn click_handler_satisfies_button_role() {
    let model = build(
        "div id=b role=button\n",
        &[("app.js", "on click #b\n")],
        AnalysisScope::Page,
    );
    let outcome = strict().analyze(&AnalysisContext::for_model(&model));
    assert!(of_type(&outcome.issues, "interactive-role-static").is_empty());
}

#[test]
fn assertive_live_region_once() {
    let nodes = FixtureProducer
        .parse_behavior(Path::new("status.js"), "aria #status aria-live=assertive\n")
        .unwrap();
    let outcome = strict().analyze(&AnalysisContext::nodes_only(&nodes, AnalysisScope::File));
    let found = of_type(&outcome.issues, "assertive-live-region");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Warning);
}

#[test]
fn keyboard_handler_in_another_file_prevents_false_positive() {
    let click = "on click #save\n";
    let keys = "on keydown #save keys=Enter,Space\n";
    let model = build(
        "div id=save tabindex=0\n",
        &[("a.js", click), ("b.js", keys)],
        AnalysisScope::Page,
    );
    let page_issues = MouseOnlyClick::new().analyze(&AnalysisContext::for_model(&model));
    assert!(page_issues.is_empty());

    let alone = FixtureProducer.parse_behavior(Path::new("a.js"), click).unwrap();
    let file_issues =
        MouseOnlyClick::new().analyze(&AnalysisContext::nodes_only(&alone, AnalysisScope::File));
    assert_eq!(file_issues.len(), 1);
    assert_eq!(file_issues[0].confidence_level(), Some(ConfidenceLevel::Low));
}

#[test]
fn tablist_checklist_until_complete() {
    let analyze = |markup: &str, behavior: &str| {
        let files: Vec<(&str, &str)> = if behavior.is_empty() {
            Vec::new()
        } else {
            vec![("tabs.js", behavior)]
        };
        let model = build(markup, &files, AnalysisScope::Page);
        WidgetPatterns::new().analyze(&AnalysisContext::for_model(&model))
    };

    let bare = analyze("div id=tablist role=tablist\n", "");
    assert!(bare.iter().any(|i| {
        i.issue_type == "incomplete-tabs-pattern" && i.detail.as_deref() == Some("tab-children")
    }));

    let one_tab = analyze("div id=tablist role=tablist\n  button role=tab\n", "");
    assert_eq!(one_tab.len(), 1);
    assert_eq!(one_tab[0].detail.as_deref(), Some("arrow-key-navigation"));

    let complete = analyze(
        "div id=tablist role=tablist\n  button role=tab\n",
        "on keydown #tablist keys=ArrowLeft,ArrowRight\n",
    );
    assert!(complete.is_empty());
}

#[test]
fn analyzers_return_nothing_for_empty_input() {
    let empty = DocumentModel::markup_only("index.html", ElementTree::new(), AnalysisScope::Page);
    for analyzer in all_analyzers() {
        assert!(
            analyzer.analyze(&AnalysisContext::nodes_only(&[], AnalysisScope::File)).is_empty(),
            "{} reported on no nodes",
            analyzer.name()
        );
        assert!(
            analyzer.analyze(&AnalysisContext::for_model(&empty)).is_empty(),
            "{} reported on an empty tree",
            analyzer.name()
        );
    }
}

#[test]
fn wider_context_never_lowers_confidence() {
    let behavior = "on click #save\nremove #toast\non keydown document keys=s\n";
    let nodes = FixtureProducer
        .parse_behavior(Path::new("app.js"), behavior)
        .unwrap();
    let model = build(
        "span id=save\ndiv id=toast\n",
        &[("app.js", behavior)],
        AnalysisScope::Project,
    );

    for analyzer in all_analyzers() {
        let narrow = analyzer.analyze(&AnalysisContext::nodes_only(&nodes, AnalysisScope::File));
        let wide = analyzer.analyze(&AnalysisContext::for_model(&model));
        for issue in &narrow {
            let Some(upgraded) = wide.iter().find(|w| {
                w.primary_location() == issue.primary_location() && w.detail == issue.detail
            }) else {
                continue;
            };
            assert_eq!(upgraded.issue_type, issue.issue_type);
            assert!(upgraded.confidence_level() >= issue.confidence_level());
        }
    }
    let wide = registry(Config::default()).analyze(&AnalysisContext::for_model(&model));
    assert!(wide
        .issues
        .iter()
        .all(|i| i.confidence_level() == Some(ConfidenceLevel::High)));
}

#[test]
fn same_inputs_same_issues() {
    let markup = "div id=menu role=menu\n  div role=menuitem\nspan id=go\n";
    let behavior = [("app.js", "on click #go\nhide #menu\naria #menu aria-expanded=false\n")];
    let first = build(markup, &behavior, AnalysisScope::Page);
    let second = build(markup, &behavior, AnalysisScope::Page);
    assert_eq!(first, second);

    let registry = strict();
    let a = registry.analyze(&AnalysisContext::for_model(&first)).issues;
    let b = registry.analyze(&AnalysisContext::for_model(&second)).issues;
    assert!(!a.is_empty());
    assert_eq!(a, b);
}
