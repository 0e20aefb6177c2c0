//! Analyzer contract.

use crate::behavior::{ActionNode, BindingKey, ACTIVATION_EVENTS};
use crate::dom::{ElementId, ElementTree};
use crate::model::DocumentModel;
use crate::scope::AnalysisScope;
use crate::types::{Confidence, Issue, Severity};

/// Input handed to every analyzer.
///
/// Either a full page model, or only the actions of a single behavior file
/// when no markup is available.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    model: Option<&'a DocumentModel>,
    nodes: &'a [ActionNode],
    scope: AnalysisScope,
}

impl<'a> AnalysisContext<'a> {
    /// Context over a built page model, at the model's scope.
    #[must_use]
    pub fn for_model(model: &'a DocumentModel) -> Self {
        Self {
            model: Some(model),
            nodes: &model.behavior,
            scope: model.scope,
        }
    }

    /// Context over a bare action list, without markup.
    #[must_use]
    pub fn nodes_only(nodes: &'a [ActionNode], scope: AnalysisScope) -> Self {
        Self {
            model: None,
            nodes,
            scope,
        }
    }

    /// The page model, if any.
    #[must_use]
    pub fn model(&self) -> Option<&'a DocumentModel> {
        self.model
    }

    /// The markup tree, if any.
    #[must_use]
    pub fn tree(&self) -> Option<&'a ElementTree> {
        self.model.map(|m| &m.markup)
    }

    /// All actions in order.
    #[must_use]
    pub fn nodes(&self) -> &'a [ActionNode] {
        self.nodes
    }

    /// How much context is available.
    #[must_use]
    pub fn scope(&self) -> AnalysisScope {
        self.scope
    }

    /// Confidence for a finding that depends on cross-file context.
    #[must_use]
    pub fn confidence(&self, reason: impl Into<String>) -> Confidence {
        Confidence::for_scope(self.scope, reason)
    }

    /// Actions that target the same element as `node`.
    pub fn nodes_on_same_target(&self, node: &'a ActionNode) -> impl Iterator<Item = &'a ActionNode> {
        let key = node.binding.key();
        self.nodes.iter().filter(move |n| n.binding.key() == key)
    }

    /// Actions grouped by target, in first-appearance order.
    #[must_use]
    pub fn nodes_by_target(&self) -> Vec<(BindingKey, Vec<&'a ActionNode>)> {
        let mut groups: Vec<(BindingKey, Vec<&'a ActionNode>)> = Vec::new();
        for node in self.nodes {
            let key = node.binding.key();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(node),
                None => groups.push((key, vec![node])),
            }
        }
        groups
    }

    /// Actions resolved to `id`.
    pub fn nodes_on(&self, id: ElementId) -> impl Iterator<Item = &'a ActionNode> {
        self.nodes
            .iter()
            .filter(move |n| n.binding.resolved == Some(id))
    }

    /// Returns true if a handler able to activate the element is bound to it,
    /// either by script or as an inline `on*` attribute.
    #[must_use]
    pub fn has_activation_handler(&self, id: ElementId) -> bool {
        if self.nodes_on(id).any(ActionNode::is_activation_handler) {
            return true;
        }
        self.tree()
            .and_then(|t| t.get(id))
            .is_some_and(|e| ACTIVATION_EVENTS.iter().any(|ev| e.has_inline_handler(ev)))
    }
}

/// A rule module that inspects one page.
///
/// Analyzers are stateless between calls and must return an empty list,
/// never panic, for inputs they do not recognize.
pub trait Analyzer: Send + Sync {
    /// Kebab-case name, e.g. `interactive-role`.
    fn name(&self) -> &'static str;

    /// Short code, e.g. `A11Y001`.
    fn code(&self) -> &'static str;

    /// One-line description.
    fn description(&self) -> &'static str {
        ""
    }

    /// Default severity of the analyzer's most serious issue type.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Issue types this analyzer can emit.
    fn issue_types(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether suppressing this analyzer's errors needs a written reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Inspects the context.
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue>;
}

/// Boxed analyzer.
pub type AnalyzerBox = Box<dyn Analyzer>;

/// Signature of a plain analyzer function.
pub type AnalyzerFn = fn(&AnalysisContext<'_>) -> Vec<Issue>;

/// Adapts a plain function to [`Analyzer`].
#[derive(Debug, Clone, Copy)]
pub struct FnAnalyzer {
    name: &'static str,
    code: &'static str,
    description: &'static str,
    severity: Severity,
    func: AnalyzerFn,
}

impl FnAnalyzer {
    /// Wraps `func` under the given name and code.
    #[must_use]
    pub fn new(name: &'static str, code: &'static str, func: AnalyzerFn) -> Self {
        Self {
            name,
            code,
            description: "",
            severity: Severity::Warning,
            func,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the default severity.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Analyzer for FnAnalyzer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn code(&self) -> &'static str {
        self.code
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        (self.func)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementTreeBuilder;
    use crate::model::SourceFiles;
    use crate::types::{ConfidenceLevel, Location};

    fn count_nodes(ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        ctx.nodes()
            .iter()
            .map(|n| Issue::new("node", Severity::Info, "seen").at(n.location.clone()))
            .collect()
    }

    #[test]
    fn fn_analyzer_delegates() {
        let analyzer = FnAnalyzer::new("count", "T001", count_nodes).severity(Severity::Info);
        let nodes = vec![ActionNode::handler("#a", "click", &[], Location::new("a.js", 1, 1))];
        let ctx = AnalysisContext::nodes_only(&nodes, AnalysisScope::File);
        assert_eq!(analyzer.analyze(&ctx).len(), 1);
        assert_eq!(analyzer.name(), "count");
        assert!(!analyzer.requires_allow_reason());
    }

    #[test]
    fn confidence_follows_scope() {
        let ctx = AnalysisContext::nodes_only(&[], AnalysisScope::Page);
        assert_eq!(ctx.confidence("x").level, ConfidenceLevel::Medium);
    }

    #[test]
    fn groups_by_resolved_target() {
        let mut b = ElementTreeBuilder::new();
        b.leaf("button", [("id", "go"), ("class", "primary")], Location::new("i.html", 1, 1));
        let nodes = vec![
            vec![ActionNode::handler("#go", "click", &[], Location::new("a.js", 1, 1))],
            vec![ActionNode::handler(".primary", "keydown", &["Enter"], Location::new("b.js", 1, 1))],
        ];
        let model = DocumentModel::assemble(
            b.finish(),
            nodes,
            vec![],
            SourceFiles::markup_only("i.html"),
            AnalysisScope::Page,
        );
        let ctx = AnalysisContext::for_model(&model);
        let groups = ctx.nodes_by_target();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1.len(), 2);
        assert!(ctx.has_activation_handler(ElementId(0)));
    }

    #[test]
    fn unresolved_targets_group_by_selector() {
        let nodes = vec![
            ActionNode::handler("#go", "click", &[], Location::new("a.js", 1, 1)),
            ActionNode::handler(".primary", "keydown", &["Enter"], Location::new("a.js", 2, 1)),
        ];
        let ctx = AnalysisContext::nodes_only(&nodes, AnalysisScope::File);
        assert_eq!(ctx.nodes_by_target().len(), 2);
        assert_eq!(ctx.nodes_on_same_target(&nodes[0]).count(), 1);
    }
}
