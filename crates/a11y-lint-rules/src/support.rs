//! Lookups shared by several analyzers.

use a11y_lint_core::behavior::ActionKind;
use a11y_lint_core::{ActionNode, AnalysisContext, Element, ElementId};

/// Selectors that stand for the whole document rather than one element.
const DOCUMENT_SELECTORS: &[&str] = &["document", "window", "body", "html", "document.body"];

/// Returns true if the action is bound to the document as a whole.
pub(crate) fn is_document_binding(ctx: &AnalysisContext<'_>, node: &ActionNode) -> bool {
    if DOCUMENT_SELECTORS.contains(&node.binding.selector.trim()) {
        return true;
    }
    let target = node
        .binding
        .resolved
        .and_then(|id| ctx.tree().and_then(|t| t.get(id)));
    target.is_some_and(|e| matches!(e.tag.as_str(), "body" | "html"))
}

/// Strips one level of matching quotes from a script value.
pub(crate) fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Keyboard handlers bound to `id` or any of its descendants.
pub(crate) fn keyboard_handlers_within<'a>(
    ctx: &AnalysisContext<'a>,
    id: ElementId,
) -> Vec<&'a ActionNode> {
    let Some(tree) = ctx.tree() else {
        return Vec::new();
    };
    ctx.nodes()
        .iter()
        .filter(|n| n.is_keyboard_handler())
        .filter(|n| {
            n.binding
                .resolved
                .is_some_and(|target| target == id || tree.is_ancestor(id, target))
        })
        .collect()
}

/// Returns true if any handler tests for `key`.
pub(crate) fn any_handles(handlers: &[&ActionNode], key: &str) -> bool {
    handlers.iter().any(|n| n.handles_key(key))
}

/// Returns true if script assigns `attribute` on the element.
pub(crate) fn script_sets(ctx: &AnalysisContext<'_>, id: ElementId, attribute: &str) -> bool {
    ctx.nodes_on(id).any(|n| {
        matches!(&n.kind, ActionKind::AriaStateChange { attribute: a, .. } if a == attribute)
    })
}

/// Returns true if the element has the attribute in markup or gets it from script.
pub(crate) fn has_state(ctx: &AnalysisContext<'_>, element: &Element, attribute: &str) -> bool {
    element.has_attr(attribute) || script_sets(ctx, element.id, attribute)
}

/// Human-readable handle for an element in messages.
pub(crate) fn describe(element: &Element) -> String {
    use std::fmt::Write;
    let mut text = format!("<{}", element.tag);
    if let Some(id) = element.dom_id() {
        let _ = write!(text, " id=\"{id}\"");
    }
    if let Some(role) = element.attr("role") {
        let _ = write!(text, " role=\"{role}\"");
    }
    text.push('>');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_strips_one_level() {
        assert_eq!(unquote("'assertive'"), "assertive");
        assert_eq!(unquote("\"polite\""), "polite");
        assert_eq!(unquote("`x`"), "x");
        assert_eq!(unquote("isOpen"), "isOpen");
        assert_eq!(unquote("'half\""), "'half\"");
    }
}
