//! Analyzer for ARIA states that script sets once and never updates.
//!
//! # Rationale
//!
//! `aria-expanded`, `aria-pressed` and similar attributes describe state that
//! changes as the user interacts. A single assignment that is never revisited
//! leaves assistive technology announcing a stale state after the first
//! interaction.
//!
//! # Detected Patterns
//!
//! - Exactly one `ariaStateChange` for a state attribute on a target, with a
//!   literal value (`true`, `false`, `mixed`, ...). Assignments of a computed
//!   value (`!open`, `String(state)`) toggle by themselves and are skipped.
//!
//! Issue types are named after the attribute, e.g. `aria-expanded-static`.

use crate::support::unquote;
use a11y_lint_core::behavior::{ActionKind, BindingKey};
use a11y_lint_core::{standards, ActionNode, AnalysisContext, Analyzer, Fix, Issue, Severity};
use std::collections::BTreeMap;

/// Analyzer code for static-aria-state.
pub const CODE: &str = "A11Y003";

/// Analyzer name for static-aria-state.
pub const NAME: &str = "static-aria-state";

/// State attributes that are expected to change over time.
pub const STATE_ATTRIBUTES: &[&str] = &[
    "aria-busy",
    "aria-checked",
    "aria-current",
    "aria-disabled",
    "aria-expanded",
    "aria-grabbed",
    "aria-hidden",
    "aria-invalid",
    "aria-pressed",
    "aria-selected",
];

const ISSUE_TYPES: &[&str] = &[
    "aria-busy-static",
    "aria-checked-static",
    "aria-current-static",
    "aria-disabled-static",
    "aria-expanded-static",
    "aria-grabbed-static",
    "aria-hidden-static",
    "aria-invalid-static",
    "aria-pressed-static",
    "aria-selected-static",
];

/// Reports state attributes assigned exactly once.
#[derive(Debug, Clone, Default)]
pub struct StaticAriaState;

impl StaticAriaState {
    /// Creates a new analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Returns true if the assigned value is a literal rather than an expression.
fn is_literal(value: &str) -> bool {
    let value = unquote(value);
    matches!(value, "true" | "false" | "mixed" | "page" | "step" | "location" | "date" | "time" | "")
        || value.chars().all(|c| c.is_ascii_digit())
}

impl Analyzer for StaticAriaState {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "ARIA states set once and never updated go stale"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        ISSUE_TYPES
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let mut assignments: BTreeMap<(BindingKey, &str), Vec<&ActionNode>> = BTreeMap::new();
        for node in ctx.nodes() {
            if let ActionKind::AriaStateChange { attribute, .. } = &node.kind {
                if STATE_ATTRIBUTES.contains(&attribute.as_str()) {
                    assignments
                        .entry((node.binding.key(), attribute.as_str()))
                        .or_default()
                        .push(node);
                }
            }
        }

        let mut issues = Vec::new();
        for ((_, attribute), nodes) in assignments {
            let [node] = nodes.as_slice() else {
                continue;
            };
            let ActionKind::AriaStateChange { value, .. } = &node.kind else {
                continue;
            };
            if !is_literal(value) {
                continue;
            }
            issues.push(
                Issue::new(
                    format!("{attribute}-static"),
                    Severity::Warning,
                    format!(
                        "{attribute} on `{}` is set to {} once and never updated",
                        node.binding.selector,
                        unquote(value)
                    ),
                )
                .with_standard(standards::NAME_ROLE_VALUE)
                .with_fix(Fix::new(
                    format!("Update {attribute} wherever the state it describes changes"),
                    format!("el.setAttribute('{attribute}', String(isOn));"),
                ))
                .with_confidence(ctx.confidence("other assignments may exist outside the analyzed files"))
                .at(node.location.clone()),
            );
        }
        issues.sort_by(|a, b| a.locations.cmp(&b.locations));
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, run_file, run_page, types};

    #[test]
    fn test_single_assignment_is_static() {
        let issues = run_file(&StaticAriaState::new(), "aria #menu aria-expanded=false\n");
        assert_eq!(types(&issues), vec!["aria-expanded-static"]);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_reassignment_is_dynamic() {
        let issues = run_file(
            &StaticAriaState::new(),
            "aria #menu aria-expanded=true\naria #menu aria-expanded=false\n",
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_expression_value_is_dynamic() {
        let issues = run_file(&StaticAriaState::new(), "aria #menu aria-expanded=!open\n");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_counts_per_attribute_and_target() {
        let issues = run_file(
            &StaticAriaState::new(),
            "aria #a aria-pressed=true\naria #b aria-pressed=true\naria #a aria-label=Go\n",
        );
        assert_eq!(types(&issues), vec!["aria-pressed-static", "aria-pressed-static"]);
    }

    #[test]
    fn test_assignments_through_different_selectors_merge_on_page() {
        let model = page(
            "button id=menu class=toggle\n",
            "aria #menu aria-expanded=true\naria .toggle aria-expanded=false\n",
            "",
        );
        assert!(run_page(&StaticAriaState::new(), &model).is_empty());
    }
}
