//! Analyzer for style rules that remove the focus outline without a replacement.
//!
//! # Rationale
//!
//! `outline: none` on `:focus` is the most common way a page loses its
//! focus indicator. It is fine when another focus rule draws a ring, a
//! shadow or a border instead; it is a defect when nothing does.
//!
//! # Detected Patterns
//!
//! - A rule that removes the outline and matches at least one focusable
//!   element that no focus-state rule gives a visible indicator

use crate::support::describe;
use a11y_lint_core::resolver;
use a11y_lint_core::{standards, AnalysisContext, Analyzer, Element, Fix, Issue, Severity};

/// Analyzer code for focus-visible.
pub const CODE: &str = "A11Y008";

/// Analyzer name for focus-visible.
pub const NAME: &str = "focus-visible";

/// Issue type.
pub const INDICATOR_REMOVED: &str = "focus-indicator-removed";

/// Reports removed focus indicators.
#[derive(Debug, Clone, Default)]
pub struct FocusVisible;

impl FocusVisible {
    /// Creates a new analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for FocusVisible {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Focus outlines must not be removed without a visible replacement"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        &[INDICATOR_REMOVED]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let Some(model) = ctx.model() else {
            return Vec::new();
        };
        let mut issues = Vec::new();
        for (index, rule) in model.style.iter().enumerate() {
            if !rule.removes_outline() || rule.draws_indicator() {
                continue;
            }
            let Some(selectors) = rule.selector_list() else {
                continue;
            };
            let affected: Vec<&Element> = model
                .markup
                .iter()
                .filter(|e| e.is_focusable() && selectors.matches(&model.markup, e.id))
                .filter(|e| !resolver::has_focus_style(&model.markup, e.id, &model.style))
                .collect();
            let Some(first) = affected.first() else {
                continue;
            };
            let others = affected.len() - 1;
            let scope = if others == 0 {
                describe(first)
            } else {
                format!("{} and {others} other element(s)", describe(first))
            };
            issues.push(
                Issue::new(
                    INDICATOR_REMOVED,
                    Severity::Warning,
                    format!(
                        "`{}` removes the focus outline and leaves {scope} without a focus indicator",
                        rule.selector
                    ),
                )
                .with_standard(standards::FOCUS_VISIBLE)
                .with_fix(Fix::new(
                    "Draw a replacement indicator in a :focus-visible rule",
                    format!(
                        "{}:focus-visible {{\n  outline: 2px solid currentColor;\n  outline-offset: 2px;\n}}",
                        rule.selector.split(':').next().unwrap_or(&rule.selector).trim()
                    ),
                ))
                .with_confidence(ctx.confidence(format!(
                    "checked against {} style rule(s) of the page",
                    model.style.len()
                )))
                .with_detail(format!("rule-{index}"))
                .at(rule.location.clone())
                .at(first.location.clone()),
            );
        }
        issues
    }
}
