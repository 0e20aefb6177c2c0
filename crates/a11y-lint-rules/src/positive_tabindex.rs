//! Analyzer for positive `tabindex` values.
//!
//! # Rationale
//!
//! A positive `tabindex` pulls an element ahead of everything else in the
//! tab sequence, so focus order no longer follows reading order.
//!
//! # Detected Patterns
//!
//! - `tabindex` greater than zero in markup
//! - Script assigning a positive `tabindex`

use crate::support::{describe, unquote};
use a11y_lint_core::behavior::ActionKind;
use a11y_lint_core::{standards, AnalysisContext, Analyzer, Confidence, Fix, Issue, Severity};

/// Analyzer code for positive-tabindex.
pub const CODE: &str = "A11Y010";

/// Analyzer name for positive-tabindex.
pub const NAME: &str = "positive-tabindex";

/// Issue type.
pub const POSITIVE_TABINDEX: &str = "positive-tabindex";

const FIX_DESCRIPTION: &str = "Use tabindex=\"0\" and order the markup to match the intended focus order";

/// Reports positive tab indices.
#[derive(Debug, Clone, Default)]
pub struct PositiveTabindex;

impl PositiveTabindex {
    /// Creates a new analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for PositiveTabindex {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Positive tabindex values override the natural focus order"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        &[POSITIVE_TABINDEX]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        if let Some(tree) = ctx.tree() {
            for element in tree.iter() {
                let Some(index) = element.tabindex().filter(|i| *i > 0) else {
                    continue;
                };
                issues.push(
                    Issue::new(
                        POSITIVE_TABINDEX,
                        Severity::Warning,
                        format!("{} has tabindex=\"{index}\"", describe(element)),
                    )
                    .with_standard(standards::FOCUS_ORDER)
                    .with_fix(Fix::new(FIX_DESCRIPTION, "tabindex=\"0\""))
                    .with_confidence(Confidence::certain("declared in markup"))
                    .at(element.location.clone()),
                );
            }
        }
        for node in ctx.nodes() {
            let ActionKind::AriaStateChange { attribute, value } = &node.kind else {
                continue;
            };
            let positive = attribute == "tabindex"
                && unquote(value).trim().parse::<i32>().is_ok_and(|i| i > 0);
            if !positive {
                continue;
            }
            issues.push(
                Issue::new(
                    POSITIVE_TABINDEX,
                    Severity::Warning,
                    format!(
                        "`{}` is given tabindex {}",
                        node.binding.selector,
                        unquote(value).trim()
                    ),
                )
                .with_standard(standards::FOCUS_ORDER)
                .with_fix(Fix::new(FIX_DESCRIPTION, "el.tabIndex = 0;"))
                .with_confidence(Confidence::certain("value assigned literally"))
                .at(node.location.clone()),
            );
        }
        issues
    }
}
