//! Analyzer for assertive live regions.
//!
//! # Rationale
//!
//! `aria-live="assertive"` interrupts whatever the screen reader is saying.
//! It suits urgent errors only; routine status updates belong in a `polite`
//! region or a `role="status"` element.
//!
//! # Detected Patterns
//!
//! - Script assigning `aria-live` the value `assertive`
//! - Markup declaring `aria-live="assertive"` (`role="alert"` is left alone)

use crate::support::{describe, unquote};
use a11y_lint_core::behavior::ActionKind;
use a11y_lint_core::{standards, AnalysisContext, Analyzer, Confidence, Fix, Issue, Severity};

/// Analyzer code for live-region.
pub const CODE: &str = "A11Y004";

/// Analyzer name for live-region.
pub const NAME: &str = "live-region";

/// Issue type.
pub const ASSERTIVE: &str = "assertive-live-region";

const FIX_DESCRIPTION: &str = "Use aria-live=\"polite\" unless the update is urgent";

/// Reports `aria-live="assertive"`.
#[derive(Debug, Clone, Default)]
pub struct LiveRegion;

impl LiveRegion {
    /// Creates a new analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_assertive(value: &str) -> bool {
    unquote(value).trim().eq_ignore_ascii_case("assertive")
}

impl Analyzer for LiveRegion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Assertive live regions interrupt screen reader output"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        &[ASSERTIVE]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for node in ctx.nodes() {
            let ActionKind::AriaStateChange { attribute, value } = &node.kind else {
                continue;
            };
            if attribute != "aria-live" || !is_assertive(value) {
                continue;
            }
            issues.push(
                Issue::new(
                    ASSERTIVE,
                    Severity::Warning,
                    format!(
                        "`{}` is made an assertive live region; announcements will interrupt the user",
                        node.binding.selector
                    ),
                )
                .with_standard(standards::STATUS_MESSAGES)
                .with_fix(Fix::new(FIX_DESCRIPTION, "el.setAttribute('aria-live', 'polite');"))
                .with_confidence(Confidence::certain("value assigned literally"))
                .at(node.location.clone()),
            );
        }
        if let Some(tree) = ctx.tree() {
            for element in tree
                .iter()
                .filter(|e| e.attr("aria-live").is_some_and(is_assertive))
            {
                issues.push(
                    Issue::new(
                        ASSERTIVE,
                        Severity::Warning,
                        format!("{} is an assertive live region", describe(element)),
                    )
                    .with_standard(standards::STATUS_MESSAGES)
                    .with_fix(Fix::new(FIX_DESCRIPTION, "aria-live=\"polite\""))
                    .with_confidence(Confidence::certain("declared in markup"))
                    .at(element.location.clone()),
                );
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, run_file, run_page, types};

    #[test]
    fn test_detects_assertive_assignment() {
        let issues = run_file(&LiveRegion::new(), "aria #status aria-live=assertive\n");
        assert_eq!(types(&issues), vec![ASSERTIVE]);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_quoted_value() {
        let issues = run_file(&LiveRegion::new(), "aria #status \"aria-live='assertive'\"\n");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_polite_is_fine() {
        assert!(run_file(&LiveRegion::new(), "aria #status aria-live=polite\n").is_empty());
    }

    #[test]
    fn test_markup_declaration() {
        let model = page("div id=log aria-live=assertive\ndiv role=alert\n", "", "");
        assert_eq!(run_page(&LiveRegion::new(), &model).len(), 1);
    }
}
