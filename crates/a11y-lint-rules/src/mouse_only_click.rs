//! Analyzer for click handlers without a keyboard equivalent.
//!
//! # Rationale
//!
//! A `click` listener on a non-native control fires for mouse users only.
//! Keyboard users need a `keydown`/`keyup` handler on the same element, or a
//! natively activatable element such as `<button>`.
//!
//! # Detected Patterns
//!
//! - A `click` handler whose target has no keyboard handler anywhere in the
//!   analyzed files
//!
//! Targets are compared by resolved element when markup is available, so a
//! keyboard handler in another behavior file of the same page counts. Without
//! markup, targets are compared by selector text and findings carry low
//! confidence.

use crate::support::describe;
use a11y_lint_core::{standards, AnalysisContext, Analyzer, Fix, Issue, Severity};

/// Analyzer code for mouse-only-click.
pub const CODE: &str = "A11Y002";

/// Analyzer name for mouse-only-click.
pub const NAME: &str = "mouse-only-click";

/// Issue type.
pub const MOUSE_ONLY_CLICK: &str = "mouse-only-click";

/// Reports click handlers that keyboard users cannot trigger.
#[derive(Debug, Clone, Default)]
pub struct MouseOnlyClick;

impl MouseOnlyClick {
    /// Creates a new analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for MouseOnlyClick {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Click handlers need a keyboard equivalent on the same element"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        &[MOUSE_ONLY_CLICK]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (_, group) in ctx.nodes_by_target() {
            if group.iter().any(|n| n.is_keyboard_handler()) {
                continue;
            }
            let target = group
                .first()
                .and_then(|n| n.binding.resolved)
                .and_then(|id| ctx.tree().and_then(|t| t.get(id)));
            if let Some(element) = target {
                if element.is_natively_activatable()
                    || ["keydown", "keyup", "keypress"]
                        .iter()
                        .any(|ev| element.has_inline_handler(ev))
                {
                    continue;
                }
            }
            for click in group.iter().filter(|n| n.event() == Some("click")) {
                let subject = target.map_or_else(
                    || format!("`{}`", click.binding.selector),
                    describe,
                );
                let mut issue = Issue::new(
                    MOUSE_ONLY_CLICK,
                    Severity::Warning,
                    format!("Click handler on {subject} has no keyboard equivalent"),
                )
                .with_standard(standards::KEYBOARD)
                .with_fix(Fix::new(
                    "Handle Enter and Space in a keydown listener, or use a <button>",
                    format!(
                        "document.querySelector('{}').addEventListener('keydown', (event) => {{\n  if (event.key === 'Enter' || event.key === ' ') activate(event);\n}});",
                        click.binding.selector
                    ),
                ))
                .with_confidence(ctx.confidence("keyboard handlers outside the analyzed files are not visible"))
                .at(click.location.clone());
                if let Some(element) = target {
                    issue = issue.at(element.location.clone());
                }
                issues.push(issue);
            }
        }
        issues
    }
}
