//! Analyzer for content removal and hiding that ignores keyboard focus.
//!
//! # Rationale
//!
//! Removing or hiding the element that holds focus drops focus onto the
//! document body: keyboard users lose their place and screen readers go
//! silent. Closing a dialog must also send focus back to the control that
//! opened it.
//!
//! # Detected Patterns
//!
//! - `removal-without-focus-management`: an element removed with no focus
//!   action within the line window in the same file
//! - `hiding-without-focus-management`: an element hidden via `display`,
//!   `visibility`, an inline hiding style or a class toggle, with no focus
//!   action within the line window
//! - `focus-restoration-missing`: a dialog hidden or removed with no
//!   restoration of a saved prior focus within the line window
//!
//! # Configuration
//!
//! - `line_window`: Lines either side of the mutation searched for focus
//!   handling (default: 5)

use a11y_lint_core::behavior::{ActionKind, DomOperation, FocusOperation};
use a11y_lint_core::{standards, ActionNode, AnalysisContext, Analyzer, Fix, Issue, Severity};

/// Analyzer code for focus-management.
pub const CODE: &str = "A11Y005";

/// Analyzer name for focus-management.
pub const NAME: &str = "focus-management";

/// Issue type for removals.
pub const REMOVAL: &str = "removal-without-focus-management";

/// Issue type for hiding.
pub const HIDING: &str = "hiding-without-focus-management";

/// Issue type for dialogs that do not restore focus.
pub const RESTORATION: &str = "focus-restoration-missing";

/// Default line window.
pub const DEFAULT_LINE_WINDOW: usize = 5;

const DIALOG_ROLES: &[&str] = &["dialog", "alertdialog"];

const MOVE_FOCUS_TEMPLATE: &str = "\
if (el.contains(document.activeElement)) {
  fallback.focus();
}
el.remove();";

const RESTORE_TEMPLATE: &str = "\
const opener = document.activeElement;
// ... open the dialog
dialog.hidden = true;
opener.focus();";

/// Reports DOM mutations that can strand keyboard focus.
#[derive(Debug, Clone)]
pub struct FocusManagement {
    line_window: usize,
}

impl Default for FocusManagement {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusManagement {
    /// Creates a new analyzer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_window: DEFAULT_LINE_WINDOW,
        }
    }

    /// Sets the number of lines searched around each mutation.
    #[must_use]
    pub fn line_window(mut self, lines: usize) -> Self {
        self.line_window = lines;
        self
    }

    /// Returns the configured line window.
    #[must_use]
    pub fn window(&self) -> usize {
        self.line_window
    }

    fn nearby_focus<'a>(&self, ctx: &AnalysisContext<'a>, node: &ActionNode) -> Vec<&'a FocusOperation> {
        ctx.nodes()
            .iter()
            .filter(|n| n.location.is_near(&node.location, self.line_window))
            .filter_map(|n| match &n.kind {
                ActionKind::FocusChange { operation } => Some(operation),
                _ => None,
            })
            .collect()
    }
}

/// What a mutation does to its target's visibility.
enum Disappearance {
    Removed,
    Hidden,
}

fn disappearance(operation: &DomOperation) -> Option<Disappearance> {
    match operation {
        DomOperation::Remove => Some(Disappearance::Removed),
        DomOperation::Hide { .. } => Some(Disappearance::Hidden),
        DomOperation::SetStyle { property, value } => {
            let value = value.trim().to_ascii_lowercase();
            let hides = match property.trim().to_ascii_lowercase().as_str() {
                "display" => value == "none",
                "visibility" => value == "hidden" || value == "collapse",
                _ => false,
            };
            hides.then_some(Disappearance::Hidden)
        }
        // The hiding class may come from a stylesheet outside the page.
        DomOperation::ToggleClass { .. } => Some(Disappearance::Hidden),
        DomOperation::Show | DomOperation::Insert => None,
    }
}

/// Returns true if the target looks like a dialog.
fn is_dialog_target(ctx: &AnalysisContext<'_>, node: &ActionNode) -> bool {
    let resolved = node
        .binding
        .resolved
        .and_then(|id| ctx.tree().and_then(|t| t.get(id)));
    match resolved {
        Some(element) => element
            .role()
            .is_some_and(|role| DIALOG_ROLES.contains(&role.as_str()))
            || element.tag == "dialog",
        None => {
            let selector = node.binding.selector.to_ascii_lowercase();
            selector.contains("dialog") || selector.contains("modal")
        }
    }
}

impl Analyzer for FocusManagement {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Removing or hiding content must manage keyboard focus"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        &[REMOVAL, HIDING, RESTORATION]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let saved: Vec<&str> = ctx
            .nodes()
            .iter()
            .filter_map(|n| match &n.kind {
                ActionKind::FocusChange {
                    operation: FocusOperation::SavePrevious { variable },
                } => Some(variable.as_str()),
                _ => None,
            })
            .collect();

        let mut issues = Vec::new();
        for node in ctx.nodes() {
            let ActionKind::DomManipulation { operation } = &node.kind else {
                continue;
            };
            let Some(kind) = disappearance(operation) else {
                continue;
            };
            let nearby = self.nearby_focus(ctx, node);

            if nearby.is_empty() {
                let (issue_type, verb) = match kind {
                    Disappearance::Removed => (REMOVAL, "removed"),
                    Disappearance::Hidden => (HIDING, "hidden"),
                };
                issues.push(
                    Issue::new(
                        issue_type,
                        Severity::Warning,
                        format!(
                            "`{}` is {verb} without checking or moving keyboard focus",
                            node.binding.selector
                        ),
                    )
                    .with_standard(standards::FOCUS_ORDER)
                    .with_fix(Fix::new(
                        "Move focus to a sensible target before the element disappears",
                        MOVE_FOCUS_TEMPLATE,
                    ))
                    .with_confidence(ctx.confidence("focus handling may live in a helper elsewhere"))
                    .at(node.location.clone()),
                );
            }

            if is_dialog_target(ctx, node) {
                let restores = nearby.iter().any(|op| match op {
                    FocusOperation::RestorePrevious { variable } => {
                        saved.contains(&variable.as_str())
                    }
                    _ => false,
                });
                if !restores {
                    issues.push(
                        Issue::new(
                            RESTORATION,
                            Severity::Warning,
                            format!(
                                "Dialog `{}` closes without returning focus to its opener",
                                node.binding.selector
                            ),
                        )
                        .with_standard(standards::FOCUS_ORDER)
                        .with_standard("APG-dialog")
                        .with_fix(Fix::new(
                            "Save document.activeElement when opening and focus it again on close",
                            RESTORE_TEMPLATE,
                        ))
                        .with_confidence(ctx.confidence("restoration may happen outside the analyzed files"))
                        .at(node.location.clone()),
                    );
                }
            }
        }
        issues
    }
}
