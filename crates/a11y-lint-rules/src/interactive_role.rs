//! Analyzer for elements that claim an interactive role but cannot be operated.
//!
//! # Rationale
//!
//! `role="button"` on a `<div>` tells assistive technology that the element
//! is a button, but the browser adds no behavior. Unless script binds an
//! activation handler, keyboard and screen reader users meet a control that
//! does nothing.
//!
//! # Detected Patterns
//!
//! - `interactive-role-static`: an element with an interactive role, not
//!   natively activatable, with no click or key handler bound to it or to
//!   an ancestor (event delegation)
//! - `missing-required-aria`: a role whose state attribute is required
//!   (e.g. `checkbox` needs `aria-checked`) without that attribute in
//!   markup or script
//!
//! # Configuration
//!
//! - `check_required_states`: also report `missing-required-aria` (default: true)

use crate::support::{describe, has_state};
use a11y_lint_core::{standards, AnalysisContext, Analyzer, Element, Fix, Issue, Severity};

/// Analyzer code for interactive-role.
pub const CODE: &str = "A11Y001";

/// Analyzer name for interactive-role.
pub const NAME: &str = "interactive-role";

/// Issue type for a role without any handler.
pub const STATIC: &str = "interactive-role-static";

/// Issue type for a role without its required state.
pub const MISSING_REQUIRED_ARIA: &str = "missing-required-aria";

/// Roles the user types into rather than activates.
const TEXT_ENTRY_ROLES: &[&str] = &["textbox", "searchbox"];

/// State attributes each role requires.
const REQUIRED_STATES: &[(&str, &[&str])] = &[
    ("checkbox", &["aria-checked"]),
    ("radio", &["aria-checked"]),
    ("switch", &["aria-checked"]),
    ("menuitemcheckbox", &["aria-checked"]),
    ("menuitemradio", &["aria-checked"]),
    ("slider", &["aria-valuenow"]),
    ("scrollbar", &["aria-valuenow", "aria-controls"]),
    ("combobox", &["aria-expanded"]),
];

const HANDLER_TEMPLATE: &str = "\
el.addEventListener('click', activate);
el.addEventListener('keydown', (event) => {
  if (event.key === 'Enter' || event.key === ' ') {
    event.preventDefault();
    activate(event);
  }
});";

/// Reports interactive roles that nothing makes interactive.
#[derive(Debug, Clone)]
pub struct InteractiveRole {
    check_required_states: bool,
}

impl Default for InteractiveRole {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractiveRole {
    /// Creates a new analyzer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            check_required_states: true,
        }
    }

    /// Sets whether missing required states are reported.
    #[must_use]
    pub fn check_required_states(mut self, check: bool) -> Self {
        self.check_required_states = check;
        self
    }
}

fn check_handler(ctx: &AnalysisContext<'_>, element: &Element, role: &str) -> Option<Issue> {
    if element.is_natively_activatable()
        || element.has_attr("contenteditable")
        || TEXT_ENTRY_ROLES.contains(&role)
    {
        return None;
    }
    let tree = ctx.tree()?;
    let reachable = tree
        .self_and_ancestors(element.id)
        .any(|e| ctx.has_activation_handler(e.id));
    if reachable {
        return None;
    }
    Some(
        Issue::new(
            STATIC,
            Severity::Error,
            format!(
                "{} has role \"{role}\" but no click or keyboard handler is bound to it",
                describe(element)
            ),
        )
        .with_standard(standards::KEYBOARD)
        .with_standard(standards::NAME_ROLE_VALUE)
        .with_fix(Fix::new(
            "Bind click and Enter/Space handlers, or use a native <button>",
            HANDLER_TEMPLATE,
        ))
        .with_confidence(ctx.confidence("no activation handler found in the analyzed files"))
        .at(element.location.clone()),
    )
}

fn check_states(ctx: &AnalysisContext<'_>, element: &Element, role: &str) -> Vec<Issue> {
    let Some((_, required)) = REQUIRED_STATES.iter().find(|(r, _)| *r == role) else {
        return Vec::new();
    };
    required
        .iter()
        .filter(|attribute| !has_native_state(element, attribute))
        .filter(|attribute| !has_state(ctx, element, attribute))
        .map(|attribute| {
            Issue::new(
                MISSING_REQUIRED_ARIA,
                Severity::Error,
                format!(
                    "{} has role \"{role}\" but no {attribute} attribute",
                    describe(element)
                ),
            )
            .with_standard(standards::NAME_ROLE_VALUE)
            .with_fix(Fix::new(
                format!("Declare {attribute} and keep it in sync with the widget state"),
                format!("{attribute}=\"false\""),
            ))
            .with_confidence(ctx.confidence("attribute absent from markup and analyzed scripts"))
            .with_detail(*attribute)
            .at(element.location.clone())
        })
        .collect()
}

/// Native form controls expose some states without ARIA.
fn has_native_state(element: &Element, attribute: &str) -> bool {
    if element.tag != "input" {
        return false;
    }
    let kind = element.attr("type").unwrap_or("text");
    match attribute {
        "aria-checked" => matches!(kind, "checkbox" | "radio"),
        "aria-valuenow" => kind == "range",
        _ => false,
    }
}

impl Analyzer for InteractiveRole {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Interactive ARIA roles need an activation handler and their required states"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn issue_types(&self) -> &'static [&'static str] {
        &[STATIC, MISSING_REQUIRED_ARIA]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let Some(tree) = ctx.tree() else {
            return Vec::new();
        };
        let mut issues = Vec::new();
        for element in tree.iter().filter(|e| e.has_interactive_role()) {
            let Some(role) = element.role() else {
                continue;
            };
            issues.extend(check_handler(ctx, element, &role));
            if self.check_required_states {
                issues.extend(check_states(ctx, element, &role));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, run_page, types};

    #[test]
    fn test_detects_static_button_role() {
        let model = page("main\n  div id=save role=button\n", "", "");
        let issues = run_page(&InteractiveRole::new(), &model);
        assert_eq!(types(&issues), vec![STATIC]);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].standard_refs.contains(&standards::KEYBOARD.to_string()));
    }

    #[test]
    fn test_click_handler_satisfies() {
        let model = page("main\n  div id=save role=button\n", "on click #save\n", "");
        assert!(run_page(&InteractiveRole::new(), &model).is_empty());
    }

    #[test]
    fn test_delegated_and_inline_handlers_satisfy() {
        let markup = "\
ul id=list role=listbox
  li role=option aria-selected=false
div role=button \"onclick=go()\"
";
        let model = page(markup, "on click #list\n", "");
        assert!(run_page(&InteractiveRole::new(), &model).is_empty());
    }

    #[test]
    fn test_native_controls_are_exempt() {
        let model = page("button role=switch aria-checked=false\na href=/x role=button\n", "", "");
        assert!(run_page(&InteractiveRole::new(), &model).is_empty());
    }

    #[test]
    fn test_missing_required_state() {
        let markup = "\
div id=agree role=checkbox
div id=volume role=slider
";
        let model = page(markup, "on click #agree\non keydown #volume keys=ArrowLeft,ArrowRight\n", "");
        let issues = run_page(&InteractiveRole::new(), &model);
        assert_eq!(types(&issues), vec![MISSING_REQUIRED_ARIA, MISSING_REQUIRED_ARIA]);
        assert_eq!(issues[0].detail.as_deref(), Some("aria-checked"));
        assert_eq!(issues[1].detail.as_deref(), Some("aria-valuenow"));
    }

    #[test]
    fn test_script_assigned_state_counts() {
        let model = page(
            "div id=agree role=checkbox\n",
            "on click #agree\naria #agree aria-checked=true\n",
            "",
        );
        assert!(run_page(&InteractiveRole::new(), &model).is_empty());
    }

    #[test]
    fn test_required_state_check_can_be_disabled() {
        let model = page("div id=agree role=checkbox \"onclick=toggle()\"\n", "", "");
        let analyzer = InteractiveRole::new().check_required_states(false);
        assert!(run_page(&analyzer, &model).is_empty());
    }
}
