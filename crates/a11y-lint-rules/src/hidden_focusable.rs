//! Analyzer for focusable elements that users cannot perceive.
//!
//! # Rationale
//!
//! An element that receives focus but is hidden from sight or from the
//! accessibility tree leaves keyboard users on an invisible stop, and
//! screen readers announce nothing or something out of context.
//!
//! # Detected Patterns
//!
//! - A focusable element inside `aria-hidden="true"` content
//! - A focusable element made transparent, clipped away or positioned
//!   off-screen, unless a focus rule brings it back (skip links)
//!
//! Content removed from the tab order by `hidden`, `display: none` or
//! `visibility: hidden` is not reported.

use crate::support::describe;
use a11y_lint_core::resolver;
use a11y_lint_core::{standards, AnalysisContext, Analyzer, DocumentModel, Element, Fix, Issue, Severity};

/// Analyzer code for hidden-focusable.
pub const CODE: &str = "A11Y009";

/// Analyzer name for hidden-focusable.
pub const NAME: &str = "hidden-focusable";

/// Issue type.
pub const HIDDEN_FOCUSABLE: &str = "focusable-hidden-content";

/// Properties a focus rule changes to reveal off-screen content.
const REVEAL_PROPERTIES: &[&str] = &["position", "left", "top", "clip", "clip-path", "transform"];

/// Reports focusable elements that are hidden.
#[derive(Debug, Clone, Default)]
pub struct HiddenFocusable;

impl HiddenFocusable {
    /// Creates a new analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// How a focusable element is concealed.
enum Concealment {
    AriaHidden,
    Visual,
}

fn keyword(value: &str) -> String {
    value
        .trim()
        .trim_end_matches("!important")
        .trim()
        .to_ascii_lowercase()
}

/// Returns true if the element or an ancestor leaves the tab order altogether.
fn removed_from_tab_order(model: &DocumentModel, element: &Element) -> bool {
    model.markup.self_and_ancestors(element.id).any(|e| {
        e.has_attr("hidden")
            || resolver::static_style_rules(&model.markup, e.id, &model.style)
                .iter()
                .any(|rule| {
                    rule.property("display").is_some_and(|v| keyword(v) == "none")
                        || rule
                            .property("visibility")
                            .is_some_and(|v| matches!(keyword(v).as_str(), "hidden" | "collapse"))
                })
    })
}

/// Returns true if a focus rule on the element moves it back into view.
fn revealed_on_focus(model: &DocumentModel, element: &Element) -> bool {
    model.matching_rules(element.id).iter().any(|rule| {
        rule.pseudo_class
            .as_deref()
            .is_some_and(|p| p.starts_with("focus"))
            && REVEAL_PROPERTIES.iter().any(|p| rule.property(p).is_some())
    })
}

fn concealment(model: &DocumentModel, element: &Element) -> Option<Concealment> {
    let aria_hidden = model
        .markup
        .self_and_ancestors(element.id)
        .any(|e| e.attr("aria-hidden").is_some_and(|v| keyword(v) == "true"));
    if aria_hidden {
        return Some(Concealment::AriaHidden);
    }
    let visually_hidden = model.markup.self_and_ancestors(element.id).any(|e| {
        let rules = resolver::static_style_rules(&model.markup, e.id, &model.style);
        rules.iter().any(|rule| rule.hides_content()) || resolver::is_off_screen(&rules)
    });
    (visually_hidden && !revealed_on_focus(model, element)).then_some(Concealment::Visual)
}

impl Analyzer for HiddenFocusable {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Focusable elements must not be hidden from sight or from assistive technology"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        &[HIDDEN_FOCUSABLE]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let Some(model) = ctx.model() else {
            return Vec::new();
        };
        model
            .markup
            .iter()
            .filter(|e| e.is_focusable())
            .filter(|e| !removed_from_tab_order(model, e))
            .filter_map(|element| {
                let (message, fix) = match concealment(model, element)? {
                    Concealment::AriaHidden => (
                        format!(
                            "{} can receive focus inside aria-hidden content",
                            describe(element)
                        ),
                        Fix::new(
                            "Take the element out of the tab order while its container is hidden",
                            "<button tabindex=\"-1\">...</button>",
                        ),
                    ),
                    Concealment::Visual => (
                        format!("{} can receive focus but is not visible", describe(element)),
                        Fix::new(
                            "Hide it with display: none, or reveal it on focus",
                            ".sr-only:focus {\n  position: static;\n}",
                        ),
                    ),
                };
                Some(
                    Issue::new(HIDDEN_FOCUSABLE, Severity::Warning, message)
                        .with_standard(standards::FOCUS_ORDER)
                        .with_standard(standards::NAME_ROLE_VALUE)
                        .with_fix(fix)
                        .with_confidence(ctx.confidence("script may change visibility at runtime"))
                        .at(element.location.clone()),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, run_page, types};

    #[test]
    fn test_focusable_inside_aria_hidden() {
        let model = page("div aria-hidden=true\n  button id=go\n", "", "");
        let issues = run_page(&HiddenFocusable::new(), &model);
        assert_eq!(types(&issues), vec![HIDDEN_FOCUSABLE]);
        assert!(issues[0].message.contains("aria-hidden"));
    }

    #[test]
    fn test_negative_tabindex_is_out_of_tab_order() {
        let model = page("div aria-hidden=true\n  button tabindex=-1\n", "", "");
        assert!(run_page(&HiddenFocusable::new(), &model).is_empty());
    }

    #[test]
    fn test_off_screen_link() {
        let model = page(
            "a href=#main class=sr-only\n",
            "",
            ".sr-only { position: absolute; left: -10000px }\n",
        );
        assert_eq!(run_page(&HiddenFocusable::new(), &model).len(), 1);
    }

    #[test]
    fn test_skip_link_revealed_on_focus() {
        let model = page(
            "a href=#main class=sr-only\n",
            "",
            ".sr-only { position: absolute; left: -10000px }\n.sr-only:focus { position: static }\n",
        );
        assert!(run_page(&HiddenFocusable::new(), &model).is_empty());
    }

    #[test]
    fn test_transparent_button() {
        let model = page("button style=opacity:0\n", "", "");
        assert_eq!(run_page(&HiddenFocusable::new(), &model).len(), 1);
    }

    #[test]
    fn test_removed_content_is_not_reported() {
        let model = page(
            "div hidden\n  button\ndiv class=closed\n  a href=/\n",
            "",
            ".closed { display: none }\n",
        );
        assert!(run_page(&HiddenFocusable::new(), &model).is_empty());
    }
}
