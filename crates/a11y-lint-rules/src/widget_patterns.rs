//! Analyzer for composite widgets that miss parts of their interaction pattern.
//!
//! # Rationale
//!
//! Composite widgets such as tabs and menus promise a specific keyboard
//! model and a specific structure of roles and states. A widget that gets
//! the container role right but omits its children or arrow-key handling
//! is harder to use than plain links and buttons.
//!
//! # Detected Patterns
//!
//! Each widget is checked against a fixed checklist; every missing item is a
//! separate `incomplete-<pattern>-pattern` issue whose `detail` names the item.
//!
//! | Pattern | Trigger | Checklist |
//! |---------|---------|-----------|
//! | tabs | `role=tablist` | `tab-children`, `arrow-key-navigation` |
//! | dialog | `role=dialog`, `role=alertdialog`, `<dialog>` | `accessible-name`, `escape-key` |
//! | accordion | `class=accordion` | `button-triggers`, `expanded-state`, `controls-reference`, `expanded-toggle` |
//! | combobox | `role=combobox` | `expanded-state`, `controls-reference`, `arrow-key-navigation`, `escape-key` |
//! | menu | `role=menu`, `role=menubar` | `menuitem-children`, `arrow-key-navigation`, `escape-key` (menu only) |
//! | slider | `role=slider` | `value-range`, `focusable`, `arrow-key-navigation` |
//! | switch | `role=switch` | `focusable`, `space-key`, `checked-toggle` |
//! | carousel | `aria-roledescription=carousel`, `class=carousel` | `accessible-name`, `rotation-control`, `slide-controls` |
//! | tooltip | `role=tooltip` | `describedby-reference`, `escape-key` |

use crate::support::{any_handles, describe, has_state, is_document_binding, keyboard_handlers_within};
use a11y_lint_core::behavior::ActionKind;
use a11y_lint_core::{
    standards, AnalysisContext, Analyzer, Confidence, Element, ElementId, ElementTree, Issue,
    Severity,
};

/// Analyzer code for widget-patterns.
pub const CODE: &str = "A11Y007";

/// Analyzer name for widget-patterns.
pub const NAME: &str = "widget-patterns";

/// Patterns checked, in the order they are detected.
pub const PATTERNS: &[&str] = &[
    "tabs", "dialog", "accordion", "combobox", "menu", "slider", "switch", "carousel", "tooltip",
];

const ISSUE_TYPES: &[&str] = &[
    "incomplete-tabs-pattern",
    "incomplete-dialog-pattern",
    "incomplete-accordion-pattern",
    "incomplete-combobox-pattern",
    "incomplete-menu-pattern",
    "incomplete-slider-pattern",
    "incomplete-switch-pattern",
    "incomplete-carousel-pattern",
    "incomplete-tooltip-pattern",
];

/// Issue type for a pattern name.
#[must_use]
pub fn issue_type(pattern: &str) -> String {
    format!("incomplete-{pattern}-pattern")
}

/// Reports widgets with missing checklist items.
#[derive(Debug, Clone)]
pub struct WidgetPatterns {
    patterns: Vec<&'static str>,
}

impl Default for WidgetPatterns {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPatterns {
    /// Creates a new analyzer checking every pattern.
    #[must_use]
    pub fn new() -> Self {
        Self {
            patterns: PATTERNS.to_vec(),
        }
    }

    /// Restricts the check to the named patterns. Unknown names are ignored.
    #[must_use]
    pub fn only<'n>(mut self, names: impl IntoIterator<Item = &'n str>) -> Self {
        let names: Vec<&str> = names.into_iter().collect();
        self.patterns.retain(|p| names.contains(p));
        self
    }
}

/// One missing checklist item.
struct Missing {
    detail: &'static str,
    message: String,
    behavioral: bool,
}

impl Missing {
    fn structure(detail: &'static str, message: impl Into<String>) -> Self {
        Self {
            detail,
            message: message.into(),
            behavioral: false,
        }
    }

    fn behavior(detail: &'static str, message: impl Into<String>) -> Self {
        Self {
            detail,
            message: message.into(),
            behavioral: true,
        }
    }
}

fn pattern_of(element: &Element) -> Option<&'static str> {
    let role = element.role();
    match role.as_deref() {
        Some("tablist") => return Some("tabs"),
        Some("dialog" | "alertdialog") => return Some("dialog"),
        Some("combobox") => return Some("combobox"),
        Some("menu" | "menubar") => return Some("menu"),
        Some("slider") => return Some("slider"),
        Some("switch") => return Some("switch"),
        Some("tooltip") => return Some("tooltip"),
        _ => {}
    }
    if element.tag == "dialog" {
        return Some("dialog");
    }
    let roledescription = element
        .attr("aria-roledescription")
        .is_some_and(|d| d.eq_ignore_ascii_case("carousel"));
    if roledescription || element.has_class("carousel") {
        return Some("carousel");
    }
    if element.has_class("accordion") {
        return Some("accordion");
    }
    None
}

fn has_name(element: &Element) -> bool {
    ["aria-label", "aria-labelledby", "title"]
        .iter()
        .any(|a| element.attr(a).is_some_and(|v| !v.trim().is_empty()))
}

fn descendants_with_role<'t>(tree: &'t ElementTree, id: ElementId, roles: &[&str]) -> Vec<&'t Element> {
    tree.descendants(id)
        .into_iter()
        .filter(|e| e.role().is_some_and(|r| roles.contains(&r.as_str())))
        .collect()
}

fn is_button_like(element: &Element) -> bool {
    element.tag == "button" || element.role().as_deref() == Some("button")
}

fn labelled_like(element: &Element, words: &[&str]) -> bool {
    let text = [
        element.attr("aria-label").unwrap_or(""),
        element.attr("class").unwrap_or(""),
        element.attr("title").unwrap_or(""),
    ]
    .join(" ")
    .to_ascii_lowercase();
    words.iter().any(|w| text.contains(w))
}

/// Escape handled inside the widget or at document level.
fn handles_escape(ctx: &AnalysisContext<'_>, id: ElementId) -> bool {
    any_handles(&keyboard_handlers_within(ctx, id), "Escape")
        || ctx
            .nodes()
            .iter()
            .filter(|n| n.is_keyboard_handler() && is_document_binding(ctx, n))
            .any(|n| n.handles_key("Escape"))
}

fn handles_axis(ctx: &AnalysisContext<'_>, id: ElementId, keys: [&str; 2]) -> bool {
    let handlers = keyboard_handlers_within(ctx, id);
    keys.iter().all(|k| any_handles(&handlers, k))
}

fn check_tabs(ctx: &AnalysisContext<'_>, tree: &ElementTree, widget: &Element) -> Vec<Missing> {
    let mut missing = Vec::new();
    if descendants_with_role(tree, widget.id, &["tab"]).is_empty() {
        missing.push(Missing::structure("tab-children", "has no role=\"tab\" children"));
    }
    let vertical = widget.attr("aria-orientation") == Some("vertical");
    let keys = if vertical {
        ["ArrowUp", "ArrowDown"]
    } else {
        ["ArrowLeft", "ArrowRight"]
    };
    if !handles_axis(ctx, widget.id, keys) {
        missing.push(Missing::behavior(
            "arrow-key-navigation",
            format!("has no keydown handler for {} and {}", keys[0], keys[1]),
        ));
    }
    missing
}

fn check_dialog(ctx: &AnalysisContext<'_>, widget: &Element) -> Vec<Missing> {
    let mut missing = Vec::new();
    if !has_name(widget) {
        missing.push(Missing::structure(
            "accessible-name",
            "has no aria-label or aria-labelledby",
        ));
    }
    if !handles_escape(ctx, widget.id) {
        missing.push(Missing::behavior("escape-key", "cannot be closed with Escape"));
    }
    missing
}

fn check_accordion(ctx: &AnalysisContext<'_>, tree: &ElementTree, widget: &Element) -> Vec<Missing> {
    let triggers: Vec<&Element> = tree
        .descendants(widget.id)
        .into_iter()
        .filter(|e| is_button_like(e))
        .collect();
    if triggers.is_empty() {
        return vec![Missing::structure(
            "button-triggers",
            "has no button headers to expand sections",
        )];
    }
    let mut missing = Vec::new();
    if triggers.iter().any(|t| !has_state(ctx, t, "aria-expanded")) {
        missing.push(Missing::structure(
            "expanded-state",
            "has header buttons without aria-expanded",
        ));
    }
    if triggers.iter().any(|t| !t.has_attr("aria-controls")) {
        missing.push(Missing::structure(
            "controls-reference",
            "has header buttons without aria-controls",
        ));
    }
    let toggled = ctx.nodes().iter().any(|n| {
        matches!(&n.kind, ActionKind::AriaStateChange { attribute, .. } if attribute == "aria-expanded")
            && n.binding
                .resolved
                .is_some_and(|id| tree.is_ancestor(widget.id, id))
    });
    if !toggled {
        missing.push(Missing::behavior(
            "expanded-toggle",
            "never updates aria-expanded from script",
        ));
    }
    missing
}

fn check_combobox(ctx: &AnalysisContext<'_>, widget: &Element) -> Vec<Missing> {
    let mut missing = Vec::new();
    if !has_state(ctx, widget, "aria-expanded") {
        missing.push(Missing::structure("expanded-state", "has no aria-expanded"));
    }
    if !widget.has_attr("aria-controls") && !widget.has_attr("aria-owns") {
        missing.push(Missing::structure(
            "controls-reference",
            "has no aria-controls pointing at its popup",
        ));
    }
    let handlers = keyboard_handlers_within(ctx, widget.id);
    if !any_handles(&handlers, "ArrowDown") {
        missing.push(Missing::behavior(
            "arrow-key-navigation",
            "has no ArrowDown handler to open the popup",
        ));
    }
    if !any_handles(&handlers, "Escape") {
        missing.push(Missing::behavior("escape-key", "cannot be collapsed with Escape"));
    }
    missing
}

fn check_menu(ctx: &AnalysisContext<'_>, tree: &ElementTree, widget: &Element) -> Vec<Missing> {
    let mut missing = Vec::new();
    let items = descendants_with_role(
        tree,
        widget.id,
        &["menuitem", "menuitemcheckbox", "menuitemradio"],
    );
    if items.is_empty() {
        missing.push(Missing::structure(
            "menuitem-children",
            "has no role=\"menuitem\" children",
        ));
    }
    let menubar = widget.role().as_deref() == Some("menubar");
    let keys = if menubar {
        ["ArrowLeft", "ArrowRight"]
    } else {
        ["ArrowUp", "ArrowDown"]
    };
    if !handles_axis(ctx, widget.id, keys) {
        missing.push(Missing::behavior(
            "arrow-key-navigation",
            format!("has no keydown handler for {} and {}", keys[0], keys[1]),
        ));
    }
    if !menubar && !handles_escape(ctx, widget.id) {
        missing.push(Missing::behavior("escape-key", "cannot be closed with Escape"));
    }
    missing
}

fn check_slider(ctx: &AnalysisContext<'_>, widget: &Element) -> Vec<Missing> {
    let mut missing = Vec::new();
    if !widget.has_attr("aria-valuemin") || !widget.has_attr("aria-valuemax") {
        missing.push(Missing::structure(
            "value-range",
            "has no aria-valuemin/aria-valuemax range",
        ));
    }
    if !widget.is_focusable() {
        missing.push(Missing::structure("focusable", "is not focusable (add tabindex=\"0\")"));
    }
    let horizontal = handles_axis(ctx, widget.id, ["ArrowLeft", "ArrowRight"]);
    let vertical = handles_axis(ctx, widget.id, ["ArrowUp", "ArrowDown"]);
    if !horizontal && !vertical {
        missing.push(Missing::behavior(
            "arrow-key-navigation",
            "has no arrow-key handler to change the value",
        ));
    }
    missing
}

fn check_switch(ctx: &AnalysisContext<'_>, widget: &Element) -> Vec<Missing> {
    let mut missing = Vec::new();
    if !widget.is_focusable() {
        missing.push(Missing::structure("focusable", "is not focusable (add tabindex=\"0\")"));
    }
    if !widget.is_natively_activatable() {
        let handlers = keyboard_handlers_within(ctx, widget.id);
        if !any_handles(&handlers, " ") && !any_handles(&handlers, "Enter") {
            missing.push(Missing::behavior("space-key", "cannot be toggled with Space"));
        }
    }
    let toggled = ctx.nodes_on(widget.id).any(|n| {
        matches!(&n.kind, ActionKind::AriaStateChange { attribute, .. } if attribute == "aria-checked")
    });
    if !toggled {
        missing.push(Missing::behavior(
            "checked-toggle",
            "never updates aria-checked from script",
        ));
    }
    missing
}

fn check_carousel(tree: &ElementTree, widget: &Element) -> Vec<Missing> {
    let mut missing = Vec::new();
    if !has_name(widget) {
        missing.push(Missing::structure(
            "accessible-name",
            "has no aria-label or aria-labelledby",
        ));
    }
    let controls: Vec<&Element> = tree
        .descendants(widget.id)
        .into_iter()
        .filter(|e| is_button_like(e))
        .collect();
    if !controls
        .iter()
        .any(|c| labelled_like(c, &["pause", "stop", "play", "rotation"]))
    {
        missing.push(Missing::structure(
            "rotation-control",
            "has no control to pause automatic rotation",
        ));
    }
    let previous = controls.iter().any(|c| labelled_like(c, &["prev"]));
    let next = controls.iter().any(|c| labelled_like(c, &["next"]));
    if !previous || !next {
        missing.push(Missing::structure(
            "slide-controls",
            "has no previous/next slide buttons",
        ));
    }
    missing
}

fn check_tooltip(ctx: &AnalysisContext<'_>, tree: &ElementTree, widget: &Element) -> Vec<Missing> {
    let mut missing = Vec::new();
    let trigger = widget.dom_id().and_then(|id| {
        tree.iter().find(|e| {
            e.attr("aria-describedby")
                .is_some_and(|refs| refs.split_whitespace().any(|r| r == id))
        })
    });
    if trigger.is_none() {
        missing.push(Missing::structure(
            "describedby-reference",
            "is not referenced by any aria-describedby",
        ));
    }
    let escape = handles_escape(ctx, widget.id)
        || trigger.is_some_and(|t| any_handles(&keyboard_handlers_within(ctx, t.id), "Escape"));
    if !escape {
        missing.push(Missing::behavior("escape-key", "cannot be dismissed with Escape"));
    }
    missing
}

impl Analyzer for WidgetPatterns {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Composite widgets must implement their full interaction pattern"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        ISSUE_TYPES
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let Some(tree) = ctx.tree() else {
            return Vec::new();
        };
        let mut issues = Vec::new();
        for widget in tree.iter() {
            let Some(pattern) = pattern_of(widget).filter(|p| self.patterns.contains(p)) else {
                continue;
            };
            let missing = match pattern {
                "tabs" => check_tabs(ctx, tree, widget),
                "dialog" => check_dialog(ctx, widget),
                "accordion" => check_accordion(ctx, tree, widget),
                "combobox" => check_combobox(ctx, widget),
                "menu" => check_menu(ctx, tree, widget),
                "slider" => check_slider(ctx, widget),
                "switch" => check_switch(ctx, widget),
                "carousel" => check_carousel(tree, widget),
                "tooltip" => check_tooltip(ctx, tree, widget),
                _ => Vec::new(),
            };
            for item in missing {
                let confidence = if item.behavioral {
                    ctx.confidence("handlers outside the analyzed files are not visible")
                } else {
                    Confidence::certain("checked against markup")
                };
                let mut issue = Issue::new(
                    issue_type(pattern),
                    Severity::Warning,
                    format!("{pattern} widget {} {}", describe(widget), item.message),
                )
                .with_standard(format!("APG-{pattern}"))
                .with_confidence(confidence)
                .with_detail(item.detail)
                .at(widget.location.clone());
                issue = if item.behavioral {
                    issue.with_standard(standards::KEYBOARD)
                } else {
                    issue.with_standard(standards::NAME_ROLE_VALUE)
                };
                issues.push(issue);
            }
        }
        issues
    }
}
