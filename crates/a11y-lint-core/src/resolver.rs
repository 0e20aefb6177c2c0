//! Reference resolution: behavior bindings to elements, style rules to elements.
//!
//! Every function here is pure over immutable inputs.

use crate::behavior::ElementBinding;
use crate::dom::{ElementId, ElementTree};
use crate::selector::SelectorList;
use crate::style::{keyword, px_value, StyleRule};
use std::borrow::Cow;

/// Offset at or beyond which absolutely positioned content counts as off-screen.
pub const OFF_SCREEN_PX: f32 = -999.0;

/// Finds the element a binding targets.
///
/// A bare `#id` selector matches the `id` attribute exactly. Any other
/// selector returns the first element, in document order, that it matches.
/// Unparsable selectors and selectors on pseudo-elements resolve to `None`.
#[must_use]
pub fn resolve(binding: &ElementBinding, tree: &ElementTree) -> Option<ElementId> {
    resolve_selector(&binding.selector, tree)
}

/// Finds the first element matching `selector`. See [`resolve`].
#[must_use]
pub fn resolve_selector(selector: &str, tree: &ElementTree) -> Option<ElementId> {
    let selector = selector.trim();
    if let Some(id) = selector.strip_prefix('#') {
        if is_plain_ident(id) {
            return tree.find_by_id(id).map(|e| e.id);
        }
    }
    let list = SelectorList::parse(selector).ok()?;
    if list.targets_pseudo_element() {
        return None;
    }
    tree.iter().find(|e| list.matches(tree, e.id)).map(|e| e.id)
}

fn is_plain_ident(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Returns the style rules that apply to an element, most specific first.
///
/// Ties are broken by source order, later first. The element's inline
/// `style` attribute contributes a synthetic rule with inline specificity.
#[must_use]
pub fn matching_style_rules<'a>(
    tree: &ElementTree,
    id: ElementId,
    rules: &'a [StyleRule],
) -> Vec<Cow<'a, StyleRule>> {
    let Some(element) = tree.get(id) else {
        return Vec::new();
    };
    let mut matched: Vec<Cow<'a, StyleRule>> = rules
        .iter()
        .filter(|rule| {
            rule.selector_list()
                .is_some_and(|list| list.matches(tree, id))
        })
        .map(Cow::Borrowed)
        .collect();
    if let Some(style) = element.attr("style") {
        matched.push(Cow::Owned(StyleRule::inline(style, element.location.clone())));
    }
    matched.sort_by(|a, b| {
        b.specificity
            .cmp(&a.specificity)
            .then(b.source_order.cmp(&a.source_order))
    });
    matched
}

/// Returns true if a rule only applies in an interaction state such as `:hover`.
fn is_state_dependent(rule: &StyleRule) -> bool {
    match rule.selector_list() {
        Some(list) => list
            .selectors()
            .iter()
            .any(|s| s.subject().pseudo_classes.iter().any(|p| p.is_dynamic())),
        None => rule.pseudo_class.is_some(),
    }
}

/// Matching rules that apply regardless of interaction state, most specific first.
#[must_use]
pub fn static_style_rules<'a>(
    tree: &ElementTree,
    id: ElementId,
    rules: &'a [StyleRule],
) -> Vec<Cow<'a, StyleRule>> {
    matching_style_rules(tree, id, rules)
        .into_iter()
        .filter(|rule| !is_state_dependent(rule))
        .collect()
}

/// Returns true if the rules, sorted by precedence, position content off-screen.
#[must_use]
pub fn is_off_screen(rules: &[Cow<'_, StyleRule>]) -> bool {
    is_positioned_off_screen(rules)
}

/// Returns true if style alone takes the element out of view.
///
/// Ancestors are not consulted; see [`DocumentModel::is_hidden`](crate::DocumentModel::is_hidden).
#[must_use]
pub fn is_hidden_by_style(tree: &ElementTree, id: ElementId, rules: &[StyleRule]) -> bool {
    let applicable = static_style_rules(tree, id, rules);
    if applicable.iter().any(|rule| rule.hides_content()) {
        return true;
    }
    is_positioned_off_screen(&applicable)
}

/// Evaluates `position` and offsets over rules sorted by precedence.
fn is_positioned_off_screen(rules: &[Cow<'_, StyleRule>]) -> bool {
    let cascaded = |name: &str| rules.iter().find_map(|rule| rule.property(name));
    let positioned = cascaded("position")
        .is_some_and(|v| matches!(keyword(v).as_str(), "absolute" | "fixed"));
    if !positioned {
        return false;
    }
    ["left", "top"].iter().any(|side| {
        cascaded(side)
            .and_then(px_value)
            .is_some_and(|px| px <= OFF_SCREEN_PX)
    })
}

/// Returns true if a focus-state rule draws a visible indicator on the element.
#[must_use]
pub fn has_focus_style(tree: &ElementTree, id: ElementId, rules: &[StyleRule]) -> bool {
    matching_style_rules(tree, id, rules).iter().any(|rule| {
        rule.pseudo_class
            .as_deref()
            .is_some_and(|p| p.starts_with("focus"))
            && rule.draws_indicator()
    })
}

/// Focus-state rules matching the element that remove the outline.
#[must_use]
pub fn outline_removals<'a>(
    tree: &ElementTree,
    id: ElementId,
    rules: &'a [StyleRule],
) -> Vec<Cow<'a, StyleRule>> {
    matching_style_rules(tree, id, rules)
        .into_iter()
        .filter(|rule| rule.affects_focus && rule.removes_outline())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementTreeBuilder;
    use crate::types::Location;

    fn loc(line: usize) -> Location {
        Location::new("index.html", line, 1)
    }

    fn tree() -> ElementTree {
        let mut b = ElementTreeBuilder::new();
        b.open("nav", [("class", "menu main")], loc(1));
        b.leaf("button", [("id", "toggle"), ("class", "btn")], loc(2));
        b.leaf("a", [("class", "btn link"), ("href", "#")], loc(3));
        b.close();
        b.leaf("div", [("id", "skip"), ("class", "sr-only")], loc(5));
        b.leaf("div", [("id", "inline"), ("style", "display:none")], loc(6));
        b.finish()
    }

    fn rule(selector: &str, decls: &[(&str, &str)], order: usize) -> StyleRule {
        StyleRule::new(selector, decls.iter().copied(), Location::new("s.css", order + 1, 1))
            .expect("valid selector")
            .with_source_order(order)
    }

    #[test]
    fn id_selector_matches_exactly() {
        let t = tree();
        assert_eq!(resolve(&ElementBinding::new("#toggle"), &t), Some(ElementId(1)));
        assert_eq!(resolve(&ElementBinding::new("#missing"), &t), None);
    }

    #[test]
    fn class_selector_requires_superset() {
        let t = tree();
        assert_eq!(resolve(&ElementBinding::new(".btn"), &t), Some(ElementId(1)));
        assert_eq!(resolve(&ElementBinding::new(".btn.link"), &t), Some(ElementId(2)));
        assert_eq!(resolve(&ElementBinding::new(".btn.nope"), &t), None);
    }

    #[test]
    fn tag_and_complex_selectors() {
        let t = tree();
        assert_eq!(resolve(&ElementBinding::new("a"), &t), Some(ElementId(2)));
        assert_eq!(resolve(&ElementBinding::new("nav > a"), &t), Some(ElementId(2)));
        assert_eq!(resolve(&ElementBinding::new("document"), &t), None);
        assert_eq!(resolve(&ElementBinding::new("a["), &t), None);
        assert_eq!(resolve(&ElementBinding::new("a::before"), &t), None);
        assert_eq!(resolve(&ElementBinding::new(".btn:nth-child(2)"), &t), None);
        assert_eq!(resolve(&ElementBinding::new(".btn:hover"), &t), Some(ElementId(1)));
    }

    #[test]
    fn rules_sorted_by_specificity_then_later_source() {
        let t = tree();
        let rules = vec![
            rule(".btn", &[("color", "red")], 0),
            rule("#toggle", &[("color", "blue")], 1),
            rule(".btn", &[("color", "green")], 2),
        ];
        let matched = matching_style_rules(&t, ElementId(1), &rules);
        let orders: Vec<usize> = matched.iter().map(|r| r.source_order).collect();
        assert_eq!(orders, vec![1, 2, 0]);
    }

    #[test]
    fn inline_style_wins_over_ids() {
        let t = tree();
        let rules = vec![rule("#inline", &[("display", "block")], 0)];
        let matched = matching_style_rules(&t, ElementId(4), &rules);
        assert_eq!(matched[0].specificity, crate::Specificity::INLINE);
        assert!(is_hidden_by_style(&t, ElementId(4), &rules));
    }

    #[test]
    fn off_screen_positioning_uses_cascade() {
        let t = tree();
        let rules = vec![
            rule(".sr-only", &[("position", "absolute"), ("left", "-10000px")], 0),
        ];
        assert!(is_hidden_by_style(&t, ElementId(3), &rules));

        let overridden = vec![
            rule(".sr-only", &[("position", "absolute"), ("left", "-10000px")], 0),
            rule("#skip", &[("position", "static")], 1),
        ];
        assert!(!is_hidden_by_style(&t, ElementId(3), &overridden));
    }

    #[test]
    fn hover_rules_do_not_hide() {
        let t = tree();
        let rules = vec![rule(".btn:hover", &[("display", "none")], 0)];
        assert!(!is_hidden_by_style(&t, ElementId(1), &rules));
    }

    #[test]
    fn focus_style_presence() {
        let t = tree();
        let none = vec![rule(".btn:focus", &[("outline", "none")], 0)];
        assert!(!has_focus_style(&t, ElementId(1), &none));
        assert_eq!(outline_removals(&t, ElementId(1), &none).len(), 1);
        let ring = vec![rule(".btn:focus-visible", &[("outline", "2px solid")], 0)];
        assert!(has_focus_style(&t, ElementId(1), &ring));
    }
}
