//! Element tree produced by a markup leaf producer.
//!
//! The tree is an arena: elements are stored in document (pre-)order and
//! refer to each other through [`ElementId`]s. A tree is immutable once
//! [`ElementTreeBuilder::finish`] returns.

use crate::types::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of an element inside its [`ElementTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub usize);

impl ElementId {
    /// Arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Roles whose semantics require user interaction.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "checkbox",
    "combobox",
    "link",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "radio",
    "scrollbar",
    "searchbox",
    "slider",
    "spinbutton",
    "switch",
    "tab",
    "textbox",
    "treeitem",
];

/// One element of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Position in the arena.
    pub id: ElementId,
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes by name.
    pub attributes: BTreeMap<String, String>,
    /// Children in document order.
    pub children: Vec<ElementId>,
    /// Parent element, `None` for roots.
    pub parent: Option<ElementId>,
    /// Start tag location.
    pub location: Location,
}

impl Element {
    /// Returns an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns the `id` attribute.
    #[must_use]
    pub fn dom_id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// Iterates the whitespace-separated class list.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Returns true if the class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Returns the first token of the `role` attribute, lowercased.
    #[must_use]
    pub fn role(&self) -> Option<String> {
        self.attr("role")
            .and_then(|r| r.split_whitespace().next())
            .map(str::to_ascii_lowercase)
    }

    /// Returns true if the element carries an interactive ARIA role.
    #[must_use]
    pub fn has_interactive_role(&self) -> bool {
        self.role()
            .is_some_and(|role| INTERACTIVE_ROLES.contains(&role.as_str()))
    }

    /// Parsed `tabindex`, if present and numeric.
    #[must_use]
    pub fn tabindex(&self) -> Option<i32> {
        self.attr("tabindex").and_then(|v| v.trim().parse().ok())
    }

    /// Returns true if the browser activates this element from the keyboard
    /// without any script (Enter/Space on buttons, Enter on links).
    #[must_use]
    pub fn is_natively_activatable(&self) -> bool {
        match self.tag.as_str() {
            "button" | "select" | "textarea" | "summary" | "option" => true,
            "a" | "area" => self.has_attr("href"),
            "input" => self.attr("type") != Some("hidden"),
            _ => false,
        }
    }

    /// Returns true if the element takes part in sequential focus navigation.
    #[must_use]
    pub fn is_focusable(&self) -> bool {
        if self.has_attr("disabled") {
            return false;
        }
        match self.tabindex() {
            Some(index) => index >= 0,
            None => self.is_natively_activatable() || self.has_attr("contenteditable"),
        }
    }

    /// Returns true if the markup declares an inline handler such as `onclick`.
    #[must_use]
    pub fn has_inline_handler(&self, event: &str) -> bool {
        self.has_attr(&format!("on{event}"))
    }
}

/// Immutable element tree of one markup file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTree {
    nodes: Vec<Element>,
    roots: Vec<ElementId>,
}

impl ElementTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `id` refers to an element of this tree.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Returns the element with the given arena id.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.index())
    }

    /// Top-level elements in document order.
    #[must_use]
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Iterates all elements in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.nodes.iter()
    }

    /// Finds the first element whose `id` attribute equals `dom_id`.
    #[must_use]
    pub fn find_by_id(&self, dom_id: &str) -> Option<&Element> {
        self.nodes.iter().find(|e| e.dom_id() == Some(dom_id))
    }

    /// Iterates the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = &Element> {
        let mut next = self.get(id).and_then(|e| e.parent);
        std::iter::from_fn(move || {
            let current = self.get(next?)?;
            next = current.parent;
            Some(current)
        })
    }

    /// Returns all descendants of `id` in document order.
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.get(id) {
            Some(e) => e.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            if let Some(element) = self.get(current) {
                out.push(element);
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    /// Returns true if `ancestor` is a proper ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).any(|e| e.id == ancestor)
    }

    /// Returns the element plus its ancestors, nearest first.
    pub fn self_and_ancestors(&self, id: ElementId) -> impl Iterator<Item = &Element> {
        self.get(id).into_iter().chain(self.ancestors(id))
    }
}

/// Incremental constructor for an [`ElementTree`].
///
/// Leaf producers call [`open`](Self::open) for every start tag and
/// [`close`](Self::close) for every end tag; ids are assigned in document order.
#[derive(Debug, Default)]
pub struct ElementTreeBuilder {
    nodes: Vec<Element>,
    roots: Vec<ElementId>,
    stack: Vec<ElementId>,
}

impl ElementTreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an element as a child of the currently open element.
    pub fn open<I, K, V>(&mut self, tag: &str, attributes: I, location: Location) -> ElementId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let id = ElementId(self.nodes.len());
        let parent = self.stack.last().copied();
        self.nodes.push(Element {
            id,
            tag: tag.to_ascii_lowercase(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
                .collect(),
            children: Vec::new(),
            parent,
            location,
        });
        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        self.stack.push(id);
        id
    }

    /// Closes the most recently opened element. Extra closes are ignored.
    pub fn close(&mut self) {
        self.stack.pop();
    }

    /// Adds an element with no children.
    pub fn leaf<I, K, V>(&mut self, tag: &str, attributes: I, location: Location) -> ElementId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let id = self.open(tag, attributes, location);
        self.close();
        id
    }

    /// Depth of currently open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Finishes the tree, implicitly closing any open elements.
    #[must_use]
    pub fn finish(self) -> ElementTree {
        ElementTree {
            nodes: self.nodes,
            roots: self.roots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize) -> Location {
        Location::new("index.html", line, 1)
    }

    fn sample() -> ElementTree {
        let mut b = ElementTreeBuilder::new();
        b.open("main", [("id", "app")], loc(1));
        b.open("div", [("class", "menu open"), ("role", "Menu")], loc(2));
        b.leaf("button", [("id", "first")], loc(3));
        b.close();
        b.leaf("a", [("href", "#x")], loc(5));
        b.close();
        b.finish()
    }

    #[test]
    fn ids_follow_document_order() {
        let tree = sample();
        let tags: Vec<&str> = tree.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["main", "div", "button", "a"]);
        assert_eq!(tree.roots(), &[ElementId(0)]);
    }

    #[test]
    fn parent_and_children_links() {
        let tree = sample();
        let button = tree.find_by_id("first").expect("button");
        assert_eq!(button.parent, Some(ElementId(1)));
        assert!(tree.is_ancestor(ElementId(0), button.id));
        let ancestors: Vec<&str> = tree.ancestors(button.id).map(|e| e.tag.as_str()).collect();
        assert_eq!(ancestors, vec!["div", "main"]);
    }

    #[test]
    fn descendants_in_document_order() {
        let tree = sample();
        let tags: Vec<&str> = tree
            .descendants(ElementId(0))
            .iter()
            .map(|e| e.tag.as_str())
            .collect();
        assert_eq!(tags, vec!["div", "button", "a"]);
    }

    #[test]
    fn element_helpers() {
        let tree = sample();
        let div = tree.get(ElementId(1)).expect("div");
        assert!(div.has_class("open"));
        assert_eq!(div.role().as_deref(), Some("menu"));
        let button = tree.get(ElementId(2)).expect("button");
        assert!(button.is_natively_activatable());
        assert!(button.is_focusable());
        assert!(!div.is_focusable());
    }

    #[test]
    fn interactive_role_detection() {
        let mut b = ElementTreeBuilder::new();
        b.leaf("div", [("role", "button")], loc(1));
        b.leaf("div", [("role", "region")], loc(2));
        let tree = b.finish();
        assert!(tree.get(ElementId(0)).is_some_and(Element::has_interactive_role));
        assert!(!tree.get(ElementId(1)).is_some_and(Element::has_interactive_role));
    }
}
