//! Selector parsing, matching and specificity.
//!
//! Supports the subset of selector syntax that behavior bindings and style
//! rules use in practice: type/universal, `#id`, `.class`, attribute
//! selectors, pseudo-classes (including `:not()`), pseudo-elements, and the
//! descendant, child and sibling combinators. Selector lists are split on
//! top-level commas.

use crate::dom::{ElementId, ElementTree};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector was empty.
    #[error("empty selector")]
    Empty,
    /// An unexpected character was found.
    #[error("unexpected '{found}' at byte {position} in selector `{selector}`")]
    Unexpected {
        /// Full selector text.
        selector: String,
        /// Offending character.
        found: char,
        /// Byte position.
        position: usize,
    },
    /// A bracket or parenthesis was not closed.
    #[error("unterminated {what} in selector `{selector}`")]
    Unterminated {
        /// Full selector text.
        selector: String,
        /// What was left open.
        what: &'static str,
    },
}

/// Cascade specificity `(inline, id, class/attribute/pseudo-class, type)`.
///
/// Ordering is lexicographic over the four terms.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Specificity(pub u32, pub u32, pub u32, pub u32);

impl Specificity {
    /// Specificity of an inline `style` attribute.
    pub const INLINE: Self = Self(1, 0, 0, 0);
}

impl std::ops::Add for Specificity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(
            self.0 + rhs.0,
            self.1 + rhs.1,
            self.2 + rhs.2,
            self.3 + rhs.3,
        )
    }
}

/// How two compound selectors relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the parent.
    Child,
    /// `+`: the immediately preceding sibling.
    Adjacent,
    /// `~`: any preceding sibling.
    Sibling,
}

/// Attribute selector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Equals,
    /// `[attr~=v]`
    Includes,
    /// `[attr^=v]`
    Prefix,
    /// `[attr$=v]`
    Suffix,
    /// `[attr*=v]`
    Substring,
    /// `[attr|=v]`
    DashMatch,
}

/// One attribute condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    /// Lowercase attribute name.
    pub name: String,
    /// Operator.
    pub op: AttrOp,
    /// Comparison value (empty for [`AttrOp::Exists`]).
    pub value: String,
}

impl AttrSelector {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let v = self.value.as_str();
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == v,
            AttrOp::Includes => actual.split_whitespace().any(|t| t == v),
            AttrOp::Prefix => !v.is_empty() && actual.starts_with(v),
            AttrOp::Suffix => !v.is_empty() && actual.ends_with(v),
            AttrOp::Substring => !v.is_empty() && actual.contains(v),
            AttrOp::DashMatch => actual == v || actual.starts_with(&format!("{v}-")),
        }
    }
}

/// Pseudo-classes that depend on user interaction or runtime state.
pub const DYNAMIC_PSEUDO_CLASSES: &[&str] = &[
    "hover",
    "focus",
    "focus-visible",
    "focus-within",
    "active",
    "visited",
    "link",
    "target",
    "checked",
    "disabled",
    "enabled",
];

/// A pseudo-class condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:not(...)` over a single compound.
    Not(Box<Compound>),
    /// Any other pseudo-class, by lowercase name (arguments dropped).
    Named(String),
}

impl PseudoClass {
    /// Name of the pseudo-class.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Not(_) => "not",
            Self::Named(name) => name,
        }
    }

    /// Returns true for interaction/state pseudo-classes such as `:focus`.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        DYNAMIC_PSEUDO_CLASSES.contains(&self.name())
    }
}

/// A sequence of simple selectors with no combinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Type selector; `None` or `*` matches any tag.
    pub tag: Option<String>,
    /// `#id` condition.
    pub id: Option<String>,
    /// `.class` conditions.
    pub classes: Vec<String>,
    /// Attribute conditions.
    pub attributes: Vec<AttrSelector>,
    /// Pseudo-class conditions.
    pub pseudo_classes: Vec<PseudoClass>,
    /// Pseudo-element, e.g. `before`.
    pub pseudo_element: Option<String>,
}

impl Compound {
    fn specificity(&self) -> Specificity {
        let mut spec = Specificity(0, u32::from(self.id.is_some()), 0, 0);
        spec.2 += u32::try_from(self.classes.len() + self.attributes.len()).unwrap_or(u32::MAX);
        for pseudo in &self.pseudo_classes {
            spec = match pseudo {
                PseudoClass::Not(inner) => spec + inner.specificity(),
                PseudoClass::Named(_) => spec + Specificity(0, 0, 1, 0),
            };
        }
        if self.tag.as_deref().is_some_and(|t| t != "*") {
            spec.3 += 1;
        }
        if self.pseudo_element.is_some() {
            spec.3 += 1;
        }
        spec
    }

    /// Returns true if this compound matches the element.
    ///
    /// Dynamic pseudo-classes are treated as potentially matching, while
    /// pseudo-classes this subset cannot evaluate never match. Rules
    /// carrying a pseudo-element never match the element itself.
    #[must_use]
    pub fn matches(&self, tree: &ElementTree, id: ElementId) -> bool {
        let Some(element) = tree.get(id) else {
            return false;
        };
        if self.pseudo_element.is_some() {
            return false;
        }
        if let Some(tag) = self.tag.as_deref() {
            if tag != "*" && !tag.eq_ignore_ascii_case(&element.tag) {
                return false;
            }
        }
        if let Some(want) = self.id.as_deref() {
            if element.dom_id() != Some(want) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        if !self
            .attributes
            .iter()
            .all(|a| a.matches(element.attr(&a.name)))
        {
            return false;
        }
        self.pseudo_classes.iter().all(|p| match p {
            PseudoClass::Not(inner) => !inner.matches(tree, id),
            PseudoClass::Named(name) => structural_match(name, tree, id),
        })
    }
}

fn siblings(tree: &ElementTree, id: ElementId) -> &[ElementId] {
    match tree.get(id).and_then(|e| e.parent).and_then(|p| tree.get(p)) {
        Some(parent) => &parent.children,
        None => tree.roots(),
    }
}

fn structural_match(name: &str, tree: &ElementTree, id: ElementId) -> bool {
    let sibs = siblings(tree, id);
    match name {
        "first-child" => sibs.first() == Some(&id),
        "last-child" => sibs.last() == Some(&id),
        "only-child" => sibs.len() == 1,
        "root" => tree.get(id).is_some_and(|e| e.parent.is_none()),
        "empty" => tree.get(id).is_some_and(|e| e.children.is_empty()),
        dynamic if DYNAMIC_PSEUDO_CLASSES.contains(&dynamic) => true,
        // Unsupported structural conditions such as `:nth-child(2)`.
        _ => false,
    }
}

/// Compounds joined by combinators, e.g. `nav > ul .item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    parts: Vec<Compound>,
    combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// The rightmost compound, which the selector targets.
    #[must_use]
    pub fn subject(&self) -> &Compound {
        // Parsing never produces an empty selector.
        &self.parts[self.parts.len() - 1]
    }

    /// Specificity of this selector.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.parts
            .iter()
            .fold(Specificity::default(), |acc, c| acc + c.specificity())
    }

    /// Returns true if the selector matches the element.
    #[must_use]
    pub fn matches(&self, tree: &ElementTree, id: ElementId) -> bool {
        self.match_from(self.parts.len() - 1, tree, id)
    }

    fn match_from(&self, idx: usize, tree: &ElementTree, id: ElementId) -> bool {
        if !self.parts[idx].matches(tree, id) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        let prev = idx - 1;
        match self.combinators[prev] {
            Combinator::Descendant => tree
                .ancestors(id)
                .any(|a| self.match_from(prev, tree, a.id)),
            Combinator::Child => tree
                .get(id)
                .and_then(|e| e.parent)
                .is_some_and(|p| self.match_from(prev, tree, p)),
            Combinator::Adjacent => {
                let sibs = siblings(tree, id);
                sibs.iter()
                    .position(|s| *s == id)
                    .and_then(|pos| pos.checked_sub(1))
                    .is_some_and(|pos| self.match_from(prev, tree, sibs[pos]))
            }
            Combinator::Sibling => {
                let sibs = siblings(tree, id);
                sibs.iter()
                    .take_while(|s| **s != id)
                    .any(|s| self.match_from(prev, tree, *s))
            }
        }
    }
}

/// A comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parses a selector list.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or malformed selectors.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let selectors = split_top_level(text, ',')
            .into_iter()
            .map(|part| Parser::new(text, part).parse_complex())
            .collect::<Result<Vec<_>, _>>()?;
        if selectors.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { selectors })
    }

    /// The individual selectors.
    #[must_use]
    pub fn selectors(&self) -> &[ComplexSelector] {
        &self.selectors
    }

    /// Highest specificity among the list's selectors.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.selectors
            .iter()
            .map(ComplexSelector::specificity)
            .max()
            .unwrap_or_default()
    }

    /// Returns true if any selector in the list matches the element.
    #[must_use]
    pub fn matches(&self, tree: &ElementTree, id: ElementId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, id))
    }

    /// First pseudo-class on the subject of the first selector, e.g. `focus`.
    #[must_use]
    pub fn subject_pseudo_class(&self) -> Option<&str> {
        self.selectors
            .first()
            .and_then(|s| s.subject().pseudo_classes.first())
            .map(PseudoClass::name)
    }

    /// The `#id` of the subject when the list is a single selector.
    #[must_use]
    pub fn subject_id(&self) -> Option<&str> {
        match self.selectors.as_slice() {
            [single] => single.subject().id.as_deref(),
            _ => None,
        }
    }

    /// Returns true if any subject carries a pseudo-element.
    #[must_use]
    pub fn targets_pseudo_element(&self) -> bool {
        self.selectors
            .iter()
            .any(|s| s.subject().pseudo_element.is_some())
    }
}

fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, c) if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '\\'
}

struct Parser<'a> {
    full: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(full: &'a str, part: &str) -> Self {
        Self {
            full,
            chars: part.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.full.to_string(),
            found,
            position: self.pos,
        }
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_char(c) {
                break;
            }
            if c != '\\' {
                out.push(c);
            }
            self.pos += 1;
        }
        out
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut parts = Vec::new();
        let mut combinators = Vec::new();
        self.skip_ws();
        loop {
            parts.push(self.parse_compound()?);
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::Adjacent,
                Some('~') => Combinator::Sibling,
                Some(_) if had_ws => {
                    combinators.push(Combinator::Descendant);
                    continue;
                }
                Some(c) => return Err(self.unexpected(c)),
            };
            self.pos += 1;
            self.skip_ws();
            combinators.push(combinator);
        }
        Ok(ComplexSelector { parts, combinators })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let start = self.pos;
        if self.peek() == Some('*') {
            self.pos += 1;
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident().to_ascii_lowercase());
        }
        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.pos += 1;
                    compound.id = Some(self.ident());
                }
                '.' => {
                    self.pos += 1;
                    compound.classes.push(self.ident());
                }
                '[' => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                ':' => {
                    self.pos += 1;
                    if self.peek() == Some(':') {
                        self.pos += 1;
                        compound.pseudo_element = Some(self.ident().to_ascii_lowercase());
                    } else {
                        let name = self.ident().to_ascii_lowercase();
                        let pseudo = self.parse_pseudo(name)?;
                        compound.pseudo_classes.push(pseudo);
                    }
                }
                _ => break,
            }
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Empty,
            });
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_ws();
        let name = self.ident().to_ascii_lowercase();
        self.skip_ws();
        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrSelector {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => AttrOp::Equals,
            Some('~') => AttrOp::Includes,
            Some('^') => AttrOp::Prefix,
            Some('$') => AttrOp::Suffix,
            Some('*') => AttrOp::Substring,
            Some('|') => AttrOp::DashMatch,
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(self.unterminated("attribute selector")),
        };
        self.pos += 1;
        if op != AttrOp::Equals {
            if self.peek() != Some('=') {
                return Err(match self.peek() {
                    Some(c) => self.unexpected(c),
                    None => self.unterminated("attribute selector"),
                });
            }
            self.pos += 1;
        }
        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.peek() {
                        Some(c) if c == q => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => {
                            value.push(c);
                            self.pos += 1;
                        }
                        None => return Err(self.unterminated("string")),
                    }
                }
                value
            }
            _ => self.ident(),
        };
        self.skip_ws();
        // Case-sensitivity flags (`i`/`s`) are accepted and ignored.
        if self.peek().is_some_and(|c| c == 'i' || c == 's') {
            self.pos += 1;
            self.skip_ws();
        }
        if self.peek() != Some(']') {
            return Err(self.unterminated("attribute selector"));
        }
        self.pos += 1;
        Ok(AttrSelector { name, op, value })
    }

    fn parse_pseudo(&mut self, name: String) -> Result<PseudoClass, SelectorError> {
        if self.peek() != Some('(') {
            return Ok(PseudoClass::Named(name));
        }
        self.pos += 1;
        let start = self.pos;
        let mut depth = 1;
        while let Some(c) = self.peek() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        if self.peek() != Some(')') {
            return Err(self.unterminated("pseudo-class argument"));
        }
        let argument: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        if name == "not" {
            let mut inner = Parser::new(self.full, argument.trim());
            let compound = inner.parse_compound()?;
            return Ok(PseudoClass::Not(Box::new(compound)));
        }
        Ok(PseudoClass::Named(name))
    }

    fn unterminated(&self, what: &'static str) -> SelectorError {
        SelectorError::Unterminated {
            selector: self.full.to_string(),
            what,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementTreeBuilder;
    use crate::types::Location;

    fn tree() -> ElementTree {
        let mut b = ElementTreeBuilder::new();
        let loc = |line| Location::new("t.html", line, 1);
        b.open("nav", [("id", "main-nav"), ("class", "nav")], loc(1));
        b.open("ul", [("role", "menubar")], loc(2));
        b.leaf("li", [("class", "item active"), ("data-kind", "link")], loc(3));
        b.leaf("li", [("class", "item")], loc(4));
        b.close();
        b.close();
        b.finish()
    }

    fn spec(sel: &str) -> Specificity {
        SelectorList::parse(sel).expect("parse").specificity()
    }

    #[test]
    fn specificity_terms() {
        assert_eq!(spec("li"), Specificity(0, 0, 0, 1));
        assert_eq!(spec("#main-nav .item"), Specificity(0, 1, 1, 0));
        assert_eq!(spec("ul > li.item:focus"), Specificity(0, 0, 2, 2));
        assert_eq!(spec("a::before"), Specificity(0, 0, 0, 2));
        assert_eq!(spec("li:not(.active)"), Specificity(0, 0, 1, 1));
        assert_eq!(spec("[data-kind=link]"), Specificity(0, 0, 1, 0));
        assert!(spec("#a") > spec(".a.b.c.d"));
    }

    #[test]
    fn matches_descendant_and_child() {
        let tree = tree();
        let first = ElementId(2);
        assert!(SelectorList::parse("nav li").expect("parse").matches(&tree, first));
        assert!(SelectorList::parse("ul > li").expect("parse").matches(&tree, first));
        assert!(!SelectorList::parse("nav > li").expect("parse").matches(&tree, first));
        assert!(SelectorList::parse("#main-nav .item.active")
            .expect("parse")
            .matches(&tree, first));
    }

    #[test]
    fn matches_attributes_and_not() {
        let tree = tree();
        let list = SelectorList::parse("li[data-kind^=li]").expect("parse");
        assert!(list.matches(&tree, ElementId(2)));
        assert!(!list.matches(&tree, ElementId(3)));
        let not_active = SelectorList::parse("li:not(.active)").expect("parse");
        assert!(!not_active.matches(&tree, ElementId(2)));
        assert!(not_active.matches(&tree, ElementId(3)));
    }

    #[test]
    fn matches_siblings_and_structure() {
        let tree = tree();
        assert!(SelectorList::parse(".active + li").expect("parse").matches(&tree, ElementId(3)));
        assert!(SelectorList::parse(".active ~ li").expect("parse").matches(&tree, ElementId(3)));
        assert!(SelectorList::parse("li:first-child").expect("parse").matches(&tree, ElementId(2)));
        assert!(!SelectorList::parse("li:first-child").expect("parse").matches(&tree, ElementId(3)));
    }

    #[test]
    fn pseudo_elements_never_match() {
        let tree = tree();
        let list = SelectorList::parse("li::before").expect("parse");
        assert!(!list.matches(&tree, ElementId(2)));
        assert!(list.targets_pseudo_element());
    }

    #[test]
    fn dynamic_pseudo_is_potential_match() {
        let tree = tree();
        let list = SelectorList::parse("li:focus").expect("parse");
        assert!(list.matches(&tree, ElementId(2)));
        assert_eq!(list.subject_pseudo_class(), Some("focus"));
    }

    #[test]
    fn unsupported_pseudo_never_matches() {
        let tree = tree();
        let list = SelectorList::parse("li:nth-child(2)").expect("parse");
        assert!(!list.matches(&tree, ElementId(2)));
        assert!(!list.matches(&tree, ElementId(3)));
    }

    #[test]
    fn lists_and_subject_id() {
        let list = SelectorList::parse("h1, h2 , .x").expect("parse");
        assert_eq!(list.selectors().len(), 3);
        assert_eq!(SelectorList::parse("nav #menu").expect("parse").subject_id(), Some("menu"));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(SelectorList::parse("  "), Err(SelectorError::Empty));
        assert!(SelectorList::parse("li[data-x").is_err());
        assert!(SelectorList::parse("document.activeElement()").is_err());
        assert!(SelectorList::parse("a > ").is_err());
    }
}
