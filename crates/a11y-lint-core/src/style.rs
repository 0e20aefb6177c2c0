//! Style rules produced by a style leaf producer.

use crate::selector::{SelectorError, SelectorList, Specificity};
use crate::types::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const VISIBILITY_PROPERTIES: &[&str] = &[
    "display",
    "visibility",
    "opacity",
    "clip",
    "clip-path",
    "position",
    "left",
    "top",
    "width",
    "height",
    "transform",
];

const CONTRAST_PROPERTIES: &[&str] = &[
    "color",
    "background",
    "background-color",
    "opacity",
    "filter",
    "mix-blend-mode",
];

const FOCUS_PROPERTIES: &[&str] = &[
    "outline",
    "outline-style",
    "outline-width",
    "outline-color",
    "outline-offset",
    "box-shadow",
];

/// One style rule, immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Selector text as written.
    pub selector: String,
    /// Specificity, computed once at construction.
    pub specificity: Specificity,
    /// Declarations by lowercase property name.
    pub properties: BTreeMap<String, String>,
    /// Pseudo-class on the selector's subject, e.g. `focus`.
    pub pseudo_class: Option<String>,
    /// Position across all style sources of a page.
    pub source_order: usize,
    /// Where the rule starts.
    pub location: Location,
    /// The rule styles a focus state or outline.
    pub affects_focus: bool,
    /// The rule can hide or move content.
    pub affects_visibility: bool,
    /// The rule changes colors or transparency.
    pub affects_contrast: bool,
}

impl StyleRule {
    /// Creates a rule, computing specificity and flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector cannot be parsed.
    pub fn new<I, K, V>(
        selector: &str,
        declarations: I,
        location: Location,
    ) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let parsed = SelectorList::parse(selector)?;
        let properties: BTreeMap<String, String> = declarations
            .into_iter()
            .map(|(k, v)| (k.into().trim().to_ascii_lowercase(), v.into().trim().to_string()))
            .collect();
        Ok(Self::with_parsed(selector, &parsed, properties, location))
    }

    /// Synthesizes the rule for an element's inline `style` attribute.
    #[must_use]
    pub fn inline(style_attr: &str, location: Location) -> Self {
        let properties = parse_declarations(style_attr);
        let mut rule = Self {
            selector: String::from("[style]"),
            specificity: Specificity::INLINE,
            properties,
            pseudo_class: None,
            source_order: usize::MAX,
            location,
            affects_focus: false,
            affects_visibility: false,
            affects_contrast: false,
        };
        rule.compute_flags();
        rule
    }

    fn with_parsed(
        selector: &str,
        parsed: &SelectorList,
        properties: BTreeMap<String, String>,
        location: Location,
    ) -> Self {
        let mut rule = Self {
            selector: selector.trim().to_string(),
            specificity: parsed.specificity(),
            properties,
            pseudo_class: parsed.subject_pseudo_class().map(str::to_string),
            source_order: 0,
            location,
            affects_focus: false,
            affects_visibility: false,
            affects_contrast: false,
        };
        rule.compute_flags();
        rule
    }

    fn compute_flags(&mut self) {
        let properties = &self.properties;
        let has_any = |names: &[&str]| properties.keys().any(|k| names.contains(&k.as_str()));
        let focus_pseudo = self
            .pseudo_class
            .as_deref()
            .is_some_and(|p| p.starts_with("focus"));
        let affects_focus = focus_pseudo || has_any(FOCUS_PROPERTIES);
        let affects_visibility = has_any(VISIBILITY_PROPERTIES);
        let affects_contrast = has_any(CONTRAST_PROPERTIES);
        self.affects_focus = affects_focus;
        self.affects_visibility = affects_visibility;
        self.affects_contrast = affects_contrast;
    }

    /// Sets the source order.
    #[must_use]
    pub fn with_source_order(mut self, order: usize) -> Self {
        self.source_order = order;
        self
    }

    /// Returns a declared property value.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Parses the selector again. Rules are only constructed from valid
    /// selectors, but deserialized rules may carry anything.
    #[must_use]
    pub fn selector_list(&self) -> Option<SelectorList> {
        SelectorList::parse(&self.selector).ok()
    }

    /// Returns true if this rule, on its own, takes content out of view.
    #[must_use]
    pub fn hides_content(&self) -> bool {
        if self.property("display").is_some_and(|v| keyword(v) == "none") {
            return true;
        }
        if self
            .property("visibility")
            .is_some_and(|v| matches!(keyword(v).as_str(), "hidden" | "collapse"))
        {
            return true;
        }
        if self
            .property("opacity")
            .and_then(|v| keyword(v).parse::<f32>().ok())
            .is_some_and(|o| o <= 0.0)
        {
            return true;
        }
        self.property("clip").is_some_and(is_zero_clip_rect)
    }

    /// Returns true if the rule removes the focus outline.
    #[must_use]
    pub fn removes_outline(&self) -> bool {
        self.property("outline")
            .is_some_and(|v| matches!(keyword(v).as_str(), "none" | "0" | "0px"))
            || self
                .property("outline-style")
                .is_some_and(|v| keyword(v) == "none")
            || self
                .property("outline-width")
                .is_some_and(|v| matches!(keyword(v).as_str(), "0" | "0px"))
    }

    /// Returns true if the rule draws a visible focus indicator.
    #[must_use]
    pub fn draws_indicator(&self) -> bool {
        let outline = self.property("outline").is_some_and(|v| {
            !matches!(keyword(v).as_str(), "none" | "0" | "0px")
        });
        let shadow = self
            .property("box-shadow")
            .is_some_and(|v| keyword(v) != "none");
        let border = self.properties.keys().any(|k| k.starts_with("border"));
        let background = self.properties.keys().any(|k| k.starts_with("background"));
        outline || shadow || border || background || self.property("text-decoration").is_some()
    }
}

/// Lowercased value without `!important`.
pub(crate) fn keyword(value: &str) -> String {
    value
        .trim()
        .trim_end_matches("!important")
        .trim()
        .to_ascii_lowercase()
}

fn is_zero_clip_rect(value: &str) -> bool {
    let value = keyword(value);
    let Some(inner) = value
        .strip_prefix("rect(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return false;
    };
    let terms: Vec<&str> = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    terms.len() == 4
        && terms
            .iter()
            .all(|t| t.trim_end_matches("px").parse::<f32>().is_ok_and(|n| n == 0.0))
}

/// Parses `prop: value; prop2: value2` declarations as found in `style` attributes.
#[must_use]
pub fn parse_declarations(text: &str) -> BTreeMap<String, String> {
    text.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            (!name.is_empty()).then(|| (name, value.trim().to_string()))
        })
        .collect()
}

/// Parses a CSS length in px; `None` for other units.
pub(crate) fn px_value(value: &str) -> Option<f32> {
    let value = keyword(value);
    if value == "0" {
        return Some(0.0);
    }
    value.strip_suffix("px")?.trim().parse().ok()
}
