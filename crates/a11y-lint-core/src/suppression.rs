//! Markup allowance directives.
//!
//! An element may opt out of analyzers for itself and its descendants:
//!
//! ```text
//! <div data-a11y-allow="mouse-only-click, positive-tabindex"
//!      data-a11y-allow-reason="legacy widget, replaced in v3">
//! ```
//!
//! Entries name an analyzer or an issue type; `all` matches everything.
//! Suppressing an error without a reason produces an
//! [`MISSING_REASON`] warning at the directive.

use crate::dom::{ElementId, ElementTree};
use crate::standards;
use crate::types::{Confidence, Issue, Location, Severity};
use std::collections::HashSet;

/// Attribute listing allowed analyzers or issue types.
pub const ALLOW_ATTR: &str = "data-a11y-allow";

/// Attribute giving the reason for an allowance.
pub const ALLOW_REASON_ATTR: &str = "data-a11y-allow-reason";

/// Issue type emitted when an error is suppressed without a reason.
pub const MISSING_REASON: &str = "allow-missing-reason";

/// Result of checking an issue against the directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// The issue stands.
    Denied,
    /// The issue is suppressed.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
        /// Where the directive is written.
        directive: Location,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason, .. } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// One parsed directive.
#[derive(Debug, Clone)]
pub struct AllowDirective {
    /// Element carrying the directive.
    pub element: ElementId,
    /// Allowed analyzer names or issue types.
    pub entries: HashSet<String>,
    /// Optional reason.
    pub reason: Option<String>,
    /// Element location.
    pub location: Location,
}

impl AllowDirective {
    fn covers(&self, analyzer: &str, issue_type: &str) -> bool {
        self.entries.contains("all")
            || self.entries.contains(analyzer)
            || self.entries.contains(issue_type)
    }
}

/// All directives of one markup tree.
#[derive(Debug, Clone, Default)]
pub struct Suppressions<'a> {
    tree: Option<&'a ElementTree>,
    directives: Vec<AllowDirective>,
}

impl<'a> Suppressions<'a> {
    /// Collects the directives of `tree`.
    #[must_use]
    pub fn from_tree(tree: &'a ElementTree) -> Self {
        let directives = tree
            .iter()
            .filter_map(|element| {
                let entries: HashSet<String> = element
                    .attr(ALLOW_ATTR)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if entries.is_empty() {
                    return None;
                }
                let reason = element
                    .attr(ALLOW_REASON_ATTR)
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from);
                Some(AllowDirective {
                    element: element.id,
                    entries,
                    reason,
                    location: element.location.clone(),
                })
            })
            .collect();
        Self {
            tree: Some(tree),
            directives,
        }
    }

    /// Returns true if there are no directives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Checks one issue from `analyzer`.
    ///
    /// An issue is covered when one of its locations is the start of an
    /// element carrying (or nested in an element carrying) a matching directive.
    #[must_use]
    pub fn check(&self, analyzer: &str, issue: &Issue) -> AllowCheck {
        let Some(tree) = self.tree else {
            return AllowCheck::Denied;
        };
        if self.directives.is_empty() {
            return AllowCheck::Denied;
        }
        for location in &issue.locations {
            let Some(element) = tree.iter().find(|e| same_position(&e.location, location)) else {
                continue;
            };
            for scope in tree.self_and_ancestors(element.id) {
                if let Some(directive) = self
                    .directives
                    .iter()
                    .find(|d| d.element == scope.id && d.covers(analyzer, &issue.issue_type))
                {
                    return AllowCheck::Allowed {
                        reason: directive.reason.clone(),
                        directive: directive.location.clone(),
                    };
                }
            }
        }
        AllowCheck::Denied
    }

    /// Removes allowed issues of one analyzer.
    ///
    /// When `requires_reason` is set, each suppressed error without a reason
    /// is replaced by an [`MISSING_REASON`] warning at the directive.
    #[must_use]
    pub fn apply(&self, analyzer: &str, requires_reason: bool, issues: Vec<Issue>) -> Vec<Issue> {
        if self.directives.is_empty() {
            return issues;
        }
        let mut kept = Vec::with_capacity(issues.len());
        for issue in issues {
            match self.check(analyzer, &issue) {
                AllowCheck::Denied => kept.push(issue),
                AllowCheck::Allowed { reason: Some(_), .. } => {}
                AllowCheck::Allowed {
                    reason: None,
                    directive,
                } => {
                    if requires_reason && issue.severity == Severity::Error {
                        kept.push(missing_reason(analyzer, &issue, directive));
                    }
                }
            }
        }
        kept
    }
}

fn same_position(a: &Location, b: &Location) -> bool {
    a.file == b.file && a.line == b.line && a.column == b.column
}

fn missing_reason(analyzer: &str, issue: &Issue, directive: Location) -> Issue {
    Issue::new(
        MISSING_REASON,
        Severity::Warning,
        format!(
            "`{}` suppresses error `{}` from {analyzer} without {ALLOW_REASON_ATTR}",
            ALLOW_ATTR, issue.issue_type
        ),
    )
    .with_standard(standards::INFO_AND_RELATIONSHIPS)
    .with_confidence(Confidence::certain("directive found in markup"))
    .at(directive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementTreeBuilder;

    fn loc(line: usize) -> Location {
        Location::new("index.html", line, 1)
    }

    fn tree(reason: Option<&str>) -> ElementTree {
        let mut attrs = vec![(ALLOW_ATTR, "mouse-only-click, interactive-role-static")];
        if let Some(reason) = reason {
            attrs.push((ALLOW_REASON_ATTR, reason));
        }
        let mut b = ElementTreeBuilder::new();
        b.open("section", attrs, loc(1));
        b.leaf("div", [("role", "button")], loc(2));
        b.close();
        b.leaf("div", [("role", "button")], loc(4));
        b.finish()
    }

    fn issue(kind: &str, severity: Severity, line: usize) -> Issue {
        Issue::new(kind, severity, "m").at(loc(line))
    }

    #[test]
    fn covers_descendants_by_analyzer_or_type() {
        let t = tree(Some("legacy"));
        let s = Suppressions::from_tree(&t);
        assert!(s.check("interactive-role", &issue("interactive-role-static", Severity::Error, 2)).is_allowed());
        assert!(s.check("mouse-only-click", &issue("mouse-only-click", Severity::Warning, 2)).is_allowed());
        assert!(!s.check("interactive-role", &issue("interactive-role-static", Severity::Error, 4)).is_allowed());
        assert!(!s.check("positive-tabindex", &issue("positive-tabindex", Severity::Warning, 2)).is_allowed());
        assert_eq!(
            s.check("x", &issue("mouse-only-click", Severity::Warning, 2)).reason(),
            Some("legacy")
        );
    }

    #[test]
    fn reasonless_error_suppression_warns() {
        let t = tree(None);
        let s = Suppressions::from_tree(&t);
        let out = s.apply(
            "interactive-role",
            true,
            vec![
                issue("interactive-role-static", Severity::Error, 2),
                issue("interactive-role-static", Severity::Error, 4),
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].issue_type, MISSING_REASON);
        assert_eq!(out[0].severity, Severity::Warning);
        assert_eq!(out[0].primary_location(), Some(&loc(1)));
        assert_eq!(out[1].issue_type, "interactive-role-static");
    }

    #[test]
    fn reasonless_warning_suppression_is_silent() {
        let t = tree(None);
        let s = Suppressions::from_tree(&t);
        let out = s.apply("mouse-only-click", false, vec![issue("mouse-only-click", Severity::Warning, 2)]);
        assert!(out.is_empty());
    }
}
