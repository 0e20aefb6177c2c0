//! Merging, deduplication and ordering of analyzer results.

use crate::types::{Issue, Location, Severity};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Merges per-analyzer issue lists into one report order.
#[derive(Debug, Clone, Copy)]
pub struct IssueAggregator {
    min_severity: Severity,
}

impl Default for IssueAggregator {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl IssueAggregator {
    /// Creates an aggregator that drops issues below `min_severity`.
    #[must_use]
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }

    /// The severity threshold.
    #[must_use]
    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    /// Deduplicates, filters and orders issues.
    ///
    /// Two issues are duplicates when type, locations and detail are equal;
    /// the first one wins. Results are ordered errors first, then by primary
    /// location, with location-less issues last. Inputs are left untouched.
    #[must_use]
    pub fn aggregate(&self, results: &[Vec<Issue>]) -> Vec<Issue> {
        let mut seen: HashSet<(&str, &[Location], Option<&str>)> = HashSet::new();
        let mut merged: Vec<Issue> = results
            .iter()
            .flatten()
            .filter(|issue| issue.severity >= self.min_severity)
            .filter(|issue| {
                seen.insert((
                    issue.issue_type.as_str(),
                    issue.locations.as_slice(),
                    issue.detail.as_deref(),
                ))
            })
            .cloned()
            .collect();
        merged.sort_by(compare);
        merged
    }
}

fn compare(a: &Issue, b: &Issue) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| match (a.primary_location(), b.primary_location()) {
            (Some(x), Some(y)) => x
                .file
                .cmp(&y.file)
                .then(x.line.cmp(&y.line))
                .then(x.column.cmp(&y.column)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: &str, severity: Severity, file: &str, line: usize) -> Issue {
        Issue::new(kind, severity, "msg").at(Location::new(file, line, 1))
    }

    #[test]
    fn deduplicates_on_type_and_locations() {
        let a = vec![issue("x", Severity::Error, "a.html", 1)];
        let b = vec![
            issue("x", Severity::Error, "a.html", 1),
            issue("y", Severity::Error, "a.html", 1),
        ];
        let out = IssueAggregator::default().aggregate(&[a, b]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn detail_keeps_checklist_items_apart() {
        let base = issue("incomplete-tabs-pattern", Severity::Warning, "a.html", 3);
        let first = base.clone().with_detail("missing-tab-children");
        let second = base.with_detail("missing-arrow-keys");
        let out = IssueAggregator::default().aggregate(&[vec![first.clone(), second, first]]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn orders_by_severity_then_location() {
        let input = vec![
            issue("a", Severity::Info, "a.html", 1),
            Issue::new("b", Severity::Error, "no location"),
            issue("c", Severity::Error, "b.html", 2),
            issue("d", Severity::Error, "a.html", 9),
            issue("e", Severity::Warning, "a.html", 1),
        ];
        let out = IssueAggregator::default().aggregate(&[input]);
        let kinds: Vec<&str> = out.iter().map(|i| i.issue_type.as_str()).collect();
        assert_eq!(kinds, vec!["d", "c", "b", "e", "a"]);
    }

    #[test]
    fn filters_below_minimum() {
        let input = vec![
            issue("a", Severity::Info, "a.html", 1),
            issue("b", Severity::Warning, "a.html", 2),
        ];
        let out = IssueAggregator::new(Severity::Warning).aggregate(&[input.clone()]);
        assert_eq!(out.len(), 1);
        assert_eq!(input.len(), 2);
    }
}
