//! Core types for accessibility issues and reports.

use crate::scope::AnalysisScope;
use crate::standards;
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for accessibility issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a lowercase severity name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path as reported by the leaf producer.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    #[serde(default)]
    pub offset: usize,
    /// Length of the span in bytes.
    #[serde(default)]
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }

    /// Calculates the byte offset of this location's line and column in `content`.
    ///
    /// Returns 0 when the line is out of bounds.
    #[must_use]
    pub fn offset_in(&self, content: &str) -> usize {
        if self.line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in content.lines().enumerate() {
            if i + 1 == self.line {
                return offset + self.column.saturating_sub(1).min(line_content.len());
            }
            offset += line_content.len() + 1;
        }

        0
    }

    /// Returns true if `other` is in the same file within `window` lines.
    #[must_use]
    pub fn is_near(&self, other: &Self, window: usize) -> bool {
        self.file == other.file && self.line.abs_diff(other.line) <= window
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A proposed fix. Fixes are templates only; nothing is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    /// Human-readable description of the fix.
    pub description: String,
    /// Code the author can adapt, e.g. a handler skeleton.
    pub code_template: String,
}

impl Fix {
    /// Creates a new fix template.
    #[must_use]
    pub fn new(description: impl Into<String>, code_template: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            code_template: code_template.into(),
        }
    }
}

/// Reliability grade of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    /// Little cross-file context was available.
    Low,
    /// The full page was available.
    Medium,
    /// The whole workspace was available, or the finding needs no context.
    High,
}

impl ConfidenceLevel {
    /// Confidence level implied by the context that produced a finding.
    #[must_use]
    pub fn for_scope(scope: AnalysisScope) -> Self {
        match scope {
            AnalysisScope::File => Self::Low,
            AnalysisScope::Page => Self::Medium,
            AnalysisScope::Project => Self::High,
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Confidence grade with its justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confidence {
    /// Grade.
    pub level: ConfidenceLevel,
    /// Why this grade was assigned.
    pub reason: String,
}

impl Confidence {
    /// Creates a confidence grade.
    #[must_use]
    pub fn new(level: ConfidenceLevel, reason: impl Into<String>) -> Self {
        Self {
            level,
            reason: reason.into(),
        }
    }

    /// Confidence for a finding whose reliability depends on available context.
    #[must_use]
    pub fn for_scope(scope: AnalysisScope, reason: impl Into<String>) -> Self {
        Self::new(ConfidenceLevel::for_scope(scope), reason)
    }

    /// Confidence for a finding decided by markup alone.
    #[must_use]
    pub fn certain(reason: impl Into<String>) -> Self {
        Self::new(ConfidenceLevel::High, reason)
    }
}

/// An accessibility issue found by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Issue type (e.g., "interactive-role-static").
    #[serde(rename = "type")]
    pub issue_type: String,
    /// Severity of this issue.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Short codes of the violated guideline criteria (see [`standards`]).
    pub standard_refs: Vec<String>,
    /// Optional fix template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
    /// Optional confidence grade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    /// Source locations, primary first.
    pub locations: Vec<Location>,
    /// Checklist item that distinguishes several issues of one type on one element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Issue {
    /// Creates a new issue.
    #[must_use]
    pub fn new(issue_type: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            issue_type: issue_type.into(),
            severity,
            message: message.into(),
            standard_refs: Vec::new(),
            fix: None,
            confidence: None,
            locations: Vec::new(),
            detail: None,
        }
    }

    /// Adds a standard reference code.
    #[must_use]
    pub fn with_standard(mut self, code: impl Into<String>) -> Self {
        self.standard_refs.push(code.into());
        self
    }

    /// Adds a location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Adds a fix template.
    #[must_use]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Adds a confidence grade.
    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Adds a checklist detail key.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Returns the primary location, if any.
    #[must_use]
    pub fn primary_location(&self) -> Option<&Location> {
        self.locations.first()
    }

    /// Returns the confidence level, if graded.
    #[must_use]
    pub fn confidence_level(&self) -> Option<ConfidenceLevel> {
        self.confidence.as_ref().map(|c| c.level)
    }

    /// Formats the issue for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = match self.primary_location() {
            Some(loc) => format!("{} at {loc}\n", self.issue_type),
            None => format!("{}\n", self.issue_type),
        };
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(fix) = &self.fix {
            let _ = writeln!(output, "  = help: {}", fix.description);
        }
        if let Some(confidence) = &self.confidence {
            let _ = writeln!(
                output,
                "  = confidence: {} ({})",
                confidence.level, confidence.reason
            );
        }
        for code in &self.standard_refs {
            match standards::lookup(code) {
                Some(reference) => {
                    let _ = writeln!(output, "  = see: {code} {}", reference.url);
                }
                None => {
                    let _ = writeln!(output, "  = see: {code}");
                }
            }
        }
        output
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(loc) = self.primary_location() {
            write!(f, "{loc}: ")?;
        }
        write!(f, "{} [{}] {}", self.severity, self.issue_type, self.message)?;
        if !self.standard_refs.is_empty() {
            write!(f, " (see: {})", self.standard_refs.join(", "))?;
        }
        Ok(())
    }
}

/// Converts an Issue into a miette Diagnostic for rich display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("[{issue_type}] {message}")]
pub struct IssueDiagnostic {
    issue_type: String,
    message: String,
    #[help]
    help: Option<String>,
    #[source_code]
    source_code: NamedSource<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl IssueDiagnostic {
    /// Builds a diagnostic for `issue`, taking the snippet from `source`.
    #[must_use]
    pub fn new(issue: &Issue, source: impl Into<String>) -> Self {
        let source = source.into();
        let (name, span) = match issue.primary_location() {
            Some(loc) => {
                let offset = if loc.offset > 0 {
                    loc.offset
                } else {
                    loc.offset_in(&source)
                }
                .min(source.len());
                let length = if loc.length > 0 {
                    loc.length
                } else {
                    source
                        .get(offset..)
                        .map_or(0, |rest| rest.find('\n').unwrap_or(rest.len()))
                };
                (loc.file.display().to_string(), SourceSpan::from((offset, length)))
            }
            None => (String::from("<unknown>"), SourceSpan::from((0, 0))),
        };

        let mut help_lines = Vec::new();
        if let Some(fix) = &issue.fix {
            help_lines.push(fix.description.clone());
        }
        for code in &issue.standard_refs {
            if let Some(reference) = standards::lookup(code) {
                help_lines.push(format!("{} {}: {}", code, reference.title, reference.url));
            }
        }

        Self {
            issue_type: issue.issue_type.clone(),
            message: issue.message.clone(),
            help: (!help_lines.is_empty()).then(|| help_lines.join("\n")),
            source_code: NamedSource::new(name, source),
            span,
            label_message: issue.severity.to_string(),
        }
    }

    /// Renders the diagnostic as plain text (no colors).
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let handler =
            miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor());
        if handler.render_report(&mut out, self).is_err() {
            return format!("{self}");
        }
        out
    }
}

/// Result of analyzing one or more pages.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// All issues found, aggregated.
    pub issues: Vec<Issue>,
    /// Number of pages (or stand-alone files) analyzed.
    pub pages_analyzed: usize,
}

impl AnalysisReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Returns issues filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Returns issues of the given type.
    #[must_use]
    pub fn by_type(&self, issue_type: &str) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|i| i.issue_type == issue_type)
            .collect()
    }

    /// Counts issues by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.issues
            .iter()
            .fold((0, 0, 0), |(e, w, i), issue| match issue.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// Checks if any issue meets or exceeds the given severity threshold.
    #[must_use]
    pub fn has_issues_at(&self, severity: Severity) -> bool {
        self.issues.iter().any(|i| i.severity >= severity)
    }

    /// Formats a summary report.
    #[must_use]
    pub fn format_report(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        for issue in &self.issues {
            let _ = writeln!(report, "{}", issue.format());
        }
        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            report,
            "Found {} error(s), {} warning(s), {} info(s) in {} page(s)",
            errors, warnings, infos, self.pages_analyzed
        );
        report
    }

    /// Adds issues from another report.
    pub fn extend(&mut self, other: Self) {
        self.issues.extend(other.issues);
        self.pages_analyzed += other.pages_analyzed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_issue(severity: Severity) -> Issue {
        Issue::new("interactive-role-static", severity, "div has role=button but no handler")
            .with_standard("WCAG-2.1.1")
            .at(Location::new("index.html", 3, 5))
    }

    #[test]
    fn severity_orders_error_highest() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(Severity::parse("warning"), Some(Severity::Warning));
        assert_eq!(Severity::parse("fatal"), None);
    }

    #[test]
    fn confidence_is_monotonic_in_scope() {
        let file = ConfidenceLevel::for_scope(AnalysisScope::File);
        let page = ConfidenceLevel::for_scope(AnalysisScope::Page);
        let project = ConfidenceLevel::for_scope(AnalysisScope::Project);
        assert!(file < page);
        assert!(page < project);
    }

    #[test]
    fn issue_serializes_with_host_field_names() {
        let issue = make_issue(Severity::Error)
            .with_fix(Fix::new("Add a keydown handler", "el.addEventListener('keydown', fn)"))
            .with_confidence(Confidence::certain("markup only"));
        let json = serde_json::to_value(&issue).expect("serialize");
        assert_eq!(json["type"], "interactive-role-static");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["standardRefs"][0], "WCAG-2.1.1");
        assert_eq!(json["fix"]["codeTemplate"], "el.addEventListener('keydown', fn)");
        assert_eq!(json["confidence"]["level"], "HIGH");
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn format_includes_help_and_reference_url() {
        let issue = make_issue(Severity::Error).with_fix(Fix::new("Use a <button>", "<button>"));
        let formatted = issue.format();
        assert!(formatted.contains("= help: Use a <button>"));
        assert!(formatted.contains("= see: WCAG-2.1.1 https://"));
    }

    #[test]
    fn display_is_single_line() {
        let display = format!("{}", make_issue(Severity::Warning));
        assert!(display.starts_with("index.html:3:5: warning [interactive-role-static]"));
        assert!(!display.contains('\n'));
    }

    #[test]
    fn offset_in_counts_previous_lines() {
        let loc = Location::new("a.html", 2, 3);
        assert_eq!(loc.offset_in("line1\nline2\nline3"), 8);
        assert_eq!(Location::new("a.html", 9, 1).offset_in("x"), 0);
    }

    #[test]
    fn diagnostic_renders_snippet_and_help() {
        let source = "<main>\n  <p>x</p>\n    <div role=\"button\">Go</div>\n</main>\n";
        let issue = make_issue(Severity::Error).with_fix(Fix::new("Bind a click handler", ""));
        let rendered = IssueDiagnostic::new(&issue, source).render();
        assert!(rendered.contains("interactive-role-static"));
        assert!(rendered.contains("Bind a click handler"));
    }

    #[test]
    fn report_counts_by_severity() {
        let mut report = AnalysisReport::new();
        report.pages_analyzed = 2;
        report.issues.push(make_issue(Severity::Error));
        report.issues.push(make_issue(Severity::Warning));
        report.issues.push(make_issue(Severity::Warning));
        assert_eq!(report.count_by_severity(), (1, 2, 0));
        assert!(report.has_errors());
        assert!(report.has_issues_at(Severity::Warning));
        assert!(report.format_report().contains("1 error(s), 2 warning(s)"));
    }
}
