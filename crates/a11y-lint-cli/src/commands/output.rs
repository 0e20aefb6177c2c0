//! Shared output formatting for lint results.

use a11y_lint_core::{AnalysisReport, Issue, IssueDiagnostic, Severity};
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &AnalysisReport) {
    let (errors, warnings, infos) = report.count_by_severity();
    let mut sources: HashMap<PathBuf, Option<String>> = HashMap::new();

    for issue in &report.issues {
        let source = issue.primary_location().and_then(|loc| {
            sources
                .entry(loc.file.clone())
                .or_insert_with(|| std::fs::read_to_string(&loc.file).ok())
                .clone()
        });
        match source {
            Some(source) => {
                let report = miette::Report::new(IssueDiagnostic::new(issue, source));
                println!("{report:?}");
            }
            None => print_plain(issue),
        }
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} page(s)\x1b[0m",
        summary_color, errors, warnings, infos, report.pages_analyzed
    );
}

/// Issue without a readable source file.
fn print_plain(issue: &Issue) {
    let severity_indicator = match issue.severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    };
    match issue.primary_location() {
        Some(loc) => println!(
            "{} at {}:{}:{}",
            issue.issue_type,
            loc.file.display(),
            loc.line,
            loc.column
        ),
        None => println!("{}", issue.issue_type),
    }
    println!("  {}: {}", severity_indicator, issue.message);
    if let Some(fix) = &issue.fix {
        println!("  = help: {}", fix.description);
    }
    if !issue.standard_refs.is_empty() {
        println!("  = see: {}", issue.standard_refs.join(", "));
    }
    println!();
}

fn print_json(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &AnalysisReport) {
    for issue in &report.issues {
        match issue.primary_location() {
            Some(loc) => println!(
                "{}:{}:{}: {} [{}] {}",
                loc.file.display(),
                loc.line,
                loc.column,
                issue.severity,
                issue.issue_type,
                issue.message,
            ),
            None => println!("-: {} [{}] {}", issue.severity, issue.issue_type, issue.message),
        }
    }
}
