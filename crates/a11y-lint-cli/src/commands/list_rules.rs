//! List rules command implementation.

use a11y_lint_core::standards;
use a11y_lint_rules::all_analyzers;

/// Runs the list-rules command.
pub fn run() {
    println!("Available analyzers:\n");
    println!("{:<10} {:<20} {:<9} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(90));

    for analyzer in all_analyzers() {
        println!(
            "{:<10} {:<20} {:<9} {}",
            analyzer.code(),
            analyzer.name(),
            analyzer.default_severity().to_string(),
            analyzer.description()
        );
        for issue_type in analyzer.issue_types() {
            println!("{:<41} - {}", "", issue_type);
        }
    }

    println!("\nPresets:");
    println!("  recommended  - all but A11Y009 (default)");
    println!("  strict       - all analyzers, wider focus-management window");
    println!("  minimal      - A11Y001, A11Y006 (for gradual adoption)");

    println!("\nStandards:");
    for reference in standards::all() {
        println!("  {:<12} {}", reference.code, reference.title);
    }

    println!("\nUse --rules to filter specific analyzers, e.g.:");
    println!("  a11y-lint check --rules interactive-role,live-region page.json");
    println!("  a11y-lint check --rules A11Y001,A11Y004 page.json");
}
