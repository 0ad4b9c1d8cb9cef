//! Rendering resolution results.

use std::fmt::Write as _;

use jvdeps_resolve::{GenerationReport, UnitKind, UnitOutcome, UnitResolution};
use owo_colors::OwoColorize;

use super::{paint, success, warning};

/// The block printed to stdout for one unit.
pub fn render_resolution(resolution: &UnitResolution) -> String {
    let mut out = String::new();
    let _ = write!(out, "{}", paint(resolution.label.as_str(), |s| s.bold().to_string()));
    if resolution.kind == UnitKind::Test {
        let _ = write!(out, " {}", paint("(test)", |s| s.dimmed().to_string()));
    }
    out.push('\n');
    for (name, labels) in [("deps", &resolution.deps), ("runtime_deps", &resolution.runtime_deps)] {
        if labels.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {name}:");
        for label in labels {
            let _ = writeln!(out, "    {label}");
        }
    }
    out
}

/// Print a unit's labels to stdout and its problems to stderr.
pub fn print_unit(outcome: &UnitOutcome) {
    match outcome {
        UnitOutcome::Resolved(resolution) => {
            print!("{}", render_resolution(resolution));
            for symbol in &resolution.report.unresolved {
                warning(&format!(
                    "{}: unresolved symbol {symbol}",
                    resolution.directory.display()
                ));
            }
            for ambiguity in &resolution.report.ambiguities {
                warning(&format!("{}: {ambiguity}", resolution.directory.display()));
            }
        }
        UnitOutcome::Skipped { directory, error } => {
            super::error(&format!("{}: skipped: {error}", directory.display()));
        }
    }
}

pub fn summary_line(report: &GenerationReport) -> String {
    format!(
        "Resolved {} unit(s), parsed {} file(s); {} skipped, {} unresolved, {} ambiguous",
        report.resolved().count(),
        report.parsed_files,
        report.skipped(),
        report.unresolved(),
        report.ambiguities(),
    )
}

pub fn print_summary(report: &GenerationReport) {
    let line = summary_line(report);
    if report.skipped() + report.unresolved() + report.ambiguities() == 0 {
        success(&line);
    } else {
        warning(&line);
    }
}
