//! Formatting for durations and build reports.

use std::time::Duration;

use neutronium_compiler::{BuildReport, TypeCheckOutcome};

use super::{error, success, warning};

/// Format a duration as `50ms`, `1.50s` or `1m 30s`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use neutronium_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the outcome of a non-fatal build pass.
pub fn print_build_report(report: &BuildReport) {
    for failure in &report.failures {
        error(&format!("{}: {}", failure.source.display(), failure.error));
    }

    if let TypeCheckOutcome::Failed { .. } | TypeCheckOutcome::Unavailable { .. } =
        report.type_check
    {
        warning("Type-check did not pass (advisory, output was still written)");
    }

    let summary = format!(
        "Built {} file{} in {}",
        report.files_written.len(),
        if report.files_written.len() == 1 { "" } else { "s" },
        format_duration(report.duration)
    );

    if report.is_clean() {
        success(&summary);
    } else {
        let warnings = report.warning_count();
        warning(&format!(
            "{} with {} warning{}",
            summary,
            warnings,
            if warnings == 1 { "" } else { "s" }
        ));
    }
}
