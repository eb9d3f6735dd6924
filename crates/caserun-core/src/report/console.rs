use crate::engine::RunSummary;

/// Format the end-of-run footer line. Deterministic, unit-testable.
#[must_use]
pub fn format_summary_line(summary: &RunSummary) -> String {
    let ok = summary.executed - summary.failed;
    let icon = if summary.failed == 0 { "✅" } else { "❌" };
    format!(
        "{} run {}: {} cases, {} ok, {} failed ({:.1}s)",
        icon,
        summary.run_id,
        summary.executed,
        ok,
        summary.failed,
        summary.elapsed.as_secs_f64(),
    )
}

/// Print the footer to stderr, keeping stdout clean for recorders that
/// write there.
pub fn print_summary(summary: &RunSummary) {
    eprintln!();
    eprintln!("{}", format_summary_line(summary));
}
