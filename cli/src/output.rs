//! Terminal output for CLI commands
//!
//! Tables go to stdout; status lines go to stderr so they never interleave
//! with table rows when stdout is piped.

use colored::Colorize;

/// Placeholder shown for a metric the profiler did not report
pub const MISSING_CELL: &str = "-";

/// Print success message
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    eprintln!("{} {}", "ℹ".blue(), msg);
}

/// Print warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg.yellow());
}

/// Format a utilization percentage for a table cell
pub fn metric_cell(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING_CELL.to_string(), |v| format!("{:.2}", v))
}

/// Warning for sample points dropped because the trace ended first
pub fn warn_unfilled(unfilled: usize, requested: usize) {
    if unfilled > 0 {
        warning(&format!(
            "{} of {} sample points fall after the last launch and are dropped",
            unfilled, requested
        ));
    }
}
