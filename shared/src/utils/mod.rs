//! Utility functions and helpers

pub mod time;

/// Render an argument vector as a single shell-like line for logs and errors.
///
/// Arguments containing whitespace or quotes are wrapped in single quotes.
pub fn format_command(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if arg.is_empty() {
                "''".to_string()
            } else if arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
                format!("'{}'", arg.replace('\'', r"'\''"))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
