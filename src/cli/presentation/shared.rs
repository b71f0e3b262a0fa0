//! Shared presentation helpers.

use crate::tree::builder::BuildWarning;
use owo_colors::OwoColorize;

pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// One stderr line per build warning.
pub fn format_warnings(warnings: &[BuildWarning]) -> Vec<String> {
    warnings
        .iter()
        .map(|w| format!("{} {}", "warning:".yellow(), w))
        .collect()
}
