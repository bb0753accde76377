//! Small formatting helpers shared by the tabular writers.

use std::path::Path;

use owo_colors::OwoColorize;

/// Format a number with thousands separators (commas).
#[must_use]
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let digits: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let len = digits.len();
    for (i, &c) in digits.iter().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format a similarity score with a fixed six decimal places.
#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score:.6}")
}

pub(super) fn format_path(path: &Path) -> String {
    path.display().to_string()
}

pub(super) fn bold(s: &str, color: bool) -> String {
    if color { s.bold().to_string() } else { s.to_string() }
}

pub(super) fn dim(s: &str, color: bool) -> String {
    if color { s.dimmed().to_string() } else { s.to_string() }
}
