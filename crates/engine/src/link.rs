//! Hyperlink recovery from raw or formula-embedded cell text.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::RawValue;

/// Matches a HYPERLINK-style formula and captures its first quoted argument.
/// Keyword is case-insensitive; whitespace before the parenthesis is allowed.
fn hyperlink_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)HYPERLINK\s*\(\s*"([^"]+)""#).unwrap())
}

/// A usable URL for the cell, or `None`. Never panics on non-string,
/// empty or missing input.
pub fn extract(value: &RawValue) -> Option<String> {
    let text = match value {
        RawValue::Text(s) => s.trim(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }

    if text.starts_with("http://") || text.starts_with("https://") {
        return Some(text.to_string());
    }

    hyperlink_re()
        .captures(text)
        .map(|caps| caps[1].to_string())
}
