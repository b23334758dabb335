//! Header resolution: map logical field names to actual column headers,
//! tolerant of the naming drift between extracts.

/// Canonical form of a header label: trimmed, lowercased, internal
/// whitespace collapsed, and no spaces around `/` or `-`.
///
/// "Bus/Tram", "Bus/ Tram" and "Bus / Tram" all canonicalize identically.
pub fn canonical_header(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_space = false;

    for ch in label.trim().chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch == '/' || ch == '-' {
            // Drop any space queued before the separator
            pending_space = false;
        } else if pending_space {
            // A space queued after a separator is also dropped
            if !matches!(out.chars().last(), Some('/') | Some('-')) {
                out.push(' ');
            }
            pending_space = false;
        }
        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }

    out
}

/// Index of the first header matching any alias, or `None`.
///
/// A `None` here is soft: the caller materializes the field as a fully-null
/// column and records a warning rather than aborting the pass.
pub fn resolve(headers: &[String], aliases: &[String]) -> Option<usize> {
    let wanted: Vec<String> = aliases.iter().map(|a| canonical_header(a)).collect();
    headers
        .iter()
        .position(|h| wanted.iter().any(|w| *w == canonical_header(h)))
}
