//! Composite-field extraction: the source's driver column packs
//! "<personnel nr> - <name>" into one cell.

/// Leading digit run of a composite field, or `None` when the text does not
/// start with one. Leading whitespace is tolerated.
pub fn employee_id(text: &str) -> Option<String> {
    let t = text.trim_start();
    let digits: String = t.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Remainder of a composite field with the "<digits> - " prefix stripped,
/// passed through `safe_display`.
pub fn display_name(text: &str, unknown_label: &str) -> String {
    let t = text.trim();
    let rest = match strip_id_prefix(t) {
        Some(r) => r,
        None => t,
    };
    safe_display(Some(rest), unknown_label)
}

fn strip_id_prefix(t: &str) -> Option<&str> {
    let after_digits = t.trim_start().trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == t.trim_start().len() {
        return None; // no leading digits
    }
    let rest = after_digits.trim_start();
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    Some(rest.trim_start())
}

/// Placeholder-safe display transform: `None`, empty and placeholder-like
/// text ("nan", "none", "<na>") all become the unknown label. Never panics.
pub fn safe_display(text: Option<&str>, unknown_label: &str) -> String {
    let t = text.unwrap_or("").trim();
    if t.is_empty() {
        return unknown_label.to_string();
    }
    match t.to_lowercase().as_str() {
        "nan" | "none" | "<na>" => unknown_label.to_string(),
        _ => t.to_string(),
    }
}

/// Digit characters of a free-text lookup query, concatenated.
/// "bv. 41092" and " 41-092 " both normalize to "41092".
pub fn digits_only(query: &str) -> String {
    query.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNKNOWN: &str = "onbekend";

    #[test]
    fn id_is_leading_digit_run() {
        assert_eq!(employee_id("41092 - Jan Peeters"), Some("41092".into()));
        assert_eq!(employee_id("  7 - X"), Some("7".into()));
        assert_eq!(employee_id("41092"), Some("41092".into()));
    }

    #[test]
    fn no_leading_digits_means_no_id() {
        assert_eq!(employee_id("Jan Peeters"), None);
        assert_eq!(employee_id(""), None);
        assert_eq!(employee_id("nr 41092"), None);
    }

    #[test]
    fn display_name_strips_separator() {
        assert_eq!(display_name("41092 - Jan Peeters", UNKNOWN), "Jan Peeters");
        assert_eq!(display_name("41092- Jan Peeters", UNKNOWN), "Jan Peeters");
        assert_eq!(display_name("41092 -Jan Peeters", UNKNOWN), "Jan Peeters");
    }

    #[test]
    fn display_name_without_id_passes_through() {
        assert_eq!(display_name("Jan Peeters", UNKNOWN), "Jan Peeters");
    }

    #[test]
    fn placeholders_become_unknown() {
        assert_eq!(safe_display(None, UNKNOWN), UNKNOWN);
        assert_eq!(safe_display(Some(""), UNKNOWN), UNKNOWN);
        assert_eq!(safe_display(Some("  "), UNKNOWN), UNKNOWN);
        assert_eq!(safe_display(Some("nan"), UNKNOWN), UNKNOWN);
        assert_eq!(safe_display(Some("NaN"), UNKNOWN), UNKNOWN);
        assert_eq!(safe_display(Some("None"), UNKNOWN), UNKNOWN);
        assert_eq!(safe_display(Some("<NA>"), UNKNOWN), UNKNOWN);
        assert_eq!(safe_display(Some("Jan"), UNKNOWN), "Jan");
    }

    #[test]
    fn id_only_cell_displays_as_unknown() {
        // "41092" carries no name portion after the prefix strip
        assert_eq!(display_name("41092", UNKNOWN), UNKNOWN);
        assert_eq!(display_name("41092 - ", UNKNOWN), UNKNOWN);
    }

    #[test]
    fn query_normalization_keeps_digits() {
        assert_eq!(digits_only("bv. 41092"), "41092");
        assert_eq!(digits_only(" 41-092 "), "41092");
        assert_eq!(digits_only("geen"), "");
    }
}
