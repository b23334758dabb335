//! Temporal normalization: one raw cell value in, a canonical instant or
//! `None` out. Per-row failures never abort a pass.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::model::RawValue;

/// Plausible spreadsheet-serial range, inclusive. Serial 1 = 1899-12-31;
/// 60000 lands in the mid-2060s. Numbers outside this range are never
/// interpreted as dates.
pub const SERIAL_MIN: f64 = 1.0;
pub const SERIAL_MAX: f64 = 60000.0;

const DAY_FIRST: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d/%m/%y",
    "%d-%m-%y",
];

const ISO: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

const MONTH_FIRST: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y", "%m-%d-%Y"];

/// Convert one raw cell value to a canonical instant, or `None`.
///
/// Order is a correctness contract, not an optimization: native values, then
/// serial numbers, then day-first text, then ISO 8601, then month-first text.
/// Trying month-first before day-first would silently mis-parse ambiguous
/// dates (day <= 12) into the wrong month with no detectable error.
pub fn normalize(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::DateTime(dt) => Some(*dt),
        RawValue::Number(n) => from_serial(*n),
        RawValue::Text(s) => parse_text(s),
        _ => None,
    }
}

/// Interpret a number as days since the spreadsheet epoch (1899-12-30),
/// fractional part as time of day. Out-of-range values yield `None`.
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.floor() as i64;
    let secs = (serial.fract() * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(secs))
}

fn parse_text(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    for formats in [DAY_FIRST, ISO, MONTH_FIRST] {
        for fmt in formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
                return Some(dt);
            }
            if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
                return d.and_hms_opt(0, 0, 0);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.into())
    }

    #[test]
    fn native_datetime_passes_through() {
        let dt = NaiveDate::from_ymd_opt(2024, 4, 3)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(normalize(&RawValue::DateTime(dt)), Some(dt));
    }

    #[test]
    fn day_first_wins_over_month_first() {
        // 3 April 2024, not 4 March 2024
        let dt = normalize(&text("03/04/2024")).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 4, 3));
    }

    #[test]
    fn unambiguous_month_first_still_parses() {
        // Day-first cannot produce month 25, so the month-first fallback fires
        let dt = normalize(&text("12/25/2023")).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 12, 25));
    }

    #[test]
    fn iso_8601_fallback() {
        let dt = normalize(&text("2024-04-03")).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 4, 3));

        let dt = normalize(&text("2024-04-03T14:05:00")).unwrap();
        assert_eq!(dt.hour(), 14);
    }

    #[test]
    fn serial_one_is_last_day_of_1899() {
        let dt = from_serial(1.0).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1899, 12, 31));
    }

    #[test]
    fn serial_upper_bound_lands_in_the_2060s() {
        let dt = from_serial(60000.0).unwrap();
        assert!(dt.year() >= 2060 && dt.year() <= 2065, "got {}", dt.year());
    }

    #[test]
    fn serial_fraction_is_time_of_day() {
        let dt = from_serial(45292.5).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 1));
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn out_of_range_numbers_are_not_serials() {
        assert_eq!(from_serial(0.0), None);
        assert_eq!(from_serial(0.9), None);
        assert_eq!(from_serial(60001.0), None);
        assert_eq!(from_serial(-5.0), None);
        assert_eq!(normalize(&RawValue::Number(123456.0)), None);
    }

    #[test]
    fn garbage_yields_none() {
        assert_eq!(normalize(&text("")), None);
        assert_eq!(normalize(&text("n.v.t.")), None);
        assert_eq!(normalize(&text("31/31/2024")), None);
        assert_eq!(normalize(&RawValue::Empty), None);
        assert_eq!(normalize(&RawValue::Bool(true)), None);
    }
}
