//! Per-value judgements feeding schema inference.
//!
//! Both questions are total: anything that cannot be interpreted simply
//! answers `false`.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::RegexSet;

use super::value::Value;

/// Shapes accepted as dates without further parsing.
static DATE_SHAPES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^\d{4}-\d{2}-\d{2}$",
        r"^\d{2}/\d{2}/\d{4}$",
        r"^\d{2}-\d{2}-\d{4}$",
        r"^\w{3}\s\d{1,2},?\s\d{4}$",
    ])
    .expect("date shape patterns are valid")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
];

/// Already numeric, or text that converts to a number.
pub fn is_number_like(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        other => other.to_number().is_some(),
    }
}

/// A valid date-time cell, or text that has a date shape or parses as a date.
pub fn is_date_like(value: &Value) -> bool {
    match value {
        Value::DateTime(_) => true,
        Value::Text(s) => DATE_SHAPES.is_match(s) || parse_datetime(s).is_some(),
        _ => false,
    }
}

/// Generic date parsing over the common textual layouts.
///
/// Bare numbers are rejected so that numeric columns never read as years.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() || s.parse::<f64>().is_ok() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn numbers_and_numeric_text_are_number_like() {
        assert!(is_number_like(&Value::Number(3.0)));
        assert!(is_number_like(&text("3.25")));
        assert!(is_number_like(&text(" 7 ")));
        assert!(!is_number_like(&text("seven")));
        assert!(!is_number_like(&text("2024-01-01")));
        assert!(!is_number_like(&Value::Null));
    }

    #[test]
    fn explicit_shapes_are_date_like() {
        assert!(is_date_like(&text("2024-01-15")));
        assert!(is_date_like(&text("01/15/2024")));
        assert!(is_date_like(&text("01-15-2024")));
        assert!(is_date_like(&text("Jan 5, 2024")));
        assert!(is_date_like(&text("Jan 15 2024")));
    }

    #[test]
    fn shape_match_does_not_require_a_real_calendar_day() {
        assert!(is_date_like(&text("99/99/9999")));
        assert_eq!(parse_datetime("99/99/9999"), None);
    }

    #[test]
    fn generic_parsing_accepts_timestamps() {
        assert!(is_date_like(&text("2024-01-15T10:30:00Z")));
        assert!(is_date_like(&text("2024-01-15 10:30")));
        assert!(is_date_like(&text("2024/01/15")));
        assert!(is_date_like(&text("15 Jan 2024")));
    }

    #[test]
    fn non_dates_are_rejected() {
        assert!(!is_date_like(&text("hello")));
        assert!(!is_date_like(&text("100")));
        assert!(!is_date_like(&Value::Number(20240115.0)));
        assert!(!is_date_like(&Value::Null));
    }

    #[test]
    fn parse_datetime_yields_midnight_for_plain_dates() {
        let dt = parse_datetime("Mar 3, 2023").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2023, 3, 3).unwrap());
        assert_eq!(dt.time(), NaiveTime::MIN);
    }
}
