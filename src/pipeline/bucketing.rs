//! Date coercion and time/age bucketing helpers.
//!
//! The warehouse stores dates as text; parsing is deliberately lenient and
//! a value that fails every format becomes "missing" rather than an error,
//! matching the coerce-don't-raise policy of the preparation pipeline.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Formats tried in order by [`parse_date`]. `%Y-%m-%d` is what the gold
/// views actually store; the rest cover export artifacts seen in the wild.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Coerce a text cell to a calendar date. Returns `None` for anything that
/// fails every known format.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Truncate a date to the first calendar day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 of an already-valid (year, month) always exists.
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Age in fractional years between January 1 of `reference_year` and the
/// birthdate. Negative for birthdates after the reference date; bucketing
/// discards those as out of range.
pub fn age_in_years(birthdate: NaiveDate, reference_year: i32) -> Option<f64> {
    let reference = NaiveDate::from_ymd_opt(reference_year, 1, 1)?;
    Some((reference - birthdate).num_days() as f64 / 365.25)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_date("2024-03-09"), Some(d(2024, 3, 9)));
    }

    #[test]
    fn parses_datetime_variants() {
        assert_eq!(parse_date("2024-03-09 13:45:00"), Some(d(2024, 3, 9)));
        assert_eq!(parse_date("2024-03-09T13:45:00"), Some(d(2024, 3, 9)));
    }

    #[test]
    fn parses_slash_formats() {
        assert_eq!(parse_date("2024/03/09"), Some(d(2024, 3, 9)));
        assert_eq!(parse_date("03/09/2024"), Some(d(2024, 3, 9)));
    }

    #[test]
    fn garbage_becomes_missing_not_error() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn month_start_truncates() {
        assert_eq!(month_start(d(2024, 3, 9)), d(2024, 3, 1));
        assert_eq!(month_start(d(2024, 12, 31)), d(2024, 12, 1));
        assert_eq!(month_start(d(2024, 1, 1)), d(2024, 1, 1));
    }

    #[test]
    fn age_is_fractional_years() {
        // Born 2000-01-01, referenced against 2025-01-01: ~25 years.
        let age = age_in_years(d(2000, 1, 1), 2025).unwrap();
        assert!((age - 25.0).abs() < 0.05, "age was {age}");
    }

    #[test]
    fn age_negative_for_future_birthdate() {
        let age = age_in_years(d(2030, 6, 1), 2025).unwrap();
        assert!(age < 0.0);
    }
}
