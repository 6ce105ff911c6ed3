//! Trailing date window.
//!
//! Comparisons are by calendar day: with a 7-day window and a reference time of
//! 2024-01-08 15:00, anything dated 2024-01-01 (at any time of day) is kept and
//! anything dated 2023-12-31 or 2024-01-09 is not. The reference time is always
//! passed in.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};

use crate::domain::{DateWindow, Record};

/// Parse a date value with a chrono format that may or may not include a time.
pub fn parse_day(value: &str, format: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, format).ok()
}

/// First day inside a `window_days` window ending on the reference day.
pub fn cutoff_day(reference_time: DateTime<Utc>, window_days: u32) -> Option<NaiveDate> {
    reference_time
        .date_naive()
        .checked_sub_days(Days::new(u64::from(window_days)))
}

/// Whether `record[date_field]` falls between the window's first day and the
/// reference day, both inclusive.
///
/// A missing field or a value that does not parse with `date_format` excludes
/// the record.
pub fn within_window(
    record: &Record,
    date_field: &str,
    date_format: &str,
    window_days: u32,
    reference_time: DateTime<Utc>,
) -> bool {
    let Some(day) = record.get(date_field).and_then(|v| parse_day(v, date_format)) else {
        return false;
    };
    if day > reference_time.date_naive() {
        return false;
    }
    match cutoff_day(reference_time, window_days) {
        Some(cutoff) => day >= cutoff,
        None => true,
    }
}

/// Keep the records inside `window`; returns the kept records and the number dropped.
pub fn apply_window(
    records: Vec<Record>,
    window: &DateWindow,
    reference_time: DateTime<Utc>,
) -> (Vec<Record>, usize) {
    let before = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| within_window(r, &window.field, &window.format, window.days, reference_time))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DATETIME: &str = "%Y-%m-%d %H:%M:%S";

    fn record(seen: &str) -> Record {
        Record::new(vec![
            ("Firstseen".to_string(), seen.to_string()),
            ("DstIP".to_string(), "1.2.3.4".to_string()),
        ])
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, 15, 30, 0).unwrap()
    }

    #[test]
    fn exactly_n_days_back_is_included() {
        // Start of the boundary day, well before the reference time of day.
        assert!(within_window(&record("2024-01-01 00:00:00"), "Firstseen", DATETIME, 7, reference()));
    }

    #[test]
    fn n_plus_one_days_back_is_excluded() {
        assert!(!within_window(&record("2023-12-31 23:59:59"), "Firstseen", DATETIME, 7, reference()));
    }

    #[test]
    fn reference_day_is_included() {
        assert!(within_window(&record("2024-01-08 23:00:00"), "Firstseen", DATETIME, 7, reference()));
    }

    #[test]
    fn days_after_the_reference_are_excluded() {
        assert!(!within_window(&record("2024-01-09 00:00:00"), "Firstseen", DATETIME, 7, reference()));
        assert!(!within_window(&record("2024-06-01 00:00:00"), "Firstseen", DATETIME, 7, reference()));
    }

    #[test]
    fn unparseable_or_missing_date_is_excluded() {
        assert!(!within_window(&record("yesterday"), "Firstseen", DATETIME, 7, reference()));
        assert!(!within_window(&record("2024-01-05"), "Firstseen", DATETIME, 7, reference()));
        assert!(!within_window(&record("2024-01-05 00:00:00"), "dateadded", DATETIME, 7, reference()));
    }

    #[test]
    fn date_only_format() {
        let kev = Record::new(vec![("dateAdded".to_string(), "2024-01-02".to_string())]);
        assert!(within_window(&kev, "dateAdded", "%Y-%m-%d", 7, reference()));
        assert!(!within_window(&kev, "dateAdded", "%Y-%m-%d", 5, reference()));
    }

    #[test]
    fn filter_does_not_touch_kept_records() {
        let window = DateWindow {
            field: "Firstseen".to_string(),
            format: DATETIME.to_string(),
            days: 7,
        };
        let input = vec![record("2024-01-07 10:00:00"), record("bad"), record("2023-01-01 00:00:00")];
        let expected = input[0].clone();

        let (kept, dropped) = apply_window(input, &window, reference());
        assert_eq!(kept, vec![expected]);
        assert_eq!(dropped, 2);
    }
}
