//! Calendar reconstruction for source pages that abbreviate dates.
//!
//! Chart labels carry day + month only ("29 Dec"); the year is inferred from
//! an optional range-start date and a monotonic rollover rule. The fuel page
//! carries a full human timestamp ("09 Jan 2026, 08:29 PM") which parses to
//! a UTC instant or nothing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SOURCE_TIMESTAMP_RE: Regex =
        Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3})\s+(\d{4}),\s+(\d{1,2}):(\d{2})\s+(AM|PM)$")
            .unwrap();
}

pub fn month_number(abbrev: &str) -> Option<u32> {
    match abbrev {
        "Jan" => Some(1),
        "Feb" => Some(2),
        "Mar" => Some(3),
        "Apr" => Some(4),
        "May" => Some(5),
        "Jun" => Some(6),
        "Jul" => Some(7),
        "Aug" => Some(8),
        "Sep" => Some(9),
        "Oct" => Some(10),
        "Nov" => Some(11),
        "Dec" => Some(12),
        _ => None,
    }
}

/// Resolve an ordered, chronologically increasing sequence of "DD Mon"
/// labels to full dates. The running year starts from `start` (or the
/// current year) and increments whenever the month goes backwards, i.e. the
/// series wrapped from December into January. Unrecognized labels yield
/// `None` at their index so callers can exclude them without shifting the
/// alignment against sibling value series.
pub fn label_dates(labels: &[String], start: Option<NaiveDate>) -> Vec<Option<NaiveDate>> {
    if labels.is_empty() {
        return Vec::new();
    }

    let mut year = start
        .map(|d| d.year())
        .unwrap_or_else(|| Utc::now().year());
    let mut prev_month = start.map(|d| d.month()).unwrap_or_else(|| {
        labels[0]
            .split_whitespace()
            .nth(1)
            .and_then(month_number)
            .unwrap_or(1)
    });

    labels
        .iter()
        .map(|label| {
            let mut parts = label.split_whitespace();
            let day = parts.next().and_then(|d| d.parse::<u32>().ok());
            let month = parts.next().and_then(month_number);
            let (Some(day), Some(month)) = (day, month) else {
                return None;
            };

            if month < prev_month {
                year += 1;
            }
            prev_month = month;

            NaiveDate::from_ymd_opt(year, month, day)
        })
        .collect()
}

/// Parse a source-reported "DD Mon YYYY, HH:MM AM/PM" stamp into a UTC
/// instant. The stamp is advisory provenance only, so any deviation from
/// that shape yields `None` and callers fall back to the current instant.
pub fn parse_source_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let caps = SOURCE_TIMESTAMP_RE.captures(text.trim())?;

    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    let mut hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;

    match &caps[6] {
        "PM" if hour < 12 => hour += 12,
        "AM" if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, 0)
        .map(|dt| dt.and_utc())
}

pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_label_dates_with_known_start() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        let dates = label_dates(&labels(&["29 Dec", "02 Jan", "05 Jan"]), Some(start));
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 12, 29),
                NaiveDate::from_ymd_opt(2026, 1, 2),
                NaiveDate::from_ymd_opt(2026, 1, 5),
            ]
        );
    }

    #[test]
    fn test_label_dates_without_start_rolls_over_once() {
        let base = Utc::now().year();
        let dates = label_dates(&labels(&["29 Dec", "02 Jan", "05 Jan"]), None);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(base, 12, 29),
                NaiveDate::from_ymd_opt(base + 1, 1, 2),
                NaiveDate::from_ymd_opt(base + 1, 1, 5),
            ]
        );
    }

    #[test]
    fn test_label_dates_bad_label_excluded_in_place() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let dates = label_dates(&labels(&["02 Jan", "xx Foo", "05 Jan"]), Some(start));
        assert_eq!(dates.len(), 3);
        assert!(dates[1].is_none());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2026, 1, 5));
    }

    #[test]
    fn test_parse_source_timestamp_pm() {
        assert_eq!(
            parse_source_timestamp("09 Jan 2026, 08:29 PM"),
            Some(
                NaiveDate::from_ymd_opt(2026, 1, 9)
                    .unwrap()
                    .and_hms_opt(20, 29, 0)
                    .unwrap()
                    .and_utc()
            )
        );
    }

    #[test]
    fn test_parse_source_timestamp_midnight() {
        assert_eq!(
            parse_source_timestamp("09 Jan 2026, 12:15 AM"),
            Some(
                NaiveDate::from_ymd_opt(2026, 1, 9)
                    .unwrap()
                    .and_hms_opt(0, 15, 0)
                    .unwrap()
                    .and_utc()
            )
        );
    }

    #[test]
    fn test_parse_source_timestamp_noon_unchanged() {
        let parsed = parse_source_timestamp("01 Feb 2026, 12:05 PM").unwrap();
        assert_eq!(parsed.format("%H:%M").to_string(), "12:05");
    }

    #[test]
    fn test_parse_source_timestamp_rejects_other_shapes() {
        assert_eq!(parse_source_timestamp("2026-01-09 20:29"), None);
        assert_eq!(parse_source_timestamp(""), None);
    }
}
