//! Date and duration flags.
//!
//! Accepts, in order: RFC 3339 (`2025-01-15T09:00:00Z`), a local datetime
//! (`2025-01-15T09:00:00`), a local date (`2025-01-15`), a relative offset
//! (`3 days ago`, `in 2 hours`) and finally English phrases such as `today`,
//! `tomorrow` or `next friday`. Local forms are read in the reference's
//! offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use chrono_english::{Dialect, parse_date_string};

use crate::error::{Error, Result};

const WEEKDAYS: [&str; 14] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "mon", "tue",
    "wed", "thu", "fri", "sat", "sun",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Future,
    Past,
}

/// Parses a date, resolving ambiguous phrases towards the future.
///
/// # Errors
///
/// Returns [`Error::Parse`] for empty or unrecognised input.
pub fn parse(input: &str, reference: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>> {
    parse_directed(input, reference, Direction::Future)
}

/// Parses a date, resolving a bare weekday towards the past
/// (`friday` means the previous Friday).
///
/// # Errors
///
/// Returns [`Error::Parse`] for empty or unrecognised input.
pub fn parse_with_past(
    input: &str,
    reference: DateTime<FixedOffset>,
) -> Result<DateTime<FixedOffset>> {
    parse_directed(input, reference, Direction::Past)
}

fn parse_directed(
    input: &str,
    reference: DateTime<FixedOffset>,
    direction: Direction,
) -> Result<DateTime<FixedOffset>> {
    let s = input.trim();
    if s.is_empty() {
        return Err(Error::parse(input, "empty date string"));
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t);
    }
    let offset = *reference.offset();
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(at_offset(offset, t));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(at_offset(offset, d.and_time(NaiveTime::MIN)));
    }
    if let Some(t) = relative(s, reference) {
        return Ok(t);
    }

    let lowered = s.to_ascii_lowercase();
    let phrase = if direction == Direction::Past && WEEKDAYS.contains(&lowered.as_str()) {
        format!("last {lowered}")
    } else {
        lowered
    };
    parse_date_string(&phrase, reference, Dialect::Us)
        .map_err(|e| Error::parse(input, e.to_string()))
}

/// `<duration> ago` or `in <duration>`.
fn relative(s: &str, reference: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let lowered = s.to_ascii_lowercase();
    if let Some(amount) = lowered.strip_suffix(" ago") {
        let d = Duration::from_std(parse_duration(amount).ok()?).ok()?;
        return reference.checked_sub_signed(d);
    }
    if let Some(amount) = lowered.strip_prefix("in ") {
        let d = Duration::from_std(parse_duration(amount).ok()?).ok()?;
        return reference.checked_add_signed(d);
    }
    None
}

fn at_offset(offset: FixedOffset, local: NaiveDateTime) -> DateTime<FixedOffset> {
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// Midnight at the start of `t`'s day, same offset.
#[must_use]
pub fn start_of_day(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    at_offset(*t.offset(), t.date_naive().and_time(NaiveTime::MIN))
}

/// 23:59:59.999999999 on `t`'s day, same offset.
#[must_use]
pub fn end_of_day(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    at_offset(*t.offset(), t.date_naive().and_time(last))
}

/// `t` moved by whole days.
#[must_use]
pub fn add_days(t: DateTime<FixedOffset>, days: i64) -> DateTime<FixedOffset> {
    t + Duration::days(days)
}

/// RFC 3339 with second precision, `Z` for UTC.
#[must_use]
pub fn format_iso8601(t: DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses `30m`, `1h`, `1h30m`, `90 min`.
///
/// # Errors
///
/// Returns [`Error::Parse`] for empty or unrecognised input.
pub fn parse_duration(input: &str) -> Result<std::time::Duration> {
    let compact: String = input.split_whitespace().collect();
    if compact.is_empty() {
        return Err(Error::parse(input, "empty duration"));
    }
    humantime::parse_duration(&compact).map_err(|e| Error::parse(input, e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike, Weekday};

    fn nzdt() -> FixedOffset {
        FixedOffset::east_opt(13 * 3600).unwrap()
    }

    /// Wednesday 2025-01-15 10:00 +13:00.
    fn reference() -> DateTime<FixedOffset> {
        nzdt().with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_iso_date_is_local_midnight() {
        let got = parse("2025-01-20", reference()).unwrap();
        assert_eq!(got, nzdt().with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_iso_datetime_without_zone() {
        let got = parse("2025-01-20T14:30:00", reference()).unwrap();
        assert_eq!((got.hour(), got.minute()), (14, 30));
        assert_eq!(got.offset(), &nzdt());
    }

    #[test]
    fn test_rfc3339_keeps_its_zone() {
        let got = parse("2025-01-20T14:30:00Z", reference()).unwrap();
        assert_eq!((got.hour(), got.minute()), (14, 30));
        assert_eq!(got.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_today_and_tomorrow() {
        assert_eq!(parse("today", reference()).unwrap().day(), 15);
        assert_eq!(parse("Tomorrow", reference()).unwrap().day(), 16);
        assert_eq!(parse("yesterday", reference()).unwrap().day(), 14);
    }

    #[test]
    fn test_weekday_direction() {
        let future = parse("friday", reference()).unwrap();
        assert_eq!(future.weekday(), Weekday::Fri);
        assert_eq!(future.day(), 17);

        let past = parse_with_past("friday", reference()).unwrap();
        assert_eq!(past.weekday(), Weekday::Fri);
        assert_eq!(past.day(), 10);
    }

    #[test]
    fn test_relative_offsets() {
        let got = parse_with_past("3 days ago", reference()).unwrap();
        assert_eq!(got, reference() - Duration::days(3));
        let got = parse("in 2 hours", reference()).unwrap();
        assert_eq!(got.hour(), 12);
    }

    #[test]
    fn test_rejects_empty_and_nonsense() {
        assert!(matches!(parse("", reference()), Err(Error::Parse { .. })));
        assert!(parse("   ", reference()).is_err());
        assert!(parse("the twelfth of never", reference()).is_err());
    }

    #[test]
    fn test_day_bounds() {
        let t = nzdt().with_ymd_and_hms(2025, 1, 15, 14, 30, 45).unwrap();
        let start = start_of_day(t);
        assert_eq!(start, nzdt().with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap());
        let end = end_of_day(t);
        assert_eq!((end.day(), end.hour(), end.minute(), end.second()), (15, 23, 59, 59));
        assert_eq!(end.nanosecond(), 999_999_999);
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(reference(), 5).day(), 20);
        assert_eq!(add_days(reference(), -3).day(), 12);
    }

    #[test]
    fn test_format_iso8601() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let t = utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap();
        assert_eq!(format_iso8601(t), "2025-01-15T14:30:00Z");
        assert_eq!(format_iso8601(reference()), "2025-01-15T10:00:00+13:00");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30m").unwrap().as_secs(), 1800);
        assert_eq!(parse_duration("1h").unwrap().as_secs(), 3600);
        assert_eq!(parse_duration("1h30m").unwrap().as_secs(), 5400);
        assert_eq!(parse_duration("90 min").unwrap().as_secs(), 5400);
        assert!(parse_duration("").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
