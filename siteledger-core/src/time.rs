//! Calendar-day utilities: due-date parsing and timezone-aware "today".
//!
//! Every date comparison in the engine happens on `NaiveDate`, so time-of-day
//! is stripped here, once, at parse time.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::ParseError;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a due date as the accounting system sends it.
///
/// Accepts plain dates, RFC 3339 timestamps and naive timestamps; timestamps
/// keep the calendar date as written (their own offset), the time is dropped.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let s = raw.trim();

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ndt.date());
        }
    }

    Err(ParseError::InvalidDate(raw.to_string()))
}

/// Today's calendar date in an IANA timezone like "America/Chicago".
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(date_in(Utc::now(), tz))
}

/// Calendar date of a UTC instant as seen from `tz`.
pub fn date_in(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_and_us_dates() {
        assert_eq!(parse_calendar_date("2026-02-20").unwrap(), ymd(2026, 2, 20));
        assert_eq!(parse_calendar_date("02/20/2026").unwrap(), ymd(2026, 2, 20));
    }

    #[test]
    fn test_parse_strips_time_of_day() {
        assert_eq!(
            parse_calendar_date("2026-02-20T23:59:00-06:00").unwrap(),
            ymd(2026, 2, 20)
        );
        assert_eq!(
            parse_calendar_date("2026-02-20 08:15:00").unwrap(),
            ymd(2026, 2, 20)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_calendar_date("soon").is_err());
        assert!(parse_calendar_date("2026-13-40").is_err());
    }

    #[test]
    fn test_date_in_chicago() {
        // 03:00 UTC on Feb 21 is still Feb 20 in Chicago (UTC-6)
        let instant = Utc.with_ymd_and_hms(2026, 2, 21, 3, 0, 0).unwrap();
        assert_eq!(date_in(instant, chrono_tz::America::Chicago), ymd(2026, 2, 20));
    }

    #[test]
    fn test_today_in_rejects_bad_tz() {
        assert!(today_in("Mars/Olympus").is_err());
        assert!(today_in("America/Chicago").is_ok());
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(ymd(2026, 2, 20), ymd(2026, 2, 27)), 7);
        assert_eq!(days_between(ymd(2026, 2, 20), ymd(2026, 2, 19)), -1);
    }
}
