//! Timestamp decoding and calendar arithmetic.
//!
//! Every instant the engine compares is a `DateTime<Utc>`. Calendar
//! questions (which day, which week, which month) are answered in the time
//! zone of a caller-supplied reference and converted back to UTC before any
//! comparison happens.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::event::EventError;

/// Seconds between the Chromium epoch (1601-01-01) and the Unix epoch.
const WEBKIT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Naive format used by history dumps and cached histories.
const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decodes a raw visit timestamp from any of the recognized encodings.
///
/// Recognized, in order:
/// - an integer: Chromium microseconds since 1601-01-01 UTC
/// - `YYYY-MM-DD HH:MM:SS`, interpreted as UTC
/// - RFC 3339
///
/// A Chromium value of zero or below marks a row the browser never stamped and
/// is rejected.
pub fn decode_raw_timestamp(raw: &str) -> Result<DateTime<Utc>, EventError> {
    let trimmed = raw.trim();
    let invalid = || EventError::InvalidTimestamp {
        raw: raw.to_string(),
    };

    if let Ok(micros) = trimmed.parse::<i64>() {
        return webkit_to_utc(micros).ok_or_else(invalid);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, NAIVE_FORMAT) {
        return Ok(naive.and_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    Err(invalid())
}

fn webkit_to_utc(micros: i64) -> Option<DateTime<Utc>> {
    if micros <= 0 {
        return None;
    }
    let unix_micros = micros.checked_sub(WEBKIT_EPOCH_OFFSET_SECS.checked_mul(1_000_000)?)?;
    DateTime::from_timestamp_micros(unix_micros)
}

/// Encodes an instant as Chromium microseconds, the `History` database format.
pub const fn to_webkit_micros(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_micros() + WEBKIT_EPOCH_OFFSET_SECS * 1_000_000
}

/// Formats an instant as `YYYY-MM-DD HH:MM:SS` in the given time zone.
pub fn format_local<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format(NAIVE_FORMAT).to_string()
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
pub fn local_midnight_to_utc<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight: the day starts at 1am
            date.and_hms_opt(1, 0, 0)
                .and_then(|one_am| tz.from_local_datetime(&one_am).earliest())
                .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// Last representable instant of a local date, as UTC.
pub fn local_end_of_day_to_utc<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let next = date.succ_opt().unwrap_or(date);
    local_midnight_to_utc(tz, next) - Duration::microseconds(1)
}

/// First day of the week containing `date`.
///
/// Subtracts `(weekday + (start_on_monday ? 7 : 1)) % 7` days, with Monday
/// as weekday 0.
pub fn week_start(date: NaiveDate, start_on_monday: bool) -> NaiveDate {
    let weekday = i64::from(date.weekday().num_days_from_monday());
    let shift = if start_on_monday { 7 } else { 1 };
    date - Duration::days((weekday + shift) % 7)
}

/// First day of the month `months_back` months before the month of `date`.
pub fn month_start(date: NaiveDate, months_back: u32) -> Option<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) - i64::from(months_back);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month0 = u32::try_from(index.rem_euclid(12)).ok()?;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// Last day of the month that `first_of_month` begins.
pub fn month_end(first_of_month: NaiveDate) -> NaiveDate {
    let (year, month) = if first_of_month.month() == 12 {
        (first_of_month.year() + 1, 1)
    } else {
        (first_of_month.year(), first_of_month.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|day| day.pred_opt())
        .unwrap_or(first_of_month)
}

/// Number of whole months between two dates' months.
pub fn months_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (i64::from(later.year()) - i64::from(earlier.year())) * 12
        + (i64::from(later.month()) - i64::from(earlier.month()))
}
