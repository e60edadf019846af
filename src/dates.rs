// Calendar helpers shared by the pricing, override and inventory paths.
//
// Every stored date is a UTC calendar day. Wire inputs may carry a time of day,
// which is discarded after converting to UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse a wire date, accepting `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are truncated to their UTC calendar day.
pub fn parse_wire_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        .map_err(|_| {
            format!(
                "Invalid date '{}': expected YYYY-MM-DD or an RFC 3339 timestamp",
                value
            )
        })
}

/// Serde adapter for required wire dates
pub mod wire_date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_wire_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional wire dates
pub mod option_wire_date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|value| parse_wire_date(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Serde adapter for clearable wire dates: absent is `None`, `null` is
/// `Some(None)`. Pair with `#[serde(default)]`.
pub mod nullable_wire_date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        option_wire_date::deserialize(deserializer).map(Some)
    }
}

/// Number of nights between two calendar days (negative when reversed)
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Nights of `[check_in, check_out)`, rejecting empty, reversed and
/// over-long stays
pub fn stay_length(check_in: NaiveDate, check_out: NaiveDate, max_nights: u32) -> Result<i64, String> {
    let nights = nights_between(check_in, check_out);
    if nights <= 0 {
        return Err("checkOut must be at least one day after checkIn".to_string());
    }
    if nights > i64::from(max_nights) {
        return Err(format!("Stays are limited to {} nights", max_nights));
    }
    Ok(nights)
}

/// Whole days between `now` and midnight UTC of `check_in`, rounded up.
///
/// A booking made at any time on the day before arrival counts as one day
/// in advance; a same-day booking made after midnight counts as zero.
pub fn days_in_advance(check_in: NaiveDate, now: DateTime<Utc>) -> i64 {
    let midnight = check_in.and_time(NaiveTime::MIN).and_utc();
    let seconds = (midnight - now).num_seconds();

    // Integer division truncates toward zero, which is already the ceiling
    // for negative spans.
    let whole_days = seconds / SECONDS_PER_DAY;
    if seconds % SECONDS_PER_DAY > 0 {
        whole_days + 1
    } else {
        whole_days
    }
}

/// The calendar nights of a stay, starting at `check_in`
pub fn stay_nights(check_in: NaiveDate, nights: i64) -> impl Iterator<Item = NaiveDate> {
    (0..nights.max(0)).map(move |offset| check_in + Duration::days(offset))
}

/// Last night of a half-open stay `[check_in, check_out)`
pub fn last_night(check_out: NaiveDate) -> NaiveDate {
    check_out - Duration::days(1)
}
