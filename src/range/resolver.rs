//! Time Range Resolver
//!
//! Turns a `TimeRangeSpec` into two concrete UTC instants.
//!
//! - `now` is supplied by the caller, never read from the clock here
//! - relative offsets are subtracted in UTC; months and years use calendar
//!   arithmetic (day clamped to the end of the target month), all other
//!   units are fixed durations, and DST transitions are ignored
//! - the timezone only affects absolute literals without an explicit offset
//! - an inverted range is swapped and flagged with `swapped`

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, Months, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use serde::Serialize;

use super::error::{ParseError, RangeResult};
use super::spec::{RangeEndpoint, TimeRangeSpec};

/// Naive date/time layouts accepted for absolute literals, tried in order
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S",
];

/// Date-only layouts, read as midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Length of an ISO 8601 basic date (`20240131`)
const BASIC_DATE_LEN: usize = 8;

/// Layouts with an explicit offset that RFC 3339 parsing does not cover
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// A resolved range, both ends in UTC, `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// The requested endpoints were chronologically inverted and have been swapped
    pub swapped: bool,
}

impl ResolvedRange {
    /// Create a range, swapping the endpoints if they are inverted
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        if from > to {
            Self {
                from: to,
                to: from,
                swapped: true,
            }
        } else {
            Self {
                from,
                to,
                swapped: false,
            }
        }
    }

    /// Start as Unix milliseconds
    pub fn from_millis(&self) -> i64 {
        self.from.timestamp_millis()
    }

    /// End as Unix milliseconds
    pub fn to_millis(&self) -> i64 {
        self.to.timestamp_millis()
    }

    /// Length of the range
    pub fn duration(&self) -> Duration {
        self.to - self.from
    }
}

impl std::fmt::Display for ResolvedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {}]", self.from.to_rfc3339(), self.to.to_rfc3339())
    }
}

/// Timezone used to interpret absolute literals without an offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Utc,
    Fixed(FixedOffset),
    Named(chrono_tz::Tz),
}

impl Zone {
    /// Parse an IANA name, `UTC`/`Z`/empty, or a `+HH:MM` offset
    pub fn parse(name: &str) -> RangeResult<Self> {
        let name = name.trim();

        if name.is_empty() || name.eq_ignore_ascii_case("utc") || name.eq_ignore_ascii_case("z") {
            return Ok(Zone::Utc);
        }

        if name.starts_with('+') || name.starts_with('-') {
            return parse_fixed_offset(name)
                .map(Zone::Fixed)
                .ok_or_else(|| ParseError::InvalidTimezone(name.to_string()));
        }

        name.parse::<chrono_tz::Tz>()
            .map(Zone::Named)
            .map_err(|_| ParseError::InvalidTimezone(name.to_string()))
    }

    /// Interpret a wall-clock time in this zone
    ///
    /// In a DST overlap the earlier instant wins; a time inside a DST gap
    /// does not exist and is rejected.
    fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Utc => Some(naive.and_utc()),
            Zone::Fixed(offset) => earliest_utc(offset.from_local_datetime(naive)),
            Zone::Named(tz) => earliest_utc(tz.from_local_datetime(naive)),
        }
    }
}

fn earliest_utc<Tz: TimeZone>(local: LocalResult<DateTime<Tz>>) -> Option<DateTime<Utc>> {
    local.earliest().map(|dt| dt.with_timezone(&Utc))
}

/// Parse `+05:30`, `-0800` or `+02`
fn parse_fixed_offset(text: &str) -> Option<FixedOffset> {
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text[1..].chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = if digits.len() <= 2 {
        (digits.parse::<i32>().ok()?, 0)
    } else {
        let split = digits.len() - 2;
        (
            digits[..split].parse::<i32>().ok()?,
            digits[split..].parse::<i32>().ok()?,
        )
    };

    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Resolve both endpoints of a range spec against `now`
pub fn resolve(spec: &TimeRangeSpec, now: DateTime<Utc>) -> RangeResult<ResolvedRange> {
    let zone = Zone::parse(&spec.timezone)?;

    let from = resolve_endpoint(&spec.from, now, &zone)?;
    let to = resolve_endpoint(&spec.to, now, &zone)?;

    Ok(ResolvedRange::new(from, to))
}

/// Resolve a single endpoint
pub fn resolve_endpoint(
    endpoint: &RangeEndpoint,
    now: DateTime<Utc>,
    zone: &Zone,
) -> RangeResult<DateTime<Utc>> {
    match endpoint {
        RangeEndpoint::Now => Ok(now),
        RangeEndpoint::RelativeOffset { amount, unit } => subtract_offset(now, *amount, *unit),
        RangeEndpoint::Absolute(literal) => parse_absolute(literal, zone),
    }
}

/// Compute `now - amount unit`
fn subtract_offset(now: DateTime<Utc>, amount: u32, unit: char) -> RangeResult<DateTime<Utc>> {
    let span = i64::from(amount);

    let result = match unit {
        'm' => Duration::try_minutes(span).and_then(|d| now.checked_sub_signed(d)),
        'h' => Duration::try_hours(span).and_then(|d| now.checked_sub_signed(d)),
        'd' => Duration::try_days(span).and_then(|d| now.checked_sub_signed(d)),
        'w' => Duration::try_weeks(span).and_then(|d| now.checked_sub_signed(d)),
        'M' => now.checked_sub_months(Months::new(amount)),
        'y' => amount
            .checked_mul(12)
            .and_then(|months| now.checked_sub_months(Months::new(months))),
        other => return Err(ParseError::InvalidUnit(other)),
    };

    result.ok_or_else(|| ParseError::Overflow(format!("now-{}{}", amount, unit)))
}

/// Parse an absolute date/time literal
///
/// Accepts epoch milliseconds, RFC 3339, SQL-style date/time literals
/// (optionally quoted and prefixed with `DATE`/`TIMESTAMP`), plain dates and
/// ISO 8601 basic dates. Eight digits are always a basic date, never millis.
pub fn parse_absolute(literal: &str, zone: &Zone) -> RangeResult<DateTime<Utc>> {
    let text = strip_sql_literal(literal);
    if text.is_empty() {
        return Err(ParseError::InvalidAbsolute(literal.to_string()));
    }

    if text.len() != BASIC_DATE_LEN && text.chars().all(|c| c.is_ascii_digit()) {
        let millis = text
            .parse::<i64>()
            .map_err(|_| ParseError::Overflow(literal.to_string()))?;
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| ParseError::Overflow(literal.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ParseError::InvalidAbsolute(literal.to_string()))?;

    zone.localize(&naive).ok_or_else(|| {
        ParseError::InvalidAbsolute(format!("{} does not exist in the selected timezone", literal))
    })
}

/// Strip `TIMESTAMP '...'` / `DATE '...'` / `'...'` wrappers
fn strip_sql_literal(literal: &str) -> &str {
    let mut text = literal.trim();

    for keyword in ["TIMESTAMP", "DATETIME", "DATE"] {
        if text.len() > keyword.len()
            && text.is_char_boundary(keyword.len())
            && text[..keyword.len()].eq_ignore_ascii_case(keyword)
        {
            let rest = text[keyword.len()..].trim_start();
            if rest.starts_with('\'') {
                text = rest;
                break;
            }
        }
    }

    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        text = &text[1..text.len() - 1];
    }

    text.trim()
}
