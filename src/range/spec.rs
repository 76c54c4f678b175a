//! Time range definitions
//!
//! A range as the time picker describes it: two endpoints, each either `now`,
//! an offset back from now, or an absolute date/time literal.
//!
//! # Endpoint Syntax
//!
//! ```text
//! now
//! now-5m      minutes
//! now-24h     hours
//! now-7d      days
//! now-2w      weeks
//! now-3M      months (calendar-aware)
//! now-1y      years  (calendar-aware)
//! 2024-01-31 / 2024-01-31 12:00:00 / 2024-01-31T12:00:00Z / 1706659200000
//! ```

use nom::{
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{anychar, char, multispace0},
    combinator::{all_consuming, map_res, opt},
    sequence::{pair, preceded, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

use super::error::{ParseError, RangeResult};

/// Unit characters accepted in relative offsets
pub const RELATIVE_UNITS: &[char] = &['m', 'h', 'd', 'w', 'M', 'y'];

/// One end of a time range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RangeEndpoint {
    /// The instant the range is resolved at
    Now,
    /// `amount` units before now
    RelativeOffset { amount: u32, unit: char },
    /// ISO-8601 or SQL date/time literal, or epoch milliseconds
    Absolute(String),
}

impl RangeEndpoint {
    /// Offset of `amount` units before now
    pub fn ago(amount: u32, unit: char) -> Self {
        RangeEndpoint::RelativeOffset { amount, unit }
    }

    /// Absolute literal endpoint
    pub fn absolute(literal: impl Into<String>) -> Self {
        RangeEndpoint::Absolute(literal.into())
    }

    /// Parse endpoint text as entered in the time picker
    ///
    /// Anything that does not start with `now` is kept as an absolute literal
    /// and validated when the range is resolved.
    pub fn parse(input: &str) -> RangeResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::InvalidEndpoint("empty endpoint".to_string()));
        }

        if !starts_with_now(input) {
            return Ok(RangeEndpoint::Absolute(input.to_string()));
        }

        match all_consuming(parse_now_expression)(input) {
            Ok((_, None)) => Ok(RangeEndpoint::Now),
            Ok((_, Some((amount, unit)))) => {
                if !RELATIVE_UNITS.contains(&unit) {
                    return Err(ParseError::InvalidUnit(unit));
                }
                Ok(RangeEndpoint::RelativeOffset { amount, unit })
            }
            Err(_) => Err(ParseError::InvalidEndpoint(input.to_string())),
        }
    }
}

impl std::fmt::Display for RangeEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeEndpoint::Now => write!(f, "now"),
            RangeEndpoint::RelativeOffset { amount, unit } => write!(f, "now-{}{}", amount, unit),
            RangeEndpoint::Absolute(literal) => write!(f, "{}", literal),
        }
    }
}

impl std::str::FromStr for RangeEndpoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A time range with the timezone used for absolute literals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeSpec {
    pub from: RangeEndpoint,
    pub to: RangeEndpoint,
    /// IANA name, `UTC`, or a fixed offset such as `+05:30`
    #[serde(default)]
    pub timezone: String,
}

impl TimeRangeSpec {
    /// Create a range spec
    pub fn new(from: RangeEndpoint, to: RangeEndpoint, timezone: impl Into<String>) -> Self {
        Self {
            from,
            to,
            timezone: timezone.into(),
        }
    }

    /// Range from `amount` units ago until now, in UTC
    pub fn last(amount: u32, unit: char) -> Self {
        Self::new(RangeEndpoint::ago(amount, unit), RangeEndpoint::Now, "UTC")
    }

    /// Build a spec from the picker's text fields
    pub fn parse(from: &str, to: &str, timezone: &str) -> RangeResult<Self> {
        Ok(Self::new(
            RangeEndpoint::parse(from)?,
            RangeEndpoint::parse(to)?,
            timezone,
        ))
    }
}

impl std::fmt::Display for TimeRangeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.from, self.to)?;
        if !self.timezone.is_empty() {
            write!(f, " ({})", self.timezone)?;
        }
        Ok(())
    }
}

fn starts_with_now(input: &str) -> bool {
    input
        .get(..3)
        .map(|prefix| prefix.eq_ignore_ascii_case("now"))
        .unwrap_or(false)
}

/// Parse `now` with an optional `- <amount><unit>` suffix
fn parse_now_expression(input: &str) -> IResult<&str, Option<(u32, char)>> {
    let (input, _) = tag_no_case("now")(input)?;
    let (input, _) = multispace0(input)?;
    opt(preceded(pair(char('-'), multispace0), parse_offset))(input)
}

/// Parse an offset like `5m`; the unit is validated by the caller
fn parse_offset(input: &str) -> IResult<&str, (u32, char)> {
    let (input, (amount, unit, _)) = tuple((
        map_res(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
            s.parse::<u32>()
        }),
        anychar,
        multispace0,
    ))(input)?;
    Ok((input, (amount, unit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_now() {
        assert_eq!(RangeEndpoint::parse("now").unwrap(), RangeEndpoint::Now);
        assert_eq!(RangeEndpoint::parse(" NOW ").unwrap(), RangeEndpoint::Now);
    }

    #[test]
    fn test_parse_relative() {
        assert_eq!(RangeEndpoint::parse("now-5m").unwrap(), RangeEndpoint::ago(5, 'm'));
        assert_eq!(RangeEndpoint::parse("now - 24h").unwrap(), RangeEndpoint::ago(24, 'h'));
        assert_eq!(RangeEndpoint::parse("now-25M").unwrap(), RangeEndpoint::ago(25, 'M'));
        assert_eq!(RangeEndpoint::parse("now-0m").unwrap(), RangeEndpoint::ago(0, 'm'));
    }

    #[test]
    fn test_parse_invalid_unit() {
        assert_eq!(
            RangeEndpoint::parse("now-5x").unwrap_err(),
            ParseError::InvalidUnit('x')
        );
        // Seconds are not a picker unit
        assert_eq!(
            RangeEndpoint::parse("now-30s").unwrap_err(),
            ParseError::InvalidUnit('s')
        );
    }

    #[test]
    fn test_parse_malformed_relative() {
        assert!(matches!(
            RangeEndpoint::parse("now-"),
            Err(ParseError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            RangeEndpoint::parse("now-5mm"),
            Err(ParseError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            RangeEndpoint::parse("now-99999999999d"),
            Err(ParseError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            RangeEndpoint::parse(""),
            Err(ParseError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_parse_absolute() {
        assert_eq!(
            RangeEndpoint::parse("2024-01-01").unwrap(),
            RangeEndpoint::absolute("2024-01-01")
        );
        assert_eq!(
            RangeEndpoint::parse("1704067200000").unwrap(),
            RangeEndpoint::absolute("1704067200000")
        );
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["now", "now-15m", "now-1y", "2024-01-01 10:00:00"] {
            let endpoint: RangeEndpoint = text.parse().unwrap();
            assert_eq!(endpoint.to_string(), text);
        }
    }

    #[test]
    fn test_spec_parse() {
        let spec = TimeRangeSpec::parse("now-1h", "now", "Europe/Berlin").unwrap();
        assert_eq!(spec.from, RangeEndpoint::ago(1, 'h'));
        assert_eq!(spec.to, RangeEndpoint::Now);
        assert_eq!(spec.to_string(), "now-1h to now (Europe/Berlin)");

        assert!(TimeRangeSpec::parse("now-1q", "now", "UTC").is_err());
    }

    #[test]
    fn test_spec_serde() {
        let spec = TimeRangeSpec::last(5, 'm');
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: TimeRangeSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }
}
