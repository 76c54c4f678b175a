//! Range error types
//!
//! A range spec comes from structured UI state, so every failure here is
//! reported rather than tolerated.

use thiserror::Error;

/// Errors that can occur while parsing or resolving a time range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Relative offset unit is not one of `m h d w M y`
    #[error("Invalid relative time unit '{0}': expected one of m, h, d, w, M, y")]
    InvalidUnit(char),

    /// Endpoint text could not be parsed
    #[error("Invalid time range endpoint: {0}")]
    InvalidEndpoint(String),

    /// Absolute date/time literal could not be parsed
    #[error("Invalid absolute time: {0}")]
    InvalidAbsolute(String),

    /// Timezone name or offset is not recognized
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Arithmetic left the representable date range
    #[error("Time out of range: {0}")]
    Overflow(String),
}

/// Result type for range operations
pub type RangeResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::InvalidUnit('x');
        assert_eq!(
            err.to_string(),
            "Invalid relative time unit 'x': expected one of m, h, d, w, M, y"
        );

        let err = ParseError::InvalidTimezone("Mars/Olympus".to_string());
        assert_eq!(err.to_string(), "Invalid timezone: Mars/Olympus");
    }
}
