//! Time ranges
//!
//! Parsing of time-picker endpoints and their resolution to UTC instants.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use timebound::range::{resolve, TimeRangeSpec};
//!
//! let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
//! let spec = TimeRangeSpec::parse("now-1h", "now", "UTC").unwrap();
//! let range = resolve(&spec, now).unwrap();
//!
//! assert_eq!(range.to, now);
//! assert_eq!(range.duration().num_minutes(), 60);
//! ```

mod error;
mod resolver;
mod spec;

pub use error::{ParseError, RangeResult};
pub use resolver::{parse_absolute, resolve, resolve_endpoint, ResolvedRange, Zone};
pub use spec::{RangeEndpoint, TimeRangeSpec, RELATIVE_UNITS};
