//! Time macros
//!
//! Recognition and substitution of the four time placeholders:
//!
//! - **Token**: the `$__timeFilter`, `$__timeField`, `$__timeFrom`, `$__timeTo` literals
//! - **Scanner**: whole-word token recognition over opaque query text
//! - **Literal**: timestamp literal styles and epoch unit scaling
//! - **Engine**: substitution and diagnostics
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use timebound::macros::substitute;
//! use timebound::range::ResolvedRange;
//! use timebound::schema::{ColumnClassification, TimeUnit};
//!
//! let range = ResolvedRange::new(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
//! );
//! let result = substitute(
//!     "SELECT count(*) FROM logs WHERE $__timeFilter",
//!     Some("ts"),
//!     ColumnClassification::Epoch { unit: Some(TimeUnit::Seconds) },
//!     range,
//! );
//!
//! assert_eq!(
//!     result.query,
//!     "SELECT count(*) FROM logs WHERE ts >= 1704067200 AND ts <= 1704153600"
//! );
//! ```

mod engine;
mod literal;
mod scanner;
mod token;

pub use engine::{
    check_for_macros, substitute, Diagnostic, EngineOptions, MacroEngine, Severity,
    SubstitutionResult,
};
pub use literal::{scale_to_unit, TimestampStyle, ALWAYS_TRUE, NULL_LITERAL};
pub use scanner::{contains_macros, MacroScanner, Segment};
pub use token::MacroToken;
