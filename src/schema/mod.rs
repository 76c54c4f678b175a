//! Schema metadata
//!
//! Column descriptors as delivered by the schema cache, and the classifier
//! that decides how (and whether) a column stores time.
//!
//! # Example
//!
//! ```rust
//! use timebound::schema::{classify, ColumnClassification, ColumnDescriptor, TimeUnit};
//!
//! let column = ColumnDescriptor::new("created_at", "BIGINT");
//! assert_eq!(
//!     classify(&column),
//!     ColumnClassification::Epoch { unit: Some(TimeUnit::Millis) }
//! );
//! ```

mod classifier;
mod snapshot;
mod types;

pub use classifier::{classify, infer_unit};
pub use snapshot::SchemaSnapshot;
pub use types::{ColumnClassification, ColumnDescriptor, TimeUnit};
