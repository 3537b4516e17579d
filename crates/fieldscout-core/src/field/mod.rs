//! # Field Model
//!
//! Raw per-column statistics (`RawColumnStat`), the canonical classified
//! record (`Field`) and the geographic name tagging applied when a field is
//! built.

pub mod geo;
pub mod types;

pub use types::{ColumnType, DimensionHint, Field, FieldGroup, RawColumnStat};
