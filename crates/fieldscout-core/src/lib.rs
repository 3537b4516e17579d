pub mod config;
pub mod correlate;
pub mod error;
pub mod field;
pub mod pipeline;
pub mod rank;
pub mod recommend;
pub mod source;

// Re-export key types for convenience
pub use error::{FieldScoutError, Result};
pub use field::{ColumnType, DimensionHint, Field, FieldGroup, RawColumnStat};
pub use pipeline::{analyze, Analysis, AnalyzeOptions};
pub use rank::classify_and_rank;
pub use recommend::{recommend, ChartSuggestion};
