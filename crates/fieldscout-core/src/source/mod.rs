//! # Profile Acquisition
//!
//! Adapters that turn a data source into `RawColumnStat`s:
//!
//! - `file` / `summary`: delimited files decoded with `csv`, summarized by a
//!   pluggable `Summarizer`
//! - `postgres` / `sqlite`: catalog introspection plus per-column aggregate
//!   queries through `sqlx`, behind the `ColumnProfiler` trait

pub mod connection;
pub mod file;
pub mod postgres;
pub mod relational;
pub mod sqlite;
pub mod summary;
