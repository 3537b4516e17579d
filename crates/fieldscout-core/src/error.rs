//! # Error Types
//!
//! Defines `FieldScoutError`, the unified error enum for every failure mode in
//! the profiling pipeline. Variants carry the file path, table, column or query
//! label involved so a failure can be diagnosed without digging through logs.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur in FieldScout operations.
#[derive(Error, Debug)]
pub enum FieldScoutError {
    #[error("Cannot read data file {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database connection failed: {message}\n  Connection string: {connection_hint}\n  Cause: {source}")]
    Connection {
        message: String,
        connection_hint: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Profiling query failed on '{query}': {source}")]
    Query {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Table '{schema}.{table}' not found or has no columns")]
    TableNotFound { schema: String, table: String },

    #[error("Identifier '{identifier}' is not a catalog column of the profiled table")]
    UnknownIdentifier { identifier: String },

    #[error("Malformed delimited data in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Column '{column}' has an inconsistent profile: {message}")]
    DataShape { column: String, message: String },

    #[error("Profiling task failed: {message}")]
    Task { message: String },

    #[error("No database URL provided. FieldScout looks for a connection in this order:\n  1. --db flag or --host/--database parameters\n  2. DATABASE_URL environment variable\n  3. .env file with DATABASE_URL\n  4. fieldscout.toml [database] section\n\nExample: fieldscout table orders --db postgres://localhost/shop")]
    NoDatabaseUrl,

    #[error("Unsupported database scheme '{scheme}'. Supported: postgres://, sqlite://")]
    UnsupportedDatabase { scheme: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {message}: {source}")]
    Output {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl FieldScoutError {
    /// True for failures to reach the data source at all (missing file,
    /// refused connection). Callers decide whether to retry these.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            FieldScoutError::SourceUnavailable { .. } | FieldScoutError::Connection { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FieldScoutError>;
