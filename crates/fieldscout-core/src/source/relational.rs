//! Shared pieces of the relational profilers: the `ColumnProfiler` seam, SQL
//! builders, native-type mapping, identifier allow-listing and the per-column
//! fan-out.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{FieldScoutError, Result};
use crate::field::{ColumnType, RawColumnStat};
use crate::source::connection::DatabaseType;

/// Default number of per-column queries in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Raw statistics for every column of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableProfile {
    pub table: String,
    pub row_count: u64,
    pub columns: Vec<RawColumnStat>,
}

/// Profiles a table of a relational store.
/// Each backend implements this on top of its catalog and aggregate queries.
pub trait ColumnProfiler: Send + Sync {
    fn profile_table(&self, table: &str) -> impl Future<Output = Result<TableProfile>> + Send;
}

/// One column as reported by the store's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub name: String,
    /// Native type name, verbatim from the catalog
    pub native_type: String,
    pub foreign_key: bool,
}

/// Identifiers known to the catalog. Only these are ever interpolated into SQL.
#[derive(Debug, Clone, Default)]
pub struct IdentifierAllowList {
    names: HashSet<String>,
}

impl IdentifierAllowList {
    pub fn from_catalog(table: &str, columns: &[CatalogColumn]) -> Self {
        let mut names: HashSet<String> = columns.iter().map(|c| c.name.clone()).collect();
        names.insert(table.to_string());
        Self { names }
    }

    /// Quote `ident`, refusing anything not in the allow-list.
    pub fn quote(&self, ident: &str) -> Result<String> {
        if !self.names.contains(ident) {
            return Err(FieldScoutError::UnknownIdentifier {
                identifier: ident.to_string(),
            });
        }
        Ok(quote_ident(ident))
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quoted, schema-qualified table reference.
pub fn qualified_table(schema: Option<&str>, quoted_table: &str, db_type: DatabaseType) -> String {
    match (schema, db_type) {
        (Some(schema), DatabaseType::PostgreSQL) => {
            format!("{}.{}", quote_ident(schema), quoted_table)
        }
        _ => quoted_table.to_string(),
    }
}

pub fn row_count_query(table: &str) -> String {
    format!("SELECT COUNT(*) AS cnt FROM {}", table)
}

/// Non-null and distinct non-null counts for one column.
pub fn column_counts_query(table: &str, column: &str) -> String {
    format!(
        "SELECT COUNT({col}) AS valid, COUNT(DISTINCT {col}) AS distinct_count FROM {tbl}",
        col = column,
        tbl = table
    )
}

/// Count non-null values with a non-integral component.
pub fn fractional_probe_query(table: &str, column: &str, db_type: DatabaseType) -> String {
    match db_type {
        DatabaseType::PostgreSQL => format!(
            "SELECT COUNT(*) AS fractional FROM {tbl} \
             WHERE {col} IS NOT NULL AND {col} <> FLOOR({col})",
            col = column,
            tbl = table
        ),
        // FLOOR is only built with SQLite's math extension.
        DatabaseType::SQLite => format!(
            "SELECT COUNT(*) AS fractional FROM {tbl} \
             WHERE {col} IS NOT NULL AND {col} <> CAST({col} AS INTEGER)",
            col = column,
            tbl = table
        ),
    }
}

/// Resolve a generic numeric column from its fractional probe.
pub fn refine_numeric_type(fractional_count: u64) -> ColumnType {
    if fractional_count > 0 {
        ColumnType::Number
    } else {
        ColumnType::Integer
    }
}

/// Native types whose integer-ness can only be known from the data.
pub fn is_generic_numeric(native_type: &str, db_type: DatabaseType) -> bool {
    let normalized = normalize_native(native_type);
    match db_type {
        DatabaseType::PostgreSQL => normalized == "numeric",
        DatabaseType::SQLite => normalized == "numeric" || normalized == "decimal",
    }
}

/// Map a native type name to the canonical tag. Unmapped names pass through.
pub fn map_native_type(native_type: &str, db_type: DatabaseType) -> ColumnType {
    match db_type {
        DatabaseType::PostgreSQL => match native_type {
            "numeric" => ColumnType::Number,
            "character varying" => ColumnType::String,
            "timestamp without time zone" => ColumnType::Date,
            other => ColumnType::from_tag(other),
        },
        DatabaseType::SQLite => map_sqlite_type(native_type),
    }
}

/// Map a SQLite declared type using its affinity rules.
fn map_sqlite_type(declared: &str) -> ColumnType {
    let normalized = normalize_native(declared);
    if normalized.is_empty() {
        return ColumnType::Other("blob".to_string());
    }
    if normalized.contains("int") {
        ColumnType::Integer
    } else if normalized.contains("char") || normalized.contains("clob") || normalized.contains("text") {
        ColumnType::String
    } else if normalized.contains("bool") {
        ColumnType::Boolean
    } else if normalized.contains("date") || normalized.contains("time") {
        ColumnType::Date
    } else if normalized.contains("real")
        || normalized.contains("floa")
        || normalized.contains("doub")
        || normalized == "numeric"
        || normalized == "decimal"
    {
        ColumnType::Number
    } else {
        ColumnType::Other(normalized)
    }
}

/// Lower-case and drop any `(precision, scale)` suffix.
fn normalize_native(native_type: &str) -> String {
    let base = native_type.split('(').next().unwrap_or(native_type);
    base.trim().to_lowercase()
}

/// Run `work` for every item with at most `concurrency` in flight, returning
/// results in input order.
///
/// The first failure is returned and the remaining tasks are aborted when the
/// `JoinSet` drops; no partial output escapes.
pub(crate) async fn fan_out<T, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    work: F,
) -> Result<Vec<RawColumnStat>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<RawColumnStat>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let total = items.len();
    let mut tasks = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let job = work(item);
        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return (
                        index,
                        Err(FieldScoutError::Task {
                            message: "column query scheduler closed".to_string(),
                        }),
                    )
                }
            };
            (index, job.await)
        });
    }

    let mut slots: Vec<Option<RawColumnStat>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| FieldScoutError::Task {
            message: format!("column query task failed: {}", e),
        })?;
        slots[index] = Some(result?);
    }

    Ok(slots.into_iter().flatten().collect())
}
