use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::error::{FieldScoutError, Result};
use crate::field::RawColumnStat;
use crate::source::connection::DatabaseType;
use crate::source::relational::{
    column_counts_query, fan_out, fractional_probe_query, is_generic_numeric, map_native_type,
    qualified_table, refine_numeric_type, row_count_query, CatalogColumn, ColumnProfiler,
    IdentifierAllowList, TableProfile, DEFAULT_CONCURRENCY,
};

const DB: DatabaseType = DatabaseType::SQLite;

pub struct SqliteProfiler {
    pool: SqlitePool,
    concurrency: usize,
}

impl SqliteProfiler {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    async fn introspect_columns(&self, table: &str) -> Result<Vec<CatalogColumn>> {
        let rows = sqlx::query("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FieldScoutError::Query {
                query: format!("fetch columns of {}", table),
                source: e,
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.get("name");
            let native_type: String = row.get("type");
            columns.push(CatalogColumn {
                name,
                native_type,
                foreign_key: false,
            });
        }
        Ok(columns)
    }

    async fn introspect_foreign_key_columns(&self, table: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(r#"SELECT DISTINCT "from" FROM pragma_foreign_key_list(?1)"#)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FieldScoutError::Query {
                query: format!("fetch foreign keys of {}", table),
                source: e,
            })?;

        Ok(rows.iter().map(|row| row.get("from")).collect())
    }
}

impl ColumnProfiler for SqliteProfiler {
    async fn profile_table(&self, table: &str) -> Result<TableProfile> {
        let mut columns = self.introspect_columns(table).await?;
        if columns.is_empty() {
            return Err(FieldScoutError::TableNotFound {
                schema: "main".to_string(),
                table: table.to_string(),
            });
        }

        let fk_columns = self.introspect_foreign_key_columns(table).await?;
        for column in &mut columns {
            column.foreign_key = fk_columns.contains(&column.name);
        }

        let allow = IdentifierAllowList::from_catalog(table, &columns);
        let qualified = qualified_table(None, &allow.quote(table)?, DB);

        let sql = row_count_query(&qualified);
        let (count,): (i64,) = sqlx::query_as(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| FieldScoutError::Query {
                query: format!("row count for {}", table),
                source: e,
            })?;
        let row_count = count as u64;

        let mut jobs = Vec::with_capacity(columns.len());
        for column in columns {
            let quoted = allow.quote(&column.name)?;
            jobs.push((column, quoted));
        }

        let pool = self.pool.clone();
        let stats = fan_out(jobs, self.concurrency, |(column, quoted)| {
            profile_column(pool.clone(), qualified.clone(), column, quoted, row_count)
        })
        .await?;

        tracing::info!(
            table = %table,
            rows = row_count,
            columns = stats.len(),
            "Profiled SQLite table"
        );

        Ok(TableProfile {
            table: table.to_string(),
            row_count,
            columns: stats,
        })
    }
}

async fn profile_column(
    pool: SqlitePool,
    table: String,
    column: CatalogColumn,
    quoted: String,
    row_count: u64,
) -> Result<RawColumnStat> {
    let sql = column_counts_query(&table, &quoted);
    let (valid, distinct): (i64, i64) = sqlx::query_as(&sql)
        .fetch_one(&pool)
        .await
        .map_err(|e| FieldScoutError::Query {
            query: format!("counts for {}.{}", table, column.name),
            source: e,
        })?;

    let column_type = if is_generic_numeric(&column.native_type, DB) {
        let sql = fractional_probe_query(&table, &quoted, DB);
        let (fractional,): (i64,) = sqlx::query_as(&sql)
            .fetch_one(&pool)
            .await
            .map_err(|e| FieldScoutError::Query {
                query: format!("fractional probe for {}.{}", table, column.name),
                source: e,
            })?;
        refine_numeric_type(fractional as u64)
    } else {
        map_native_type(&column.native_type, DB)
    };

    Ok(RawColumnStat::new(column.name, column_type)
        .with_counts(row_count, valid as u64, distinct as u64)
        .with_foreign_key(column.foreign_key))
}
