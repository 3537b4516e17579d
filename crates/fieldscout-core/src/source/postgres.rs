use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::error::{FieldScoutError, Result};
use crate::field::RawColumnStat;
use crate::source::connection::DatabaseType;
use crate::source::relational::{
    column_counts_query, fan_out, fractional_probe_query, is_generic_numeric, map_native_type,
    qualified_table, refine_numeric_type, row_count_query, CatalogColumn, ColumnProfiler,
    IdentifierAllowList, TableProfile, DEFAULT_CONCURRENCY,
};

const DB: DatabaseType = DatabaseType::PostgreSQL;

pub struct PostgresProfiler {
    pool: PgPool,
    schema_name: String,
    concurrency: usize,
}

impl PostgresProfiler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema_name: "public".to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_schema(pool: PgPool, schema_name: String) -> Self {
        Self {
            pool,
            schema_name,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit the number of per-column queries in flight.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    async fn introspect_columns(&self, table: &str) -> Result<Vec<CatalogColumn>> {
        let query = r#"
            SELECT
                c.column_name,
                c.data_type
            FROM information_schema.columns c
            WHERE c.table_schema = $1
                AND c.table_name = $2
            ORDER BY c.ordinal_position
        "#;

        let rows = sqlx::query(query)
            .bind(&self.schema_name)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FieldScoutError::Query {
                query: format!("fetch columns of {}", table),
                source: e,
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.get("column_name");
            let native_type: String = row.get("data_type");
            columns.push(CatalogColumn {
                name,
                native_type,
                foreign_key: false,
            });
        }
        Ok(columns)
    }

    async fn introspect_foreign_key_columns(&self, table: &str) -> Result<Vec<String>> {
        let query = r#"
            SELECT DISTINCT
                kcu.column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            WHERE tc.table_schema = $1
                AND tc.table_name = $2
                AND tc.constraint_type = 'FOREIGN KEY'
        "#;

        let rows = sqlx::query(query)
            .bind(&self.schema_name)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FieldScoutError::Query {
                query: format!("fetch foreign keys of {}", table),
                source: e,
            })?;

        Ok(rows.iter().map(|row| row.get("column_name")).collect())
    }

    async fn count_rows(&self, qualified: &str) -> Result<u64> {
        let sql = row_count_query(qualified);
        let row: (i64,) = sqlx::query_as(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| FieldScoutError::Query {
                query: format!("row count for {}", qualified),
                source: e,
            })?;
        Ok(row.0 as u64)
    }
}

impl ColumnProfiler for PostgresProfiler {
    async fn profile_table(&self, table: &str) -> Result<TableProfile> {
        let mut columns = self.introspect_columns(table).await?;
        if columns.is_empty() {
            return Err(FieldScoutError::TableNotFound {
                schema: self.schema_name.clone(),
                table: table.to_string(),
            });
        }

        let fk_columns = self.introspect_foreign_key_columns(table).await?;
        for column in &mut columns {
            column.foreign_key = fk_columns.contains(&column.name);
        }

        let allow = IdentifierAllowList::from_catalog(table, &columns);
        let qualified = qualified_table(Some(&self.schema_name), &allow.quote(table)?, DB);
        let row_count = self.count_rows(&qualified).await?;

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
            schema = %self.schema_name,
            rows = row_count,
            columns = stats.len(),
            "Profiled PostgreSQL table"
        );

        Ok(TableProfile {
            table: table.to_string(),
            row_count,
            columns: stats,
        })
    }
}

async fn profile_column(
    pool: PgPool,
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

    tracing::debug!(
        column = %column.name,
        native = %column.native_type,
        resolved = %column_type,
        valid,
        distinct,
        "Profiled column"
    );

    Ok(RawColumnStat::new(column.name, column_type)
        .with_counts(row_count, valid as u64, distinct as u64)
        .with_foreign_key(column.foreign_key))
}
