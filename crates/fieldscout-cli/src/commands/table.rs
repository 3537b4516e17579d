use std::path::Path;

use anyhow::{Context, Result};

use fieldscout_core::config::{read_config, resolve_database_url, FieldScoutConfig};
use fieldscout_core::pipeline::{analyze_table, AnalyzeOptions};
use fieldscout_core::source::connection::{
    connect_postgres, connect_sqlite, database_type_from_url, ConnectionParams, DatabaseType,
};
use fieldscout_core::source::postgres::PostgresProfiler;
use fieldscout_core::source::sqlite::SqliteProfiler;
use fieldscout_core::Analysis;

use crate::args::TableArgs;
use crate::commands::{emit, recommend_options, spinner};

pub async fn run(args: &TableArgs) -> Result<()> {
    let config = read_config(Path::new("."))?.unwrap_or_default();

    let db_url = connection_url(args, &config)?;
    let db_type = database_type_from_url(&db_url)?;

    let concurrency = args
        .concurrency
        .map(usize::from)
        .unwrap_or_else(|| config.concurrency());
    let options = AnalyzeOptions {
        recommend: recommend_options(&args.report, config.recommend_options())?,
        correlate: false,
    };

    let pb = spinner(&format!("Profiling {}...", args.table));
    let analysis = profile(args, &config, &db_url, db_type, concurrency, &options)
        .await
        .with_context(|| format!("Failed to analyze table {}", args.table));
    pb.finish_and_clear();
    let analysis = analysis?;

    emit(&analysis, &args.report, &args.table)
}

/// Discrete `--host` parameters win over any URL source.
fn connection_url(args: &TableArgs, config: &FieldScoutConfig) -> Result<String> {
    if let (Some(host), Some(database), Some(user)) = (&args.host, &args.database, &args.user) {
        let params = ConnectionParams {
            host: host.clone(),
            port: args.port,
            database: database.clone(),
            user: user.clone(),
            password: args.password.clone(),
        };
        return Ok(params.to_url()?);
    }
    Ok(resolve_database_url(args.db.as_deref(), Some(config))?)
}

async fn profile(
    args: &TableArgs,
    config: &FieldScoutConfig,
    db_url: &str,
    db_type: DatabaseType,
    concurrency: usize,
    options: &AnalyzeOptions,
) -> Result<Analysis> {
    let analysis = match db_type {
        DatabaseType::PostgreSQL => {
            let pool = connect_postgres(db_url, pool_size(concurrency)).await?;
            let schema = args
                .schema
                .clone()
                .or_else(|| config.database.schema.clone())
                .unwrap_or_else(|| "public".to_string());
            let profiler = PostgresProfiler::with_schema(pool, schema).concurrency(concurrency);
            analyze_table(&profiler, &args.table, options).await?
        }
        DatabaseType::SQLite => {
            if args.schema.is_some() {
                tracing::warn!("--schema is ignored for SQLite");
            }
            let pool = connect_sqlite(db_url).await?;
            let profiler = SqliteProfiler::new(pool).concurrency(concurrency);
            analyze_table(&profiler, &args.table, options).await?
        }
    };
    Ok(analysis)
}

/// One connection per in-flight column query plus one for catalog queries.
fn pool_size(concurrency: usize) -> u32 {
    u32::try_from(concurrency)
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_saturates() {
        assert_eq!(pool_size(4), 5);
        assert_eq!(pool_size(usize::MAX), u32::MAX);
    }
}
