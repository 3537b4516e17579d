use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "fieldscout",
    about = "Rank a dataset's columns and suggest charts for them",
    version,
    after_help = "Examples:\n  fieldscout file vehicles.csv --dimensions pick_up_date,store,vehicle_class\n  fieldscout file cases.csv --dimensions Country_Region --correlate --format json\n  fieldscout table orders --db postgres://localhost/shop\n  fieldscout table orders --host localhost --database shop --user report\n  fieldscout table orders                  # auto-detect DB from .env"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Profile a delimited file (CSV, TSV, ...)
    File(FileArgs),

    /// Profile a database table; foreign-key columns become dimensions
    Table(TableArgs),
}

#[derive(Parser, Debug)]
pub struct FileArgs {
    /// Path to the delimited file
    pub path: PathBuf,

    /// Columns to treat as dimensions (falls back to fieldscout.toml)
    #[arg(long, value_delimiter = ',')]
    pub dimensions: Vec<String>,

    /// Also compute correlations between numeric measures
    #[arg(long)]
    pub correlate: bool,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Parser, Debug)]
pub struct TableArgs {
    /// Table to profile
    pub table: String,

    /// Database connection URL (postgres://, sqlite://)
    /// Falls back to DATABASE_URL env var, .env file or fieldscout.toml
    #[arg(long, env = "DATABASE_URL")]
    pub db: Option<String>,

    /// PostgreSQL host; with --database and --user, takes precedence over --db
    #[arg(long, requires_all = ["database", "user"])]
    pub host: Option<String>,

    /// PostgreSQL port
    #[arg(long, default_value = "5432")]
    pub port: u16,

    /// PostgreSQL database name
    #[arg(long)]
    pub database: Option<String>,

    /// PostgreSQL user
    #[arg(long)]
    pub user: Option<String>,

    /// PostgreSQL password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Schema holding the table (default: public for Postgres)
    #[arg(long)]
    pub schema: Option<String>,

    /// Maximum per-column queries in flight (1-256)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=256))]
    pub concurrency: Option<u16>,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Options shared by every command that prints an analysis.
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Output format
    #[arg(long, default_value = "table")]
    pub format: ReportFormat,

    /// Dimensions with at least this many distinct values get no filter
    #[arg(long)]
    pub filter_max_distinct: Option<u64>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
}
