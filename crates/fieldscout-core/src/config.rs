//! # Configuration File Parser
//!
//! Reads and parses `fieldscout.toml`, the optional configuration file that
//! sets defaults for the CLI and pipeline without repeating flags:
//!
//! - `[database]`: connection URL or discrete parameters, and schema
//! - `[profile]`: default dimension columns for file sources, query fan-out
//! - `[recommend]`: filter cardinality cutoff
//! - `[correlate]`: enable the correlation analyzer
//!
//! Example `fieldscout.toml`:
//!
//! ```toml
//! [database]
//! url = "postgres://localhost/juno"
//! schema = "public"
//!
//! [profile]
//! dimensions = ["pick_up_date", "store", "vehicle_class"]
//! concurrency = 8
//!
//! [recommend]
//! filter_max_distinct = 300
//!
//! [correlate]
//! enabled = true
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{FieldScoutError, Result};
use crate::recommend::RecommendOptions;
use crate::source::connection::ConnectionParams;
use crate::source::relational::DEFAULT_CONCURRENCY;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "fieldscout.toml";

/// Top-level fieldscout.toml structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldScoutConfig {
    pub database: DatabaseConfig,
    pub profile: ProfileConfig,
    pub recommend: RecommendConfig,
    pub correlate: CorrelateConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "postgres://localhost/juno").
    pub url: Option<String>,
    /// Schema holding the profiled tables (PostgreSQL, default "public").
    pub schema: Option<String>,
    /// Discrete parameters, used when no URL is given.
    pub connection: Option<ConnectionParams>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Columns treated as dimensions when profiling files.
    pub dimensions: Vec<String>,
    /// Per-column queries in flight at once.
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub filter_max_distinct: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorrelateConfig {
    pub enabled: bool,
}

/// Read and parse fieldscout.toml from the given directory.
///
/// Returns `None` if the file doesn't exist (config is optional).
/// Returns an error if the file exists but can't be parsed.
pub fn read_config(dir: &Path) -> Result<Option<FieldScoutConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| FieldScoutError::Config {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let config = parse_config(&content).map_err(|e| match e {
        FieldScoutError::Config { message } => FieldScoutError::Config {
            message: format!("{}: {}", path.display(), message),
        },
        other => other,
    })?;

    Ok(Some(config))
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<FieldScoutConfig> {
    let config: FieldScoutConfig = toml::from_str(content).map_err(|e| FieldScoutError::Config {
        message: format!("Failed to parse: {}", e),
    })?;
    config.validate()?;
    Ok(config)
}

impl FieldScoutConfig {
    /// Reject values serde accepts but the pipeline cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.profile.concurrency == Some(0) {
            return Err(FieldScoutError::Config {
                message: "profile.concurrency must be at least 1".to_string(),
            });
        }
        if self.recommend.filter_max_distinct == Some(0) {
            return Err(FieldScoutError::Config {
                message: "recommend.filter_max_distinct must be at least 1 \
                          (0 would suppress every filter)"
                    .to_string(),
            });
        }
        if self.database.url.is_some() && self.database.connection.is_some() {
            tracing::warn!(
                "fieldscout.toml sets both database.url and [database.connection]; \
                 using database.url"
            );
        }
        Ok(())
    }

    pub fn concurrency(&self) -> usize {
        self.profile.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn recommend_options(&self) -> RecommendOptions {
        let mut options = RecommendOptions::default();
        if let Some(limit) = self.recommend.filter_max_distinct {
            options.filter_max_distinct = limit;
        }
        options
    }
}

/// Resolve a database URL: explicit value, then `DATABASE_URL` (process env or
/// `.env`), then the config file.
pub fn resolve_database_url(
    explicit: Option<&str>,
    config: Option<&FieldScoutConfig>,
) -> Result<String> {
    if let Some(url) = explicit {
        return Ok(url.to_string());
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(url);
    }
    if dotenvy::dotenv().is_ok() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return Ok(url);
        }
    }
    if let Some(cfg) = config {
        if let Some(ref url) = cfg.database.url {
            return Ok(url.clone());
        }
        if let Some(ref params) = cfg.database.connection {
            return params.to_url();
        }
    }
    Err(FieldScoutError::NoDatabaseUrl)
}
