use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::{FieldScoutError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// Determine the database type from a connection URL.
pub fn database_type_from_url(url: &str) -> Result<DatabaseType> {
    let scheme = url.split(':').next().unwrap_or("");
    match scheme {
        "postgres" | "postgresql" => Ok(DatabaseType::PostgreSQL),
        "sqlite" => Ok(DatabaseType::SQLite),
        other => Err(FieldScoutError::UnsupportedDatabase {
            scheme: other.to_string(),
        }),
    }
}

/// Discrete PostgreSQL connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl ConnectionParams {
    /// Build a `postgres://` URL, percent-encoding credentials.
    pub fn to_url(&self) -> Result<String> {
        let invalid = |what: &str| FieldScoutError::Config {
            message: format!("Invalid {} in connection parameters", what),
        };

        let mut url = url::Url::parse(&format!("postgres://{}", self.host))
            .map_err(|_| invalid("host"))?;
        url.set_port(Some(self.port)).map_err(|_| invalid("port"))?;
        url.set_username(&self.user).map_err(|_| invalid("user"))?;
        url.set_password(self.password.as_deref())
            .map_err(|_| invalid("password"))?;
        url.set_path(&self.database);
        Ok(url.to_string())
    }
}

/// Hide the password of a database URL for error messages and logs.
pub fn sanitize_url(db_url: &str) -> String {
    if let Ok(mut parsed) = url::Url::parse(db_url) {
        if parsed.password().is_some() {
            let _ = parsed.set_password(Some("****"));
        }
        return parsed.to_string();
    }
    // Not a URL (e.g. a bare SQLite path)
    db_url.to_string()
}

pub async fn connect_postgres(db_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(db_url)
        .await
        .map_err(|e| FieldScoutError::Connection {
            message: "Failed to connect to PostgreSQL".to_string(),
            connection_hint: sanitize_url(db_url),
            source: e,
        })
}

/// SQLite pools are single-connection so `sqlite::memory:` stays one database.
pub async fn connect_sqlite(db_url: &str) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(db_url)
        .await
        .map_err(|e| FieldScoutError::Connection {
            message: "Failed to connect to SQLite".to_string(),
            connection_hint: sanitize_url(db_url),
            source: e,
        })
}
