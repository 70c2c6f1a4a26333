//! Database connection module for the BP tracker
//!
//! SQLite is the only backend. When the database file cannot be opened the
//! pool falls back to a single-connection in-memory database so the tracker
//! keeps working for the session.

use std::env;
use std::path::Path;
use std::time::Duration;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// SQLite connection pool
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// Default location of the SQLite database file
pub const DEFAULT_SQLITE_PATH: &str = "data/bp_tracker.db";

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: DEFAULT_SQLITE_PATH.to_string(),
            max_connections: 4,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    ///
    /// Unparseable values are logged and replaced by the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let sqlite_path = lookup("DB_SQLITE_PATH")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or(defaults.sqlite_path);

        let max_connections =
            parse_var(&lookup, "DB_MAX_CONNECTIONS").unwrap_or(defaults.max_connections);
        let timeout_seconds =
            parse_var(&lookup, "DB_TIMEOUT_SECONDS").unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            sqlite_path, max_connections, timeout_seconds
        );

        Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        }
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {}", name, raw);
            None
        }
    }
}

/// Create the SQLite connection pool and run migrations
pub fn create_sqlite_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    if config.max_connections == 0 {
        return Err(DatabaseError::ConfigError("max_connections must be at least 1".to_string()));
    }

    info!("Initializing SQLite database at: {}", config.sqlite_path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = Path::new(&config.sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create directory: {}, falling back to in-memory database", e);
                return create_in_memory_pool(config);
            }
        }
    }

    let manager = SqliteConnectionManager::file(&config.sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = match r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to create SQLite connection pool: {}", e);
            warn!("Falling back to in-memory SQLite database");
            return create_in_memory_pool(config);
        }
    };

    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    info!("SQLite connection pool created successfully");
    Ok(pool)
}

/// Create an in-memory SQLite database.
///
/// Every pooled connection to `:memory:` would see its own empty database,
/// so the pool is pinned to one connection.
pub fn create_in_memory_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(SqliteConnectionManager::memory())?;

    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    info!("In-memory SQLite database initialized successfully");
    Ok(pool)
}

/// Get information about the database behind a pool
pub fn get_connection_info(pool: &SqlitePool) -> String {
    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to get SQLite connection: {}", e);
            return format!("SQLite connection error: {}", e);
        }
    };

    let location = match conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)) {
        Ok(path) if path.is_empty() || path == ":memory:" => "SQLite in-memory database".to_string(),
        Ok(path) => format!("SQLite database at {}", path),
        Err(_) => "SQLite database (path unknown)".to_string(),
    };

    let state = pool.state();
    format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    )
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.sqlite_path, DEFAULT_SQLITE_PATH);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_database_config_from_lookup() {
        let config = DatabaseConfig::from_lookup(|name| match name {
            "DB_SQLITE_PATH" => Some("/tmp/bp.db".to_string()),
            "DB_MAX_CONNECTIONS" => Some("eight".to_string()),
            "DB_TIMEOUT_SECONDS" => Some(" 5 ".to_string()),
            _ => None,
        });
        assert_eq!(config.sqlite_path, "/tmp/bp.db");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_in_memory_pool_is_migrated() {
        let pool = create_in_memory_pool(&DatabaseConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM key_value_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        drop(conn);

        assert!(get_connection_info(&pool).contains("in-memory"));
    }

    #[test]
    fn test_zero_connections_rejected() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::default()
        };
        assert!(matches!(create_sqlite_pool(&config), Err(DatabaseError::ConfigError(_))));
    }
}
