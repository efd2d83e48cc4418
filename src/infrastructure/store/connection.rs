//! SQLite connection pool setup: WAL journal mode, `busy_timeout`, and
//! `create_if_missing`, sized for this crate's single-writer access
//! pattern.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to create pool: {0}")]
    PoolCreationFailed(#[source] sqlx::Error),
    #[error("invalid database path: {0}")]
    InvalidDatabasePath(String),
    #[error("failed to create directory: {0}")]
    DirectoryCreationFailed(#[source] std::io::Error),
    #[error("failed to run migrations: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),
}

/// Open (creating if missing) the SQLite database at `path` and run
/// pending migrations.
pub async fn open(path: &str) -> Result<SqlitePool, ConnectionError> {
    ensure_parent_dir(path)?;

    let connect_options = SqliteConnectOptions::from_str(path)
        .map_err(|e| ConnectionError::InvalidDatabasePath(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
        .map_err(ConnectionError::PoolCreationFailed)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(ConnectionError::MigrationFailed)?;

    Ok(pool)
}

/// Open an in-memory database for tests, with migrations applied.
pub async fn open_in_memory() -> Result<SqlitePool, ConnectionError> {
    let connect_options = SqliteConnectOptions::from_str(":memory:")
        .map_err(|e| ConnectionError::InvalidDatabasePath(e.to_string()))?
        .journal_mode(SqliteJournalMode::Memory)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .map_err(ConnectionError::PoolCreationFailed)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(ConnectionError::MigrationFailed)?;

    Ok(pool)
}

fn ensure_parent_dir(path: &str) -> Result<(), ConnectionError> {
    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(ConnectionError::DirectoryCreationFailed)?;
        }
    }
    Ok(())
}
