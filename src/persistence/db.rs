//! `SQLite` connection pool setup and schema bootstrap.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::Result;

use super::schema;

/// Alias for the shared `SQLite` pool.
pub type Database = SqlitePool;

/// Open the database file at `path`, creating it if missing, and apply
/// the schema.
///
/// # Errors
///
/// Returns `AppError::Unavailable` if the connection or schema
/// application fails.
pub async fn connect(path: &Path) -> Result<Database> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    schema::bootstrap_schema(&pool).await?;
    Ok(pool)
}

/// Connect to a fresh in-memory database and apply the schema.
///
/// The pool is pinned to a single connection: `SQLite` gives every
/// in-memory connection its own private database.
///
/// # Errors
///
/// Returns `AppError::Unavailable` if the connection or schema
/// application fails.
pub async fn connect_memory() -> Result<Database> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    schema::bootstrap_schema(&pool).await?;
    Ok(pool)
}
