//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to
//! re-run on every server startup. Produces a convergent result.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// Timestamps are stored as RFC 3339 UTC text; fixed-offset strings
/// order lexicographically with their chronological order, so range
/// predicates compare them directly.
///
/// # Errors
///
/// Returns `AppError::Unavailable` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    slack_handle  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schedules (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    start_time  TEXT NOT NULL,
    end_time    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS incidents (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    assigned_user_id  INTEGER REFERENCES users(id),
    body              TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    acknowledged_at   TEXT
);

CREATE INDEX IF NOT EXISTS idx_schedules_window ON schedules(start_time, end_time);
CREATE INDEX IF NOT EXISTS idx_incidents_open ON incidents(acknowledged_at);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
