//! Persistence layer modules.

pub mod db;
pub mod incident_store;
pub mod schedule_store;
pub mod schema;
pub mod user_store;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;
