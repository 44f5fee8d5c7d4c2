//! User directory store for `SQLite` persistence.

use std::sync::Arc;

use crate::models::user::User;
use crate::{AppError, Result};

use super::db::Database;

/// Store wrapper around `SQLite` for user records.
#[derive(Clone)]
pub struct UserStore {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    slack_handle: String,
}

impl UserRow {
    /// Convert a database row into the domain model.
    fn into_user(self) -> User {
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            slack_handle: self.slack_handle,
        }
    }
}

impl UserStore {
    /// Create a new store instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new user record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if any field is empty and
    /// `AppError::Unavailable` if the insert fails.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        slack_handle: &str,
    ) -> Result<User> {
        if first_name.is_empty() {
            return Err(AppError::InvalidArgument("first name is empty".into()));
        }
        if last_name.is_empty() {
            return Err(AppError::InvalidArgument("last name is empty".into()));
        }
        if slack_handle.is_empty() {
            return Err(AppError::InvalidArgument("slack handle is empty".into()));
        }

        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (first_name, last_name, slack_handle)
             VALUES (?1, ?2, ?3)
             RETURNING id, first_name, last_name, slack_handle",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(slack_handle)
        .fetch_one(self.db.as_ref())
        .await?;

        Ok(row.into_user())
    }

    /// Resolve a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user does not exist.
    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, first_name, last_name, slack_handle FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.db.as_ref())
        .await?;

        row.map(UserRow::into_user)
            .ok_or_else(|| AppError::NotFound("no user found".into()))
    }

    /// List every registered user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT id, first_name, last_name, slack_handle FROM users")
                .fetch_all(self.db.as_ref())
                .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }
}
