//! Schedule store owning on-call coverage windows.
//!
//! Coverage exclusivity is enforced at creation time by probing whether
//! an existing window is active at the candidate's start or end instant.
//! The probe-then-insert sequence does not span a transaction, so the
//! invariant is best effort under concurrent creation; [`scheduled_at`]
//! tolerates a violated invariant by returning the first row read.
//!
//! [`scheduled_at`]: ScheduleStore::scheduled_at

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::schedule::{Schedule, TimeRange};
use crate::{AppError, Result};

use super::db::Database;
use super::user_store::UserStore;

/// Store wrapper around `SQLite` for schedule records.
#[derive(Clone)]
pub struct ScheduleStore {
    db: Arc<Database>,
    directory: UserStore,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct ScheduleRow {
    id: i64,
    user_id: i64,
    start_time: String,
    end_time: String,
}

impl ScheduleRow {
    /// Parse the stored window without resolving the owner.
    fn into_parts(self) -> Result<(i64, i64, TimeRange)> {
        let start = parse_instant(&self.start_time, "start_time")?;
        let end = parse_instant(&self.end_time, "end_time")?;
        Ok((self.id, self.user_id, TimeRange { start, end }))
    }
}

fn parse_instant(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| AppError::Unknown(format!("could not scan {column}: {err}")))
}

impl ScheduleStore {
    /// Create a new store instance resolving owners through `directory`.
    #[must_use]
    pub fn new(db: Arc<Database>, directory: UserStore) -> Self {
        Self { db, directory }
    }

    /// Convert a database row into the domain model, resolving the owner.
    async fn row_to_schedule(&self, row: ScheduleRow) -> Result<Schedule> {
        let (id, user_id, time) = row.into_parts()?;
        let user = self.directory.get_by_id(user_id).await?;
        Ok(Schedule { id, user, time })
    }

    /// Create a coverage window for `user_id`.
    ///
    /// Rejects windows starting in the past, empty or inverted ranges,
    /// and windows whose start or end instant falls inside an existing
    /// window. Only the candidate's endpoints are probed; a window that
    /// fully encloses an existing one without touching its endpoints is
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` on any validation failure,
    /// `AppError::NotFound` if `user_id` does not resolve, and
    /// `AppError::Unavailable` if the insert fails.
    pub async fn create(&self, user_id: i64, time: TimeRange) -> Result<Schedule> {
        if time.start < Utc::now() {
            return Err(AppError::InvalidArgument(
                "start timestamp in the past".into(),
            ));
        }
        time.validate()?;

        let user = self.directory.get_by_id(user_id).await?;

        // Only one schedule may be active at any instant.
        if self.scheduled_at(time.start).await?.is_some() {
            return Err(AppError::InvalidArgument(
                "schedule already exists within this start timestamp".into(),
            ));
        }
        if self.scheduled_at(time.end).await?.is_some() {
            return Err(AppError::InvalidArgument(
                "schedule already exists within this end timestamp".into(),
            ));
        }

        let row: ScheduleRow = sqlx::query_as(
            "INSERT INTO schedules (user_id, start_time, end_time)
             VALUES (?1, ?2, ?3)
             RETURNING id, user_id, start_time, end_time",
        )
        .bind(user_id)
        .bind(time.start.to_rfc3339())
        .bind(time.end.to_rfc3339())
        .fetch_one(self.db.as_ref())
        .await?;

        let (id, _, time) = row.into_parts()?;
        Ok(Schedule { id, user, time })
    }

    /// The schedule whose window contains `instant`, both ends inclusive.
    ///
    /// At most one row can match while the exclusivity invariant holds;
    /// if it was violated by a concurrent create, the first row read
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the query fails.
    pub async fn scheduled_at(&self, instant: DateTime<Utc>) -> Result<Option<Schedule>> {
        let row: Option<ScheduleRow> = sqlx::query_as(
            "SELECT id, user_id, start_time, end_time FROM schedules
             WHERE ?1 >= start_time AND ?1 <= end_time",
        )
        .bind(instant.to_rfc3339())
        .fetch_optional(self.db.as_ref())
        .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_schedule(row).await?)),
            None => Ok(None),
        }
    }

    /// The schedule active at the current instant.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the query fails.
    pub async fn scheduled_now(&self) -> Result<Option<Schedule>> {
        self.scheduled_at(Utc::now()).await
    }

    /// Point lookup by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the schedule does not exist.
    pub async fn get_by_id(&self, id: i64) -> Result<Schedule> {
        let row: Option<ScheduleRow> = sqlx::query_as(
            "SELECT id, user_id, start_time, end_time FROM schedules WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.db.as_ref())
        .await?;

        match row {
            Some(row) => self.row_to_schedule(row).await,
            None => Err(AppError::NotFound("schedule not found".into())),
        }
    }

    /// Schedules strictly contained within `range`, ordered by start
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if the range is invalid and
    /// `AppError::Unavailable` if the query fails.
    pub async fn list_by_range(&self, range: TimeRange) -> Result<Vec<Schedule>> {
        range.validate()?;

        let rows: Vec<ScheduleRow> = sqlx::query_as(
            "SELECT id, user_id, start_time, end_time FROM schedules
             WHERE start_time > ?1 AND end_time < ?2
             ORDER BY start_time ASC",
        )
        .bind(range.start.to_rfc3339())
        .bind(range.end.to_rfc3339())
        .fetch_all(self.db.as_ref())
        .await?;

        let mut schedules = Vec::with_capacity(rows.len());
        for row in rows {
            schedules.push(self.row_to_schedule(row).await?);
        }
        Ok(schedules)
    }

    /// Fetch-then-delete by identifier, returning the deleted record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the schedule does not exist.
    pub async fn delete_by_id(&self, id: i64) -> Result<Schedule> {
        let schedule = self.get_by_id(id).await?;

        sqlx::query("DELETE FROM schedules WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;

        Ok(schedule)
    }

    /// Bulk delete by range, returning the listed schedules.
    ///
    /// The returned set is the strict-containment listing; the delete
    /// statement itself also removes windows touching the range bounds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if the range is invalid and
    /// `AppError::Unavailable` if the delete fails.
    pub async fn delete_by_range(&self, range: TimeRange) -> Result<Vec<Schedule>> {
        let schedules = self.list_by_range(range).await?;

        sqlx::query("DELETE FROM schedules WHERE start_time >= ?1 AND end_time <= ?2")
            .bind(range.start.to_rfc3339())
            .bind(range.end.to_rfc3339())
            .execute(self.db.as_ref())
            .await?;

        Ok(schedules)
    }
}
