//! Incident store owning incident records and their lifecycle.
//!
//! Every mutation is a single conditional statement guarded by
//! `acknowledged_at IS NULL`, evaluated atomically by `SQLite`; an
//! update matching zero rows surfaces as `NotFound`, which also covers
//! transitions attempted on an already-acknowledged incident.
//! Notifications are best-effort: a failed send is logged and never
//! fails the triggering state change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::incident::Incident;
use crate::slack::notifier::Notifier;
use crate::{AppError, Result};

use super::db::Database;
use super::schedule_store::ScheduleStore;
use super::user_store::UserStore;

/// Store wrapper around `SQLite` for incident records.
#[derive(Clone)]
pub struct IncidentStore {
    db: Arc<Database>,
    directory: UserStore,
    schedules: ScheduleStore,
    notifier: Arc<dyn Notifier>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct IncidentRow {
    id: i64,
    assigned_user_id: Option<i64>,
    body: String,
    created_at: String,
    acknowledged_at: Option<String>,
}

fn parse_instant(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| AppError::Unknown(format!("could not scan {column}: {err}")))
}

impl IncidentStore {
    /// Create a new store instance.
    ///
    /// The store consults `schedules` for the current on-call user at
    /// incident creation and holds `notifier` as an injected capability
    /// for best-effort notifications.
    #[must_use]
    pub fn new(
        db: Arc<Database>,
        directory: UserStore,
        schedules: ScheduleStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            directory,
            schedules,
            notifier,
        }
    }

    /// Convert a database row into the domain model, resolving the
    /// assignee through the directory.
    async fn row_to_incident(&self, row: IncidentRow) -> Result<Incident> {
        let created_at = parse_instant(&row.created_at, "created_at")?;
        let acknowledged_at = match row.acknowledged_at.as_deref() {
            Some(raw) => Some(parse_instant(raw, "acknowledged_at")?),
            None => None,
        };
        let assignee = match row.assigned_user_id {
            Some(user_id) => match self.directory.get_by_id(user_id).await {
                Ok(user) => Some(user),
                Err(AppError::NotFound(_)) => {
                    return Err(AppError::NotFound(format!(
                        "could not retrieve user {user_id} for incident {}",
                        row.id
                    )));
                }
                Err(err) => return Err(err),
            },
            None => None,
        };

        Ok(Incident {
            id: row.id,
            body: row.body,
            created_at,
            acknowledged_at,
            assignee,
        })
    }

    /// Deliver a best-effort notification, logging failures.
    async fn notify(&self, text: String) {
        if let Err(err) = self.notifier.send(text).await {
            warn!(%err, "incident notification failed");
        }
    }

    /// Create an incident, assigning it to whoever is on call right now.
    ///
    /// When nobody is on call the incident is persisted unassigned. A
    /// "created" notification is sent either way; its failure does not
    /// fail the creation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the on-call lookup or the
    /// insert fails.
    pub async fn create(&self, body: &str) -> Result<Incident> {
        let on_call = self.schedules.scheduled_now().await?;
        let created_at = Utc::now().to_rfc3339();

        let row: IncidentRow = match &on_call {
            Some(schedule) => {
                sqlx::query_as(
                    "INSERT INTO incidents (assigned_user_id, body, created_at)
                     VALUES (?1, ?2, ?3)
                     RETURNING id, assigned_user_id, body, created_at, acknowledged_at",
                )
                .bind(schedule.user.id)
                .bind(body)
                .bind(&created_at)
                .fetch_one(self.db.as_ref())
                .await?
            }
            None => {
                sqlx::query_as(
                    "INSERT INTO incidents (body, created_at)
                     VALUES (?1, ?2)
                     RETURNING id, assigned_user_id, body, created_at, acknowledged_at",
                )
                .bind(body)
                .bind(&created_at)
                .fetch_one(self.db.as_ref())
                .await?
            }
        };

        let incident = self.row_to_incident(row).await?;

        let text = match &incident.assignee {
            Some(user) => format!(
                "Incident #{} created and assigned to {}\n{}",
                incident.id,
                user.mention(),
                incident.body
            ),
            None => format!(
                "Incident #{} created and unassigned\n{}",
                incident.id, incident.body
            ),
        };
        self.notify(text).await;

        Ok(incident)
    }

    /// List every open incident with its assignee resolved.
    ///
    /// Acknowledged incidents are permanently excluded from the query
    /// surface; this is the only listing operation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the query fails.
    pub async fn list_open(&self) -> Result<Vec<Incident>> {
        let rows: Vec<IncidentRow> = sqlx::query_as(
            "SELECT id, assigned_user_id, body, created_at, acknowledged_at
             FROM incidents
             WHERE acknowledged_at IS NULL",
        )
        .fetch_all(self.db.as_ref())
        .await?;

        let mut incidents = Vec::with_capacity(rows.len());
        for row in rows {
            incidents.push(self.row_to_incident(row).await?);
        }
        Ok(incidents)
    }

    /// Set the assignee on an open incident.
    ///
    /// Reassigning an already-assigned open incident overwrites the
    /// assignee. Sends a reassignment notification naming the new
    /// assignee.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no open incident matches `id`
    /// (missing or already acknowledged) and `AppError::Unavailable` if
    /// the update fails.
    pub async fn assign(&self, id: i64, user_id: i64) -> Result<Incident> {
        let rows: Vec<IncidentRow> = sqlx::query_as(
            "UPDATE incidents
             SET assigned_user_id = ?1
             WHERE acknowledged_at IS NULL
               AND id = ?2
             RETURNING id, assigned_user_id, body, created_at, acknowledged_at",
        )
        .bind(user_id)
        .bind(id)
        .fetch_all(self.db.as_ref())
        .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("no incident found".into()))?;
        let incident = self.row_to_incident(row).await?;

        self.notify(format!(
            "Incident #{} is re-assigned to {}\n{}",
            incident.id,
            incident.assignee_mention(),
            incident.body
        ))
        .await;

        Ok(incident)
    }

    /// Acknowledge an open incident.
    ///
    /// Sends an acknowledgment notification naming the current assignee,
    /// or the `Unassigned` placeholder when there is none.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no open incident matches `id`
    /// (missing or already acknowledged) and `AppError::Unavailable` if
    /// the update fails.
    pub async fn acknowledge(&self, id: i64) -> Result<Incident> {
        let rows: Vec<IncidentRow> = sqlx::query_as(
            "UPDATE incidents
             SET acknowledged_at = ?1
             WHERE acknowledged_at IS NULL
               AND id = ?2
             RETURNING id, assigned_user_id, body, created_at, acknowledged_at",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .fetch_all(self.db.as_ref())
        .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("no incident found".into()))?;
        let incident = self.row_to_incident(row).await?;

        self.notify(format!(
            "Incident #{} assigned to {} has been acknowledged:\n{}",
            incident.id,
            incident.assignee_mention(),
            incident.body
        ))
        .await;

        Ok(incident)
    }

    /// Acknowledge every open incident as one batch transition.
    ///
    /// Returns only the first affected row; callers needing the full
    /// affected set must not rely on this return value. Emits a single
    /// best-effort notification carrying the first row's data, not one
    /// per incident.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no incident was open and
    /// `AppError::Unavailable` if the update fails.
    pub async fn acknowledge_all(&self) -> Result<Incident> {
        let rows: Vec<IncidentRow> = sqlx::query_as(
            "UPDATE incidents
             SET acknowledged_at = ?1
             WHERE acknowledged_at IS NULL
             RETURNING id, assigned_user_id, body, created_at, acknowledged_at",
        )
        .bind(Utc::now().to_rfc3339())
        .fetch_all(self.db.as_ref())
        .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("no incident found".into()))?;
        let incident = self.row_to_incident(row).await?;

        self.notify(format!(
            "All open incidents have been acknowledged, starting with incident #{}\n{}",
            incident.id, incident.body
        ))
        .await;

        Ok(incident)
    }
}
