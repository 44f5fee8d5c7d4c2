//! Assign-unassigned reconciliation job.
//!
//! Periodically matches every unassigned open incident to the user
//! currently on call. When nobody is on call the run fails instead of
//! silently skipping, so a monitoring layer sees on-call gaps as job
//! failures.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::persistence::incident_store::IncidentStore;
use crate::persistence::schedule_store::ScheduleStore;
use crate::{AppError, Result};

/// Run one assignment pass, returning how many incidents were assigned.
///
/// A failure assigning any single incident aborts the remainder of the
/// run; the next scheduled run retries from scratch, which is safe
/// because re-assigning the same user is semantically a no-op.
///
/// # Errors
///
/// Returns `AppError::NotFound` when nobody is on call and propagates
/// the first store failure encountered.
pub async fn run_assign_once(
    schedules: &ScheduleStore,
    incidents: &IncidentStore,
) -> Result<u32> {
    let schedule = schedules
        .scheduled_now()
        .await?
        .ok_or_else(|| AppError::NotFound("no schedule found".into()))?;

    let open = incidents.list_open().await?;

    let mut assigned = 0u32;
    for incident in open {
        if incident.assignee.is_some() {
            continue;
        }

        match incidents.assign(incident.id, schedule.user.id).await {
            Ok(updated) => {
                info!(
                    incident_id = updated.id,
                    user_id = schedule.user.id,
                    "assigned unassigned incident"
                );
                assigned += 1;
            }
            Err(err) => {
                error!(
                    incident_id = incident.id,
                    user_id = schedule.user.id,
                    %err,
                    "failed to assign unassigned incident"
                );
                return Err(err);
            }
        }
    }

    Ok(assigned)
}

/// Spawn the assign-unassigned background task ticking every `period`.
///
/// Each tick failure is logged and the loop keeps running; there is no
/// retry between ticks.
#[must_use]
pub fn spawn_assign_task(
    schedules: ScheduleStore,
    incidents: IncidentStore,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("assign-unassigned job shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(err) = run_assign_once(&schedules, &incidents).await {
                        error!(%err, "assign-unassigned run failed");
                    }
                }
            }
        }
    })
}
