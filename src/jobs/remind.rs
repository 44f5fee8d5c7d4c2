//! Remind-unacknowledged reconciliation job.
//!
//! Periodically posts one aggregate reminder listing every open
//! incident. Pure read + notify — the job never mutates state, so
//! repeated or overlapping runs are always safe.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::persistence::incident_store::IncidentStore;
use crate::slack::notifier::Notifier;
use crate::Result;

/// Run one reminder pass.
///
/// Does nothing when no incident is open; otherwise composes a single
/// message with one line per open incident and its assignee (or
/// `Unassigned`) and sends exactly one notification. Delivery failure is
/// logged and swallowed.
///
/// # Errors
///
/// Returns `AppError::Unavailable` if listing open incidents fails.
pub async fn run_remind_once(incidents: &IncidentStore, notifier: &dyn Notifier) -> Result<()> {
    let open = incidents.list_open().await?;
    if open.is_empty() {
        return Ok(());
    }

    let mut lines = vec![
        "These incidents have not been acknowledged yet. Please acknowledge them \
         otherwise you will be reminded every 10 minutes:"
            .to_owned(),
    ];
    for incident in &open {
        lines.push(format!(
            "[{}] [#{}] {}",
            incident.assignee_label(),
            incident.id,
            incident.body
        ));
    }

    if let Err(err) = notifier.send(lines.join("\n")).await {
        warn!(%err, "reminder notification failed");
    }

    Ok(())
}

/// Spawn the remind-unacknowledged background task ticking every
/// `period`.
#[must_use]
pub fn spawn_remind_task(
    incidents: IncidentStore,
    notifier: Arc<dyn Notifier>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("remind-unacknowledged job shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(err) = run_remind_once(&incidents, notifier.as_ref()).await {
                        error!(%err, "remind-unacknowledged run failed");
                    }
                }
            }
        }
    })
}
