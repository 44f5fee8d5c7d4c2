//! Unit tests for `IncidentStore` lifecycle transitions and
//! notifications.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use oncall_relay::models::schedule::TimeRange;
use oncall_relay::persistence::db;
use oncall_relay::persistence::incident_store::IncidentStore;
use oncall_relay::persistence::schedule_store::ScheduleStore;
use oncall_relay::persistence::user_store::UserStore;
use oncall_relay::slack::notifier::Notifier;
use oncall_relay::{AppError, Result};

/// Recording stub capturing every notification text in order.
#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.messages.lock().expect("lock").push(text);
            Ok(())
        })
    }
}

/// Stub whose every delivery fails with a transport error.
struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send(&self, _text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async { Err(AppError::Unavailable("notify slack: 500".into())) })
    }
}

struct Harness {
    users: UserStore,
    schedules: ScheduleStore,
    incidents: IncidentStore,
    notifier: Arc<RecordingNotifier>,
}

async fn harness() -> Harness {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let users = UserStore::new(Arc::clone(&database));
    let schedules = ScheduleStore::new(Arc::clone(&database), users.clone());
    let notifier = Arc::new(RecordingNotifier::default());
    let incidents = IncidentStore::new(
        database,
        users.clone(),
        schedules.clone(),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    Harness {
        users,
        schedules,
        incidents,
        notifier,
    }
}

/// Put `user` on call starting almost immediately, then wait for the
/// window to open.
async fn put_on_call(h: &Harness, user_id: i64) {
    let start = chrono::Utc::now() + chrono::Duration::milliseconds(200);
    h.schedules
        .create(
            user_id,
            TimeRange {
                start,
                end: start + chrono::Duration::minutes(5),
            },
        )
        .await
        .expect("create schedule");
    tokio::time::sleep(Duration::from_millis(300)).await;
}

// ─── Creation ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_without_coverage_is_unassigned() {
    let h = harness().await;

    let incident = h.incidents.create("db-1 is down").await.expect("create");

    assert_eq!(incident.body, "db-1 is down");
    assert!(incident.assignee.is_none());
    assert!(!incident.acknowledged());

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("created and unassigned"), "got {}", sent[0]);
}

#[tokio::test]
async fn create_with_active_coverage_assigns_on_call_user() {
    let h = harness().await;
    let user = h.users.register("Bilawal", "Hameed", "bil").await.expect("user");
    put_on_call(&h, user.id).await;

    let incident = h.incidents.create("db-1 is down").await.expect("create");

    assert_eq!(incident.assignee.as_ref(), Some(&user));
    assert!(!incident.acknowledged());

    let sent = h.notifier.sent();
    let last = sent.last().expect("one notification");
    assert!(last.contains("created and assigned to"), "got {last}");
    assert!(last.contains("Bilawal Hameed <@bil>"), "got {last}");
}

#[tokio::test]
async fn create_succeeds_when_notification_fails() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let users = UserStore::new(Arc::clone(&database));
    let schedules = ScheduleStore::new(Arc::clone(&database), users.clone());
    let incidents = IncidentStore::new(
        database,
        users.clone(),
        schedules,
        Arc::new(FailingNotifier),
    );

    let incident = incidents.create("db-1 is down").await.expect("create");
    assert!(incident.assignee.is_none());

    let open = incidents.list_open().await.expect("list");
    assert_eq!(open, vec![incident]);
}

// ─── Assignment ──────────────────────────────────────────────────────

#[tokio::test]
async fn assign_sets_assignee_on_open_incident() {
    let h = harness().await;
    let user = h.users.register("Bilawal", "Hameed", "bil").await.expect("user");

    let incident = h.incidents.create("db-1 is down").await.expect("create");
    let assigned = h.incidents.assign(incident.id, user.id).await.expect("assign");

    assert_eq!(assigned.assignee.as_ref(), Some(&user));

    let open = h.incidents.list_open().await.expect("list");
    assert_eq!(open, vec![assigned]);

    let sent = h.notifier.sent();
    let last = sent.last().expect("notification");
    assert!(last.contains("is re-assigned to"), "got {last}");
    assert!(last.contains("Bilawal Hameed <@bil>"), "got {last}");
}

#[tokio::test]
async fn reassign_overwrites_assignee() {
    let h = harness().await;
    let first = h.users.register("Bilawal", "Hameed", "bil").await.expect("user");
    let second = h.users.register("Grace", "Hopper", "grace").await.expect("user");

    let incident = h.incidents.create("db-1 is down").await.expect("create");
    h.incidents.assign(incident.id, first.id).await.expect("assign");
    let reassigned = h.incidents.assign(incident.id, second.id).await.expect("reassign");

    assert_eq!(reassigned.assignee.as_ref(), Some(&second));
}

#[tokio::test]
async fn assign_missing_incident_is_not_found() {
    let h = harness().await;
    let user = h.users.register("Bilawal", "Hameed", "bil").await.expect("user");

    let err = h.incidents.assign(404, user.id).await.expect_err("missing");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn assign_acknowledged_incident_is_not_found() {
    let h = harness().await;
    let user = h.users.register("Bilawal", "Hameed", "bil").await.expect("user");

    let incident = h.incidents.create("db-1 is down").await.expect("create");
    h.incidents.acknowledge(incident.id).await.expect("acknowledge");

    let err = h
        .incidents
        .assign(incident.id, user.id)
        .await
        .expect_err("terminal state");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

// ─── Acknowledgment ──────────────────────────────────────────────────

#[tokio::test]
async fn acknowledge_sets_timestamp_once() {
    let h = harness().await;

    let incident = h.incidents.create("db-1 is down").await.expect("create");
    let acknowledged = h.incidents.acknowledge(incident.id).await.expect("acknowledge");

    assert!(acknowledged.acknowledged());
    assert!(acknowledged.acknowledged_at.is_some());

    let err = h
        .incidents
        .acknowledge(incident.id)
        .await
        .expect_err("second acknowledge");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn acknowledge_unassigned_incident_uses_placeholder() {
    let h = harness().await;

    let incident = h.incidents.create("db-1 is down").await.expect("create");
    h.incidents.acknowledge(incident.id).await.expect("acknowledge");

    let sent = h.notifier.sent();
    let last = sent.last().expect("notification");
    assert!(last.contains("has been acknowledged"), "got {last}");
    assert!(last.contains("Unassigned"), "got {last}");
}

#[tokio::test]
async fn list_open_excludes_acknowledged_incidents() {
    let h = harness().await;

    let keep = h.incidents.create("db-1 is down").await.expect("create");
    let done = h.incidents.create("cache warm-up slow").await.expect("create");
    h.incidents.acknowledge(done.id).await.expect("acknowledge");

    let open = h.incidents.list_open().await.expect("list");
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, keep.id);
    assert!(open.iter().all(|incident| !incident.acknowledged()));
}

// ─── Batch acknowledgment ────────────────────────────────────────────

#[tokio::test]
async fn acknowledge_all_clears_every_open_incident() {
    let h = harness().await;

    let first = h.incidents.create("db-1 is down").await.expect("create");
    h.incidents.create("cache warm-up slow").await.expect("create");
    h.incidents.create("disk filling up").await.expect("create");

    let representative = h.incidents.acknowledge_all().await.expect("acknowledge all");
    assert_eq!(representative.id, first.id);
    assert!(representative.acknowledged());

    let open = h.incidents.list_open().await.expect("list");
    assert!(open.is_empty());

    // Three creation notifications plus exactly one batch notification.
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 4);
    let last = sent.last().expect("batch notification");
    assert!(last.contains("All open incidents"), "got {last}");
    assert!(last.contains(&format!("#{}", first.id)), "got {last}");
}

#[tokio::test]
async fn acknowledge_all_with_nothing_open_is_not_found() {
    let h = harness().await;

    let err = h.incidents.acknowledge_all().await.expect_err("nothing open");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}
