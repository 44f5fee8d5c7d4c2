//! Unit tests for domain model validation and label helpers.

use chrono::{Duration, Utc};

use oncall_relay::models::incident::Incident;
use oncall_relay::models::schedule::TimeRange;
use oncall_relay::models::user::User;
use oncall_relay::AppError;

fn sample_user() -> User {
    User {
        id: 1,
        first_name: "Bilawal".into(),
        last_name: "Hameed".into(),
        slack_handle: "bil".into(),
    }
}

fn sample_incident(assignee: Option<User>) -> Incident {
    Incident {
        id: 7,
        body: "disk full on db-1".into(),
        created_at: Utc::now(),
        acknowledged_at: None,
        assignee,
    }
}

// ─── TimeRange validation ────────────────────────────────────────────

#[test]
fn validate_accepts_ordered_range() {
    let start = Utc::now();
    let range = TimeRange {
        start,
        end: start + Duration::hours(1),
    };
    assert!(range.validate().is_ok());
}

#[test]
fn validate_rejects_equal_start_and_end() {
    let start = Utc::now();
    let range = TimeRange { start, end: start };
    let err = range.validate().expect_err("equal range must be rejected");
    assert!(matches!(err, AppError::InvalidArgument(_)), "got {err}");
}

#[test]
fn validate_rejects_inverted_range() {
    let start = Utc::now();
    let range = TimeRange {
        start,
        end: start - Duration::seconds(1),
    };
    let err = range
        .validate()
        .expect_err("inverted range must be rejected");
    assert!(matches!(err, AppError::InvalidArgument(_)), "got {err}");
}

#[test]
fn contains_is_inclusive_at_both_ends() {
    let start = Utc::now();
    let range = TimeRange {
        start,
        end: start + Duration::hours(1),
    };

    assert!(range.contains(range.start));
    assert!(range.contains(range.end));
    assert!(range.contains(start + Duration::minutes(30)));
    assert!(!range.contains(start - Duration::seconds(1)));
    assert!(!range.contains(range.end + Duration::seconds(1)));
}

// ─── User label helpers ──────────────────────────────────────────────

#[test]
fn user_mention_format() {
    assert_eq!(sample_user().mention(), "Bilawal Hameed <@bil>");
}

#[test]
fn user_label_format() {
    assert_eq!(sample_user().label(), "Bilawal Hameed (<@bil>)");
}

// ─── Incident derived state ──────────────────────────────────────────

#[test]
fn acknowledged_is_derived_from_timestamp() {
    let mut incident = sample_incident(None);
    assert!(!incident.acknowledged());

    incident.acknowledged_at = Some(Utc::now());
    assert!(incident.acknowledged());
}

#[test]
fn assignee_mention_uses_placeholder_when_unassigned() {
    assert_eq!(sample_incident(None).assignee_mention(), "Unassigned");
    assert_eq!(
        sample_incident(Some(sample_user())).assignee_mention(),
        "Bilawal Hameed <@bil>"
    );
}

#[test]
fn assignee_label_uses_placeholder_when_unassigned() {
    assert_eq!(sample_incident(None).assignee_label(), "Unassigned");
    assert_eq!(
        sample_incident(Some(sample_user())).assignee_label(),
        "Bilawal Hameed (<@bil>)"
    );
}
