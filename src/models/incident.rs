//! Incident record and notification label helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// Placeholder named in notification text when no assignee is set.
const UNASSIGNED: &str = "Unassigned";

/// A reported problem requiring attention.
///
/// Lifecycle: created open (assigned or unassigned depending on who is on
/// call), reassignable while open, acknowledged exactly once. The
/// acknowledgment timestamp is append-only and incidents are never
/// deleted by this engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Incident {
    /// Store-assigned identifier.
    pub id: i64,
    /// Free-text description of the problem.
    pub body: String,
    /// Creation instant, set once by the store.
    pub created_at: DateTime<Utc>,
    /// Acknowledgment instant; never cleared once set.
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// Assignee resolved through the directory, when one is set.
    pub assignee: Option<User>,
}

impl Incident {
    /// Whether the incident has been acknowledged.
    #[must_use]
    pub fn acknowledged(&self) -> bool {
        self.acknowledged_at.is_some()
    }

    /// Assignee mention for notification text, or the explicit
    /// `Unassigned` placeholder.
    #[must_use]
    pub fn assignee_mention(&self) -> String {
        self.assignee
            .as_ref()
            .map_or_else(|| UNASSIGNED.to_owned(), User::mention)
    }

    /// Assignee label for reminder lines, or the explicit `Unassigned`
    /// placeholder.
    #[must_use]
    pub fn assignee_label(&self) -> String {
        self.assignee
            .as_ref()
            .map_or_else(|| UNASSIGNED.to_owned(), User::label)
    }
}
