//! User record owned by the directory.

use serde::{Deserialize, Serialize};

/// A member of the operations team.
///
/// Users are owned by the directory; schedules and incidents hold a user
/// id as a foreign reference and resolve it at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct User {
    /// Store-assigned identifier.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Slack handle used in notification mentions.
    pub slack_handle: String,
}

impl User {
    /// Notification mention: full name followed by the Slack handle.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("{} {} <@{}>", self.first_name, self.last_name, self.slack_handle)
    }

    /// Reminder-line label: full name with the Slack handle in parentheses.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {} (<@{}>)", self.first_name, self.last_name, self.slack_handle)
    }
}
