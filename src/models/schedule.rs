//! On-call coverage window model and time-range validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

use super::user::User;

/// A pair of UTC instants delimiting an on-call window or a query range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimeRange {
    /// Inclusive window start.
    pub start: DateTime<Utc>,
    /// Inclusive window end.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Reject empty and inverted ranges.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if `start` equals or exceeds
    /// `end`.
    pub fn validate(&self) -> Result<()> {
        if self.start == self.end {
            return Err(AppError::InvalidArgument(
                "start timestamp cannot be equal to end timestamp".into(),
            ));
        }
        if self.start > self.end {
            return Err(AppError::InvalidArgument(
                "start timestamp cannot be greater than end timestamp".into(),
            ));
        }
        Ok(())
    }

    /// Whether `instant` falls within the window, both ends inclusive.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// An on-call coverage window owned by a single user.
///
/// Windows are never mutated in place; a correction is delete + recreate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Schedule {
    /// Store-assigned identifier.
    pub id: i64,
    /// The user on call during the window, resolved at read time.
    pub user: User,
    /// The coverage window, UTC.
    pub time: TimeRange,
}
