//! Assignment and progress timestamps that only ever move forward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle timestamps of a task.
///
/// Every setter is monotonic: a stamp is never cleared and never moved to an
/// earlier instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStamps {
    assigned_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    is_completed: bool,
}

/// Parameter object for reconstructing persisted lifecycle stamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedLifecycle {
    /// Instant the current assignee was assigned.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Instant work first started.
    pub started_at: Option<DateTime<Utc>>,
    /// Instant the latest report was submitted.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Instant the task was approved as complete.
    pub completed_at: Option<DateTime<Utc>>,
    /// Stored completion flag.
    pub is_completed: bool,
}

impl LifecycleStamps {
    /// Reconstructs stamps from storage.
    ///
    /// A stored completion instant always implies completion, whatever the
    /// stored flag says.
    #[must_use]
    pub fn from_persisted(data: PersistedLifecycle) -> Self {
        Self {
            is_completed: data.is_completed || data.completed_at.is_some(),
            assigned_at: data.assigned_at,
            started_at: data.started_at,
            submitted_at: data.submitted_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns when the current assignee was assigned.
    #[must_use]
    pub const fn assigned_at(&self) -> Option<DateTime<Utc>> {
        self.assigned_at
    }

    /// Returns when work first started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the latest report was submitted.
    #[must_use]
    pub const fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Returns when the task was approved as complete.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whether the task is complete.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Stamps `assigned_at` unless it is already set.
    pub(crate) fn record_assignment(&mut self, now: DateTime<Utc>) -> bool {
        set_once(&mut self.assigned_at, now)
    }

    /// Moves `assigned_at` forward to `now` for a change of assignee.
    pub(crate) fn record_reassignment(&mut self, now: DateTime<Utc>) -> bool {
        advance(&mut self.assigned_at, now)
    }

    /// Stamps `started_at` unless work has started before.
    pub(crate) fn record_work_started(&mut self, now: DateTime<Utc>) -> bool {
        set_once(&mut self.started_at, now)
    }

    /// Moves `submitted_at` forward to `now`.
    pub(crate) fn record_submission(&mut self, now: DateTime<Utc>) -> bool {
        advance(&mut self.submitted_at, now)
    }

    /// Marks the task complete unless it already carries a completion stamp.
    pub(crate) fn record_completion(&mut self, now: DateTime<Utc>) -> bool {
        let stamped = set_once(&mut self.completed_at, now);
        self.is_completed = true;
        stamped
    }
}

fn set_once(slot: &mut Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(now);
    true
}

fn advance(slot: &mut Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match *slot {
        Some(existing) if existing >= now => false,
        _ => {
            *slot = Some(now);
            true
        }
    }
}
