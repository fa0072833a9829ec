//! Error types for task domain validation and invariant checks.

use super::{TaskId, WorkDuration};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// A title is empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// A title exceeds the storage limit.
    #[error("title exceeds {max} characters: {length}")]
    TitleTooLong {
        /// Maximum permitted length in characters.
        max: usize,
        /// Actual length in characters.
        length: usize,
    },

    /// An image reference exceeds the storage limit.
    #[error("image reference exceeds {max} characters: {length}")]
    ImageReferenceTooLong {
        /// Maximum permitted length in characters.
        max: usize,
        /// Actual length in characters.
        length: usize,
    },

    /// A position value is below zero.
    #[error("position must not be negative, got {0}")]
    NegativePosition(i64),

    /// A position value does not fit the persisted integer range.
    #[error("position {0} exceeds the supported range")]
    PositionOutOfRange(i64),

    /// A bulk reorder request carried no task identifiers.
    #[error("task order must contain at least one task")]
    EmptyReorder,

    /// A bulk reorder request listed the same task more than once.
    #[error("task {0} appears more than once in the requested order")]
    DuplicateReorderEntry(TaskId),

    /// A bulk reorder request referenced a task outside the column.
    #[error("task {0} does not belong to the reordered column")]
    ForeignTaskInReorder(TaskId),

    /// A bulk reorder request omitted tasks that belong to the column.
    #[error("requested order covers {requested} of {expected} tasks in the column")]
    IncompleteReorder {
        /// Number of column tasks named by the request.
        requested: usize,
        /// Number of tasks currently in the column.
        expected: usize,
    },

    /// The persisted timer fields disagree with each other.
    #[error(
        "timer state of task {task_id} is inconsistent: running={running}, started_at set={has_start}"
    )]
    TimerStateInconsistent {
        /// Task whose timer fields are inconsistent.
        task_id: TaskId,
        /// Stored running flag.
        running: bool,
        /// Whether a session start instant is stored.
        has_start: bool,
    },

    /// Accruing a session would overflow the stored duration.
    #[error("adding {elapsed} to {total} overflows the work duration")]
    DurationOverflow {
        /// Previously accumulated duration.
        total: WorkDuration,
        /// Session duration that could not be added.
        elapsed: WorkDuration,
    },

    /// A textual duration is not in `HH:MM:SS` form.
    #[error("invalid work duration '{0}', expected HH:MM:SS")]
    InvalidDuration(String),
}
