//! Service-level errors and their machine-readable classification.

use crate::task::{
    domain::{ColumnId, SubtaskId, TaskDomainError, TaskId},
    ports::TaskStoreError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Service-level errors for task board commands.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The subtask does not exist under the given task.
    #[error("subtask {subtask_id} not found under task {task_id}")]
    SubtaskNotFound {
        /// Parent task named by the request.
        task_id: TaskId,
        /// Subtask named by the request.
        subtask_id: SubtaskId,
    },

    /// A required request field was omitted.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Domain validation or an invariant check failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for task board service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Machine-readable failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced task, column, or subtask does not exist. Retry after
    /// correcting the input.
    NotFound,
    /// The request is malformed. Retry after correcting the input.
    InvalidArgument,
    /// The command lost a race with a concurrent writer. Retry unchanged.
    Conflict,
    /// Storage failed or stored state broke an invariant. Nothing was
    /// written; retry unchanged.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }

    /// Returns the HTTP status an API boundary should answer with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InvalidArgument => 400,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }
}

/// Structured error payload for API boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Failure class.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl TaskServiceError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TaskNotFound(_) | Self::ColumnNotFound(_) | Self::SubtaskNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::MissingField(_) => ErrorKind::InvalidArgument,
            Self::Domain(err) => domain_kind(err),
            Self::Store(TaskStoreError::Conflict(_)) => ErrorKind::Conflict,
            Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Builds the structured payload for this error.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

const fn domain_kind(err: &TaskDomainError) -> ErrorKind {
    match err {
        TaskDomainError::TimerStateInconsistent { .. } | TaskDomainError::DurationOverflow { .. } => {
            ErrorKind::Internal
        }
        TaskDomainError::EmptyTitle
        | TaskDomainError::TitleTooLong { .. }
        | TaskDomainError::ImageReferenceTooLong { .. }
        | TaskDomainError::NegativePosition(_)
        | TaskDomainError::PositionOutOfRange(_)
        | TaskDomainError::EmptyReorder
        | TaskDomainError::DuplicateReorderEntry(_)
        | TaskDomainError::ForeignTaskInReorder(_)
        | TaskDomainError::IncompleteReorder { .. }
        | TaskDomainError::InvalidDuration(_) => ErrorKind::InvalidArgument,
    }
}
