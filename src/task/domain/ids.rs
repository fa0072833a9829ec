//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw storage identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw storage identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

integer_id!(
    /// Unique identifier for a task record.
    TaskId
);
integer_id!(
    /// Unique identifier for a subtask record.
    SubtaskId
);
integer_id!(
    /// Identifier of a board column owned by the column collaborator.
    ColumnId
);
integer_id!(
    /// Identifier of a user owned by the identity collaborator.
    UserId
);
integer_id!(
    /// Identifier of a project role.
    RoleId
);
integer_id!(
    /// Identifier of a priority level.
    PriorityId
);
integer_id!(
    /// Identifier of a tag.
    TagId
);

/// Zero-based position of a task within its column, or of a subtask within
/// its task.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Position(i32);

impl Position {
    /// The first slot of an ordered sequence.
    pub const FIRST: Self = Self(0);

    /// Creates a validated position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NegativePosition`] for values below zero and
    /// [`TaskDomainError::PositionOutOfRange`] for values beyond `i32::MAX`.
    pub fn new(value: i64) -> Result<Self, TaskDomainError> {
        if value < 0 {
            return Err(TaskDomainError::NegativePosition(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| TaskDomainError::PositionOutOfRange(value))
    }

    /// Creates a position from a list index.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PositionOutOfRange`] when the index does not
    /// fit the persisted integer range.
    pub fn from_index(index: usize) -> Result<Self, TaskDomainError> {
        i32::try_from(index).map(Self).map_err(|_| {
            TaskDomainError::PositionOutOfRange(i64::try_from(index).unwrap_or(i64::MAX))
        })
    }

    /// Returns the raw position value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns the slot directly after this one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PositionOutOfRange`] when the successor
    /// does not fit the persisted integer range.
    pub fn next(self) -> Result<Self, TaskDomainError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(TaskDomainError::PositionOutOfRange(i64::from(self.0) + 1))
    }

    /// Returns the slot after the greatest of `positions`, or
    /// [`Position::FIRST`] when `positions` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PositionOutOfRange`] when the successor of
    /// the greatest position overflows.
    pub fn after_last(positions: impl IntoIterator<Item = Self>) -> Result<Self, TaskDomainError> {
        positions
            .into_iter()
            .max()
            .map_or(Ok(Self::FIRST), Self::next)
    }
}

impl TryFrom<i32> for Position {
    type Error = TaskDomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum title length accepted for tasks and subtasks.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Validated, trimmed task or subtask title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the value is blank and
    /// [`TaskDomainError::TitleTooLong`] when it exceeds
    /// [`MAX_TITLE_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let length = trimmed.chars().count();
        if length > MAX_TITLE_LENGTH {
            return Err(TaskDomainError::TitleTooLong {
                max: MAX_TITLE_LENGTH,
                length,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
