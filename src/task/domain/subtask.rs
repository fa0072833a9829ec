//! Checklist items owned by a single task.

use super::{Position, SubtaskId, TaskId, Title};
use serde::{Deserialize, Serialize};

/// Subtask entity, exclusively owned by its parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    task_id: TaskId,
    title: Title,
    is_completed: bool,
    position: Position,
}

/// Unsaved subtask awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubtask {
    /// Parent task.
    pub task_id: TaskId,
    /// Subtask title.
    pub title: Title,
    /// Position within the parent task.
    pub position: Position,
}

/// Partial update of a subtask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtaskUpdate {
    /// Replacement title.
    pub title: Option<Title>,
    /// Replacement completion flag.
    pub is_completed: Option<bool>,
    /// Replacement position.
    pub position: Option<Position>,
}

impl SubtaskUpdate {
    /// Returns `true` when the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_completed.is_none() && self.position.is_none()
    }
}

impl Subtask {
    /// Reconstructs a subtask from storage.
    #[must_use]
    pub const fn from_persisted(
        id: SubtaskId,
        task_id: TaskId,
        title: Title,
        is_completed: bool,
        position: Position,
    ) -> Self {
        Self {
            id,
            task_id,
            title,
            is_completed,
            position,
        }
    }

    /// Materialises a newly inserted subtask under its allocated identifier.
    #[must_use]
    pub fn from_new(id: SubtaskId, new_subtask: NewSubtask) -> Self {
        Self::from_persisted(
            id,
            new_subtask.task_id,
            new_subtask.title,
            false,
            new_subtask.position,
        )
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> SubtaskId {
        self.id
    }

    /// Returns the parent task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns whether the subtask is done.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Returns the position within the parent task.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Applies a partial update.
    pub fn apply(&mut self, update: SubtaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(is_completed) = update.is_completed {
            self.is_completed = is_completed;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
    }
}
