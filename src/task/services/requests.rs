//! Request payloads accepted by the task board service.
//!
//! Requests carry raw caller input; the service validates it before opening
//! a transaction.

use crate::task::domain::{
    ColumnId, Position, PriorityId, RoleId, SubtaskUpdate, TagId, TaskDetails, TaskDomainError,
    TaskUpdate, Title, UserId, image_reference,
};
use super::{TaskServiceError, TaskServiceResult};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Request payload for creating a task at the end of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendTaskRequest {
    title: String,
    description: Option<String>,
    image: Option<String>,
    assignee: Option<UserId>,
    role_id: Option<RoleId>,
    priority_id: Option<PriorityId>,
    due_date: Option<NaiveDate>,
    tags: BTreeSet<TagId>,
}

impl AppendTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            image: None,
            assignee: None,
            role_id: None,
            priority_id: None,
            due_date: None,
            tags: BTreeSet::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the target role.
    #[must_use]
    pub const fn with_role(mut self, role_id: RoleId) -> Self {
        self.role_id = Some(role_id);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority_id: PriorityId) -> Self {
        self.priority_id = Some(priority_id);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub(super) fn into_details(self) -> Result<TaskDetails, TaskDomainError> {
        Ok(TaskDetails {
            title: Title::new(self.title)?,
            description: self.description,
            image: self.image.map(image_reference).transpose()?,
            assignee: self.assignee,
            role_id: self.role_id,
            priority_id: self.priority_id,
            due_date: self.due_date,
            tags: self.tags,
        })
    }
}

/// Request payload for moving a task to a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveTaskRequest {
    column_id: Option<ColumnId>,
    order: Option<i64>,
}

impl MoveTaskRequest {
    /// Creates a request targeting `column_id`, appending at its end.
    #[must_use]
    pub const fn new(column_id: ColumnId) -> Self {
        Self {
            column_id: Some(column_id),
            order: None,
        }
    }

    /// Creates a request without a destination, as sent by callers that
    /// omit it.
    #[must_use]
    pub const fn without_column() -> Self {
        Self {
            column_id: None,
            order: None,
        }
    }

    /// Requests an explicit position in the destination column.
    #[must_use]
    pub const fn at_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub(super) fn validate(self) -> TaskServiceResult<(ColumnId, Option<Position>)> {
        let column_id = self
            .column_id
            .ok_or(TaskServiceError::MissingField("column_id"))?;
        let order = self.order.map(Position::new).transpose()?;
        Ok((column_id, order))
    }
}

/// Request payload for the generic task update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<Option<String>>,
    image: Option<Option<String>>,
    assignee: Option<Option<UserId>>,
    role_id: Option<Option<RoleId>>,
    priority_id: Option<Option<PriorityId>>,
    due_date: Option<Option<NaiveDate>>,
    tags: Option<BTreeSet<TagId>>,
}

impl UpdateTaskRequest {
    /// Creates an update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description; `None` clears it.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the image reference; `None` clears it.
    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = Some(image);
        self
    }

    /// Replaces the assignee; `None` unassigns the task.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Replaces the target role; `None` clears it.
    #[must_use]
    pub fn with_role(mut self, role_id: Option<RoleId>) -> Self {
        self.role_id = Some(role_id);
        self
    }

    /// Replaces the priority; `None` clears it.
    #[must_use]
    pub fn with_priority(mut self, priority_id: Option<PriorityId>) -> Self {
        self.priority_id = Some(priority_id);
        self
    }

    /// Replaces the due date; `None` clears it.
    #[must_use]
    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Replaces the tag set.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    pub(super) fn into_update(self) -> Result<TaskUpdate, TaskDomainError> {
        Ok(TaskUpdate {
            title: self.title.map(Title::new).transpose()?,
            description: self.description,
            image: self
                .image
                .map(|image| image.map(image_reference).transpose())
                .transpose()?,
            assignee: self.assignee,
            role_id: self.role_id,
            priority_id: self.priority_id,
            due_date: self.due_date,
            tags: self.tags,
        })
    }
}

/// Request payload for a partial subtask update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSubtaskRequest {
    title: Option<String>,
    is_completed: Option<bool>,
    order: Option<i64>,
}

impl UpdateSubtaskRequest {
    /// Creates an update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }

    /// Moves the subtask to a position within its task.
    #[must_use]
    pub const fn at_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub(super) fn into_update(self) -> Result<SubtaskUpdate, TaskDomainError> {
        Ok(SubtaskUpdate {
            title: self.title.map(Title::new).transpose()?,
            is_completed: self.is_completed,
            position: self.order.map(Position::new).transpose()?,
        })
    }
}
