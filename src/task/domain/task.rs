//! Task aggregate root with placement, timer, and lifecycle behaviour.

use super::{
    ColumnId, LifecycleStamps, PersistedLifecycle, Position, PriorityId, RoleId, Subtask, TagId,
    TaskDomainError, TaskId, TimerStart, TimerState, TimerStatus, TimerStop, Title, UserId,
    WorkDuration,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum length of an image reference.
pub const MAX_IMAGE_REFERENCE_LENGTH: usize = 255;

/// Checks an image reference against [`MAX_IMAGE_REFERENCE_LENGTH`].
///
/// # Errors
///
/// Returns [`TaskDomainError::ImageReferenceTooLong`] when the reference is
/// longer than the limit.
pub fn image_reference(value: String) -> Result<String, TaskDomainError> {
    let length = value.chars().count();
    if length > MAX_IMAGE_REFERENCE_LENGTH {
        return Err(TaskDomainError::ImageReferenceTooLong {
            max: MAX_IMAGE_REFERENCE_LENGTH,
            length,
        });
    }
    Ok(value)
}

/// Descriptive task fields owned by the generic update command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    /// Task title.
    pub title: Title,
    /// Free-form description.
    pub description: Option<String>,
    /// Reference to an attached image held by file storage.
    pub image: Option<String>,
    /// User currently responsible for the task.
    pub assignee: Option<UserId>,
    /// Project role the task is meant for.
    pub role_id: Option<RoleId>,
    /// Priority level.
    pub priority_id: Option<PriorityId>,
    /// Date the task is due.
    pub due_date: Option<NaiveDate>,
    /// Attached tags.
    pub tags: BTreeSet<TagId>,
}

impl TaskDetails {
    /// Creates details with only a title set.
    #[must_use]
    pub const fn new(title: Title) -> Self {
        Self {
            title,
            description: None,
            image: None,
            assignee: None,
            role_id: None,
            priority_id: None,
            due_date: None,
            tags: BTreeSet::new(),
        }
    }
}

/// Partial update of [`TaskDetails`].
///
/// `None` leaves a field untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Replacement title.
    pub title: Option<Title>,
    /// Replacement description.
    pub description: Option<Option<String>>,
    /// Replacement image reference.
    pub image: Option<Option<String>>,
    /// Replacement assignee.
    pub assignee: Option<Option<UserId>>,
    /// Replacement role.
    pub role_id: Option<Option<RoleId>>,
    /// Replacement priority.
    pub priority_id: Option<Option<PriorityId>>,
    /// Replacement due date.
    pub due_date: Option<Option<NaiveDate>>,
    /// Replacement tag set.
    pub tags: Option<BTreeSet<TagId>>,
}

/// Unsaved task awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Column the task is placed in.
    pub column_id: Option<ColumnId>,
    /// Position within the column.
    pub position: Position,
    /// Descriptive fields.
    pub details: TaskDetails,
    /// Lifecycle stamps at creation.
    pub lifecycle: LifecycleStamps,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Prepares a task for insertion at the given place.
    ///
    /// A task created with an assignee is stamped as assigned at creation.
    #[must_use]
    pub fn new(
        column_id: Option<ColumnId>,
        position: Position,
        details: TaskDetails,
        clock: &impl Clock,
    ) -> Self {
        let created_at = clock.utc();
        let mut lifecycle = LifecycleStamps::default();
        if details.assignee.is_some() {
            lifecycle.record_assignment(created_at);
        }
        Self {
            column_id,
            position,
            details,
            lifecycle,
            created_at,
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    column_id: Option<ColumnId>,
    position: Position,
    details: TaskDetails,
    lifecycle: LifecycleStamps,
    time: WorkDuration,
    timer_started_at: Option<DateTime<Utc>>,
    is_timer_running: bool,
    subtasks: Vec<Subtask>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning column, if any.
    pub column_id: Option<ColumnId>,
    /// Position within the column.
    pub position: Position,
    /// Descriptive fields.
    pub details: TaskDetails,
    /// Lifecycle stamps.
    pub lifecycle: PersistedLifecycle,
    /// Accumulated work duration.
    pub time: WorkDuration,
    /// Start of the open timer session.
    pub timer_started_at: Option<DateTime<Utc>>,
    /// Stored running flag.
    pub is_timer_running: bool,
    /// Owned subtasks.
    pub subtasks: Vec<Subtask>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materialises a newly inserted task under its allocated identifier.
    #[must_use]
    pub fn from_new(id: TaskId, new_task: NewTask) -> Self {
        Self {
            id,
            column_id: new_task.column_id,
            position: new_task.position,
            details: new_task.details,
            lifecycle: new_task.lifecycle,
            time: WorkDuration::ZERO,
            timer_started_at: None,
            is_timer_running: false,
            subtasks: Vec::new(),
            created_at: new_task.created_at,
            updated_at: new_task.created_at,
        }
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// Timer fields are kept as stored; inconsistencies surface when a timer
    /// command inspects them.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        let mut subtasks = data.subtasks;
        subtasks.sort_by_key(|subtask| (subtask.position(), subtask.id()));
        Self {
            id: data.id,
            column_id: data.column_id,
            position: data.position,
            details: data.details,
            lifecycle: LifecycleStamps::from_persisted(data.lifecycle),
            time: data.time,
            timer_started_at: data.timer_started_at,
            is_timer_running: data.is_timer_running,
            subtasks,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning column, if any.
    #[must_use]
    pub const fn column_id(&self) -> Option<ColumnId> {
        self.column_id
    }

    /// Returns the position within the owning column.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.details.title
    }

    /// Returns the current assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.details.assignee
    }

    /// Returns the lifecycle stamps.
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecycleStamps {
        &self.lifecycle
    }

    /// Returns the accumulated work duration, excluding any open session.
    #[must_use]
    pub const fn time(&self) -> WorkDuration {
        self.time
    }

    /// Returns the stored start of the open timer session.
    #[must_use]
    pub const fn timer_started_at(&self) -> Option<DateTime<Utc>> {
        self.timer_started_at
    }

    /// Returns the stored running flag.
    #[must_use]
    pub const fn is_timer_running(&self) -> bool {
        self.is_timer_running
    }

    /// Returns the owned subtasks ordered by position.
    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the validated timer state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TimerStateInconsistent`] when the running
    /// flag and the stored session start disagree.
    pub fn timer_state(&self) -> Result<TimerState, TaskDomainError> {
        match (self.is_timer_running, self.timer_started_at) {
            (true, Some(since)) => Ok(TimerState::Running { since }),
            (false, None) => Ok(TimerState::Idle),
            (running, started_at) => Err(TaskDomainError::TimerStateInconsistent {
                task_id: self.id,
                running,
                has_start: started_at.is_some(),
            }),
        }
    }

    /// Places the task in a column at an explicit position.
    ///
    /// Siblings are not renumbered.
    pub fn place(&mut self, column_id: ColumnId, position: Position, clock: &impl Clock) {
        self.column_id = Some(column_id);
        self.position = position;
        self.touch(clock);
    }

    /// Sets the position as part of a bulk reorder.
    pub(crate) fn reposition(&mut self, position: Position, now: DateTime<Utc>) {
        self.position = position;
        self.updated_at = now;
    }

    /// Opens a timer session for `actor`.
    ///
    /// Starting an already-running timer changes nothing. The first start
    /// ever recorded on the task also stamps `started_at`, assigns the task
    /// to `actor`, and moves `assigned_at` forward to the start.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TimerStateInconsistent`] when the stored
    /// timer fields disagree.
    pub fn start_timer(
        &mut self,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<TimerStart, TaskDomainError> {
        if let TimerState::Running { since } = self.timer_state()? {
            return Ok(TimerStart {
                status: TimerStatus::AlreadyRunning,
                started_at: since,
                total_time: self.time,
                first_start: false,
            });
        }

        let now = clock.utc();
        let first_start = self.lifecycle.record_work_started(now);
        if first_start {
            self.assign_for_work(actor, now);
        }
        self.timer_started_at = Some(now);
        self.is_timer_running = true;
        self.updated_at = now;

        Ok(TimerStart {
            status: TimerStatus::Started,
            started_at: now,
            total_time: self.time,
            first_start,
        })
    }

    /// Closes the open timer session and accrues its whole seconds.
    ///
    /// Stopping an idle timer changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TimerStateInconsistent`] when the stored
    /// timer fields disagree, or [`TaskDomainError::DurationOverflow`] when
    /// the total cannot hold the session.
    pub fn stop_timer(&mut self, clock: &impl Clock) -> Result<TimerStop, TaskDomainError> {
        self.stop_timer_at(clock.utc())
    }

    /// Closes the open timer session at `now`.
    ///
    /// A session whose start lies after `now` accrues nothing.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Task::stop_timer`].
    pub fn stop_timer_at(&mut self, now: DateTime<Utc>) -> Result<TimerStop, TaskDomainError> {
        let TimerState::Running { since } = self.timer_state()? else {
            return Ok(TimerStop {
                status: TimerStatus::NotRunning,
                elapsed: WorkDuration::ZERO,
                total_time: self.time,
            });
        };

        let elapsed = WorkDuration::between(since, now);
        let total_time = self.time.checked_add(elapsed)?;
        self.time = total_time;
        self.timer_started_at = None;
        self.is_timer_running = false;
        self.updated_at = now;

        Ok(TimerStop {
            status: TimerStatus::Stopped,
            elapsed,
            total_time,
        })
    }

    /// Applies a generic field update.
    ///
    /// Returns `true` when the update assigned a previously unassigned task
    /// and stamped `assigned_at`.
    pub fn apply_update(&mut self, update: TaskUpdate, clock: &impl Clock) -> bool {
        let now = clock.utc();
        let was_unassigned = self.details.assignee.is_none();
        let TaskUpdate {
            title,
            description,
            image,
            assignee,
            role_id,
            priority_id,
            due_date,
            tags,
        } = update;

        if let Some(value) = title {
            self.details.title = value;
        }
        if let Some(value) = description {
            self.details.description = value;
        }
        if let Some(value) = image {
            self.details.image = value;
        }
        if let Some(value) = assignee {
            self.details.assignee = value;
        }
        if let Some(value) = role_id {
            self.details.role_id = value;
        }
        if let Some(value) = priority_id {
            self.details.priority_id = value;
        }
        if let Some(value) = due_date {
            self.details.due_date = value;
        }
        if let Some(value) = tags {
            self.details.tags = value;
        }
        self.updated_at = now;

        was_unassigned
            && self.details.assignee.is_some()
            && self.lifecycle.record_assignment(now)
    }

    /// Records a report submission. Returns `true` when `submitted_at` moved.
    pub fn record_report_submission(&mut self, clock: &impl Clock) -> bool {
        let now = clock.utc();
        let changed = self.lifecycle.record_submission(now);
        if changed {
            self.updated_at = now;
        }
        changed
    }

    /// Records an approving comment. Returns `true` when the task became
    /// complete with this call.
    pub fn record_comment_approval(&mut self, clock: &impl Clock) -> bool {
        let now = clock.utc();
        let was_completed = self.lifecycle.is_completed();
        let stamped = self.lifecycle.record_completion(now);
        let changed = stamped || !was_completed;
        if changed {
            self.updated_at = now;
        }
        changed
    }

    pub(crate) fn attach_subtasks(&mut self, mut subtasks: Vec<Subtask>) {
        subtasks.sort_by_key(|subtask| (subtask.position(), subtask.id()));
        self.subtasks = subtasks;
    }

    fn assign_for_work(&mut self, actor: UserId, now: DateTime<Utc>) {
        self.details.assignee = Some(actor);
        self.lifecycle.record_reassignment(now);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
