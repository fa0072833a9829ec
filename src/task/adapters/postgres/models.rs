//! Diesel row models for task persistence.

use super::schema::{subtasks, task_tags, tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: i64,
    /// Owning column.
    pub column_id: Option<i64>,
    /// Position within the column.
    pub sort_order: i32,
    /// Task title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Image reference.
    pub image: Option<String>,
    /// Assigned user.
    pub assignee_id: Option<i64>,
    /// Target role.
    pub role_id: Option<i64>,
    /// Priority level.
    pub priority_id: Option<i64>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Assignment timestamp.
    pub assigned_at: Option<DateTime<Utc>>,
    /// First work timestamp.
    pub started_at: Option<DateTime<Utc>>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Completion flag.
    pub is_completed: bool,
    /// Accumulated work in seconds.
    pub work_seconds: i64,
    /// Open session start.
    pub timer_started_at: Option<DateTime<Utc>>,
    /// Timer running flag.
    pub is_timer_running: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Owning column.
    pub column_id: Option<i64>,
    /// Position within the column.
    pub sort_order: i32,
    /// Task title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Image reference.
    pub image: Option<String>,
    /// Assigned user.
    pub assignee_id: Option<i64>,
    /// Target role.
    pub role_id: Option<i64>,
    /// Priority level.
    pub priority_id: Option<i64>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Assignment timestamp.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Full-row update model; `None` writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Owning column.
    pub column_id: Option<i64>,
    /// Position within the column.
    pub sort_order: i32,
    /// Task title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Image reference.
    pub image: Option<String>,
    /// Assigned user.
    pub assignee_id: Option<i64>,
    /// Target role.
    pub role_id: Option<i64>,
    /// Priority level.
    pub priority_id: Option<i64>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Assignment timestamp.
    pub assigned_at: Option<DateTime<Utc>>,
    /// First work timestamp.
    pub started_at: Option<DateTime<Utc>>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Completion flag.
    pub is_completed: bool,
    /// Accumulated work in seconds.
    pub work_seconds: i64,
    /// Open session start.
    pub timer_started_at: Option<DateTime<Utc>>,
    /// Timer running flag.
    pub is_timer_running: bool,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Tag attachment row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskTagRow {
    /// Tagged task.
    pub task_id: i64,
    /// Attached tag.
    pub tag_id: i64,
}

/// Query result row for subtasks.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subtasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubtaskRow {
    /// Subtask identifier.
    pub id: i64,
    /// Parent task.
    pub task_id: i64,
    /// Title.
    pub title: String,
    /// Completion flag.
    pub is_completed: bool,
    /// Position within the parent task.
    pub sort_order: i32,
}

/// Insert model for subtasks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subtasks)]
pub struct NewSubtaskRow {
    /// Parent task.
    pub task_id: i64,
    /// Title.
    pub title: String,
    /// Completion flag.
    pub is_completed: bool,
    /// Position within the parent task.
    pub sort_order: i32,
}
