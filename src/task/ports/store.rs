//! Store port: scoped units of work over task and subtask rows.

use crate::task::domain::{
    ColumnId, ColumnOrdering, ColumnSlot, NewSubtask, NewTask, Subtask, SubtaskId, Task, TaskId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Transactional persistence contract for task aggregates.
///
/// A unit of work runs to completion against one [`TaskTransaction`]. It is
/// committed when `work` returns `Ok` and rolled back on `Err`, so readers
/// never observe a partially applied command.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Runs `work` inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`TaskStoreError`]
    /// converted into `E` when the transaction cannot begin or commit.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static;
}

/// Row-level operations available inside a unit of work.
///
/// `lock_*` methods hold their rows until the transaction ends. Two units of
/// work locking the same column or task are serialized.
pub trait TaskTransaction {
    /// Locks a column and the task rows it holds.
    ///
    /// Returns `None` when the column does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the lookup fails.
    fn lock_column(&mut self, column_id: ColumnId) -> TaskStoreResult<Option<ColumnOrdering>>;

    /// Locks only the column row and reads its task positions without
    /// locking the task rows.
    ///
    /// Appends and moves into one column queue behind each other while task
    /// rows stay free for commands that lock a single task.
    ///
    /// Returns `None` when the column does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the lookup fails.
    fn lock_column_row(&mut self, column_id: ColumnId)
    -> TaskStoreResult<Option<ColumnOrdering>>;

    /// Locks a task row and loads the aggregate with its subtasks.
    ///
    /// Returns `None` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the lookup fails.
    fn lock_task(&mut self, task_id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Loads a task aggregate without locking it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the lookup fails.
    fn find_task(&mut self, task_id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Loads every task in a column, ordered by position then identifier,
    /// without locking. Returns `None` when the column does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the lookup fails.
    fn load_column_tasks(&mut self, column_id: ColumnId) -> TaskStoreResult<Option<Vec<Task>>>;

    /// Inserts a task and returns it under its allocated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the insert fails.
    fn insert_task(&mut self, task: NewTask) -> TaskStoreResult<Task>;

    /// Persists every task field except subtasks, which have their own
    /// operations.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::MissingRow`] when the task no longer exists.
    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()>;

    /// Writes the positions of a bulk reorder and stamps each repositioned
    /// task with `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::MissingRow`] when a slot's task is no longer
    /// in `column_id`.
    fn assign_positions(
        &mut self,
        column_id: ColumnId,
        slots: &[ColumnSlot],
        updated_at: DateTime<Utc>,
    ) -> TaskStoreResult<()>;

    /// Locks a subtask row scoped to its parent task.
    ///
    /// Returns `None` when the subtask does not exist under `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the lookup fails.
    fn lock_subtask(
        &mut self,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> TaskStoreResult<Option<Subtask>>;

    /// Inserts a subtask and returns it under its allocated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the insert fails.
    fn insert_subtask(&mut self, subtask: NewSubtask) -> TaskStoreResult<Subtask>;

    /// Persists a subtask.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::MissingRow`] when the subtask no longer
    /// exists.
    fn save_subtask(&mut self, subtask: &Subtask) -> TaskStoreResult<()>;

    /// Deletes a subtask scoped to its parent task. Returns `false` when no
    /// such subtask existed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the delete fails.
    fn delete_subtask(&mut self, task_id: TaskId, subtask_id: SubtaskId) -> TaskStoreResult<bool>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A row expected inside the unit of work has disappeared.
    #[error("row disappeared during transaction: {0}")]
    MissingRow(String),

    /// The transaction lost a race with a concurrent writer and was rolled
    /// back. Retrying unchanged is safe.
    #[error("concurrent update conflict: {0}")]
    Conflict(Arc<dyn std::error::Error + Send + Sync>),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted task data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a serialization failure or deadlock reported by the store.
    pub fn conflict(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Conflict(Arc::new(err))
    }

    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
