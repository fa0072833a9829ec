//! Task board service: construction, shared helpers, and read projections.

use super::{TaskServiceError, TaskServiceResult};
use crate::task::{
    domain::{ColumnId, ReorderPolicy, Task, TaskId},
    ports::{TaskStore, TaskTransaction},
};
use mockable::Clock;
use std::sync::Arc;

/// Task board orchestration service.
///
/// Every command runs as one unit of work against the store, so it either
/// commits in full or leaves nothing behind.
pub struct TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    pub(super) store: Arc<S>,
    pub(super) clock: Arc<C>,
    pub(super) reorder_policy: ReorderPolicy,
}

impl<S, C> Clone for TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            reorder_policy: self.reorder_policy,
        }
    }
}

impl<S, C> TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task board service using the default reorder policy.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            reorder_policy: ReorderPolicy::default(),
        }
    }

    /// Replaces the policy used to validate bulk reorders.
    #[must_use]
    pub const fn with_reorder_policy(mut self, reorder_policy: ReorderPolicy) -> Self {
        self.reorder_policy = reorder_policy;
        self
    }

    /// Returns the active reorder policy.
    #[must_use]
    pub const fn reorder_policy(&self) -> ReorderPolicy {
        self.reorder_policy
    }

    /// Retrieves a task with its subtasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task does not
    /// exist, or [`TaskServiceError::Store`] when the lookup fails.
    pub async fn get_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.store
            .transaction(move |tx| -> TaskServiceResult<Task> {
                tx.find_task(task_id)?
                    .ok_or(TaskServiceError::TaskNotFound(task_id))
            })
            .await
    }

    /// Lists the tasks of a column in display order: ascending position,
    /// ties broken by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ColumnNotFound`] when the column does not
    /// exist, or [`TaskServiceError::Store`] when the lookup fails.
    pub async fn list_column(&self, column_id: ColumnId) -> TaskServiceResult<Vec<Task>> {
        self.store
            .transaction(move |tx| -> TaskServiceResult<Vec<Task>> {
                tx.load_column_tasks(column_id)?
                    .ok_or(TaskServiceError::ColumnNotFound(column_id))
            })
            .await
    }
}

/// Locks a task or reports it missing.
pub(super) fn lock_task(tx: &mut dyn TaskTransaction, task_id: TaskId) -> TaskServiceResult<Task> {
    tx.lock_task(task_id)?
        .ok_or(TaskServiceError::TaskNotFound(task_id))
}
