//! Event hooks through which collaborators report lifecycle events.
//!
//! The comment and report subsystems persist their own records and then
//! call these hooks; the board owns the resulting lifecycle stamps.

use super::{TaskBoardService, TaskServiceResult};
use crate::task::{
    domain::{Task, TaskId},
    ports::TaskStore,
};
use async_trait::async_trait;
use mockable::Clock;

/// Receives approval events from the comment subsystem.
#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    /// Reports that an approving comment was persisted for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError`] when the task cannot be updated.
    async fn comment_approved(&self, task_id: TaskId) -> TaskServiceResult<Task>;
}

/// Receives submission events from the report subsystem.
#[async_trait]
pub trait SubmissionNotifier: Send + Sync {
    /// Reports that a report was persisted for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError`] when the task cannot be updated.
    async fn report_submitted(&self, task_id: TaskId) -> TaskServiceResult<Task>;
}

#[async_trait]
impl<S, C> CompletionNotifier for TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    async fn comment_approved(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.notify_comment_approved(task_id).await
    }
}

#[async_trait]
impl<S, C> SubmissionNotifier for TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    async fn report_submitted(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.notify_report_submitted(task_id).await
    }
}
