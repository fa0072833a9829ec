//! Field updates and the lifecycle events raised by collaborators.

use super::{TaskBoardService, TaskServiceResult, UpdateTaskRequest, board::lock_task};
use crate::task::{
    domain::{Task, TaskId},
    ports::TaskStore,
};
use mockable::Clock;
use std::sync::Arc;

impl<S, C> TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    /// Applies a generic field update.
    ///
    /// Assigning a previously unassigned task stamps `assigned_at` unless the
    /// task already carries one.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::Domain`] when the new title is
    /// invalid, [`super::TaskServiceError::TaskNotFound`] when the task does
    /// not exist, or [`super::TaskServiceError::Store`] when persistence
    /// fails.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let update = request.into_update()?;
        let clock = Arc::clone(&self.clock);
        let (task, assigned) = self
            .store
            .transaction(move |tx| -> TaskServiceResult<(Task, bool)> {
                let mut task = lock_task(tx, task_id)?;
                let assigned = task.apply_update(update, &*clock);
                tx.save_task(&task)?;
                Ok((task, assigned))
            })
            .await?;

        tracing::info!(task_id = %task_id, assigned, "task updated");
        Ok(task)
    }

    /// Records that a report was submitted for the task.
    ///
    /// `submitted_at` moves to the current time unless it already holds a
    /// later instant.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::TaskNotFound`] when the task does
    /// not exist, or [`super::TaskServiceError::Store`] when persistence
    /// fails.
    pub async fn notify_report_submitted(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        let clock = Arc::clone(&self.clock);
        let (task, changed) = self
            .store
            .transaction(move |tx| -> TaskServiceResult<(Task, bool)> {
                let mut task = lock_task(tx, task_id)?;
                let changed = task.record_report_submission(&*clock);
                if changed {
                    tx.save_task(&task)?;
                }
                Ok((task, changed))
            })
            .await?;

        if changed {
            tracing::info!(task_id = %task_id, "report submission recorded");
        } else {
            tracing::debug!(task_id = %task_id, "report submission already newer");
        }
        Ok(task)
    }

    /// Records that an approving comment was posted on the task.
    ///
    /// The first approval marks the task completed and stamps
    /// `completed_at`; later approvals change nothing.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::TaskNotFound`] when the task does
    /// not exist, or [`super::TaskServiceError::Store`] when persistence
    /// fails.
    pub async fn notify_comment_approved(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        let clock = Arc::clone(&self.clock);
        let (task, completed) = self
            .store
            .transaction(move |tx| -> TaskServiceResult<(Task, bool)> {
                let mut task = lock_task(tx, task_id)?;
                let completed = task.record_comment_approval(&*clock);
                if completed {
                    tx.save_task(&task)?;
                }
                Ok((task, completed))
            })
            .await?;

        if completed {
            tracing::info!(task_id = %task_id, "task completed by approval");
        } else {
            tracing::debug!(task_id = %task_id, "task already completed");
        }
        Ok(task)
    }
}
