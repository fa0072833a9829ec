//! Subtask commands, each scoped to its parent task.

use super::{
    TaskBoardService, TaskServiceError, TaskServiceResult, UpdateSubtaskRequest, board::lock_task,
};
use crate::task::{
    domain::{NewSubtask, Position, Subtask, SubtaskId, TaskId, Title},
    ports::TaskStore,
};
use mockable::Clock;

impl<S, C> TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    /// Adds a subtask after the task's existing subtasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when the title is invalid,
    /// [`TaskServiceError::TaskNotFound`] when the task does not exist, or
    /// [`TaskServiceError::Store`] when persistence fails.
    pub async fn add_subtask(
        &self,
        task_id: TaskId,
        title: impl Into<String> + Send,
    ) -> TaskServiceResult<Subtask> {
        let checked = Title::new(title)?;
        let subtask = self
            .store
            .transaction(move |tx| -> TaskServiceResult<Subtask> {
                let task = lock_task(tx, task_id)?;
                let position =
                    Position::after_last(task.subtasks().iter().map(Subtask::position))?;
                Ok(tx.insert_subtask(NewSubtask {
                    task_id,
                    title: checked,
                    position,
                })?)
            })
            .await?;

        tracing::info!(
            task_id = %task_id,
            subtask_id = %subtask.id(),
            position = %subtask.position(),
            "subtask added"
        );
        Ok(subtask)
    }

    /// Applies a partial update to a subtask of `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when a field is invalid,
    /// [`TaskServiceError::TaskNotFound`] or
    /// [`TaskServiceError::SubtaskNotFound`] for unknown identifiers, or
    /// [`TaskServiceError::Store`] when persistence fails.
    pub async fn update_subtask(
        &self,
        task_id: TaskId,
        subtask_id: SubtaskId,
        request: UpdateSubtaskRequest,
    ) -> TaskServiceResult<Subtask> {
        let update = request.into_update()?;
        let subtask = self
            .store
            .transaction(move |tx| -> TaskServiceResult<Subtask> {
                lock_task(tx, task_id)?;
                let mut subtask = tx
                    .lock_subtask(task_id, subtask_id)?
                    .ok_or(TaskServiceError::SubtaskNotFound {
                        task_id,
                        subtask_id,
                    })?;
                if !update.is_empty() {
                    subtask.apply(update);
                    tx.save_subtask(&subtask)?;
                }
                Ok(subtask)
            })
            .await?;

        tracing::info!(task_id = %task_id, subtask_id = %subtask_id, "subtask updated");
        Ok(subtask)
    }

    /// Deletes a subtask of `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] or
    /// [`TaskServiceError::SubtaskNotFound`] for unknown identifiers, or
    /// [`TaskServiceError::Store`] when persistence fails.
    pub async fn delete_subtask(
        &self,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> TaskServiceResult<()> {
        self.store
            .transaction(move |tx| -> TaskServiceResult<()> {
                lock_task(tx, task_id)?;
                if tx.delete_subtask(task_id, subtask_id)? {
                    Ok(())
                } else {
                    Err(TaskServiceError::SubtaskNotFound {
                        task_id,
                        subtask_id,
                    })
                }
            })
            .await?;

        tracing::info!(task_id = %task_id, subtask_id = %subtask_id, "subtask deleted");
        Ok(())
    }
}
