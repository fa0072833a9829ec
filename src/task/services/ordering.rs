//! Column placement commands: append, move, and bulk reorder.

use super::{
    AppendTaskRequest, MoveTaskRequest, TaskBoardService, TaskServiceError, TaskServiceResult,
    board::lock_task,
};
use crate::task::{
    domain::{ColumnId, ColumnOrdering, NewTask, Position, Task, TaskDomainError, TaskId},
    ports::TaskStore,
};
use mockable::Clock;
use std::sync::Arc;

impl<S, C> TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a task at the end of a column.
    ///
    /// The task receives one past the column's highest position, or zero in
    /// an empty column. The column row stays locked until the insert commits,
    /// so concurrent appends to one column receive distinct positions.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when the title is invalid,
    /// [`TaskServiceError::ColumnNotFound`] when the column does not exist,
    /// or [`TaskServiceError::Store`] when persistence fails.
    pub async fn append_task(
        &self,
        column_id: ColumnId,
        request: AppendTaskRequest,
    ) -> TaskServiceResult<Task> {
        let details = request.into_details()?;
        let clock = Arc::clone(&self.clock);
        let task = self
            .store
            .transaction(move |tx| -> TaskServiceResult<Task> {
                let ordering = tx
                    .lock_column_row(column_id)?
                    .ok_or(TaskServiceError::ColumnNotFound(column_id))?;
                let position = ordering.next_position()?;
                let new_task = NewTask::new(Some(column_id), position, details, &*clock);
                Ok(tx.insert_task(new_task)?)
            })
            .await?;

        tracing::info!(
            task_id = %task.id(),
            column_id = %column_id,
            position = %task.position(),
            "task appended to column"
        );
        Ok(task)
    }

    /// Moves a task to a column.
    ///
    /// Without an explicit order the task lands one past the destination's
    /// highest position, excluding the task itself. Sibling positions are
    /// never renumbered, so the source column may keep a gap and an explicit
    /// order may duplicate an existing position until the next bulk reorder.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::MissingField`] when no destination column
    /// was given, [`TaskServiceError::Domain`] for a negative order,
    /// [`TaskServiceError::TaskNotFound`] or
    /// [`TaskServiceError::ColumnNotFound`] for unknown identifiers, or
    /// [`TaskServiceError::Store`] when persistence fails.
    pub async fn move_task(
        &self,
        task_id: TaskId,
        request: MoveTaskRequest,
    ) -> TaskServiceResult<Task> {
        let (column_id, order) = request.validate()?;
        let clock = Arc::clone(&self.clock);
        let (task, source) = self
            .store
            .transaction(move |tx| -> TaskServiceResult<(Task, Option<ColumnId>)> {
                let ordering = tx
                    .lock_column_row(column_id)?
                    .ok_or(TaskServiceError::ColumnNotFound(column_id))?;
                let mut task = lock_task(tx, task_id)?;
                let source = task.column_id();
                let position = match order {
                    Some(position) => position,
                    None => append_position(&ordering, task_id)?,
                };
                task.place(column_id, position, &*clock);
                tx.save_task(&task)?;
                Ok((task, source))
            })
            .await?;

        tracing::info!(
            task_id = %task_id,
            from_column = ?source.map(ColumnId::value),
            to_column = %column_id,
            position = %task.position(),
            "task moved"
        );
        Ok(task)
    }

    /// Rewrites the positions of a column's tasks from an ordered list of
    /// task identifiers. The task at index `i` receives position `i`.
    ///
    /// The active [`ReorderPolicy`](crate::task::domain::ReorderPolicy)
    /// decides whether the list must be an exact permutation of the column.
    /// Either every listed position is written or none is.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when the list is empty or breaks
    /// the reorder policy, [`TaskServiceError::ColumnNotFound`] when the
    /// column does not exist, or [`TaskServiceError::Store`] when persistence
    /// fails.
    pub async fn reorder_column(
        &self,
        column_id: ColumnId,
        ordered: Vec<TaskId>,
    ) -> TaskServiceResult<ColumnOrdering> {
        if ordered.is_empty() {
            return Err(TaskDomainError::EmptyReorder.into());
        }
        let policy = self.reorder_policy;
        let clock = Arc::clone(&self.clock);
        let (reordered, written) = self
            .store
            .transaction(move |tx| -> TaskServiceResult<(ColumnOrdering, usize)> {
                let ordering = tx
                    .lock_column(column_id)?
                    .ok_or(TaskServiceError::ColumnNotFound(column_id))?;
                let plan = ordering.plan_reorder(&ordered, policy)?;
                tx.assign_positions(column_id, &plan, clock.utc())?;
                Ok((ordering.with_assignments(&plan), plan.len()))
            })
            .await?;

        tracing::info!(
            column_id = %column_id,
            policy = %policy,
            repositioned = written,
            "column reordered"
        );
        Ok(reordered)
    }
}

fn append_position(ordering: &ColumnOrdering, moving: TaskId) -> TaskServiceResult<Position> {
    let others = ordering
        .slots()
        .iter()
        .filter(|slot| slot.task_id != moving)
        .map(|slot| slot.position);
    Ok(Position::after_last(others)?)
}
