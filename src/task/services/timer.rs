//! Timer commands: open and close work sessions on a task.

use super::{TaskBoardService, TaskServiceResult, board::lock_task};
use crate::task::{
    domain::{TaskId, TimerStart, TimerState, TimerStatus, TimerStop, UserId},
    ports::TaskStore,
};
use mockable::Clock;
use std::sync::Arc;

impl<S, C> TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    /// Starts the task timer on behalf of `actor`.
    ///
    /// Starting a running timer reports [`TimerStatus::AlreadyRunning`] and
    /// writes nothing. The first start ever recorded on the task stamps
    /// `started_at` and assigns the task to `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::TaskNotFound`] when the task does
    /// not exist, [`super::TaskServiceError::Domain`] when the stored timer
    /// fields are inconsistent, or [`super::TaskServiceError::Store`] when
    /// persistence fails.
    pub async fn start_timer(&self, task_id: TaskId, actor: UserId) -> TaskServiceResult<TimerStart> {
        let clock = Arc::clone(&self.clock);
        let outcome = self
            .store
            .transaction(move |tx| -> TaskServiceResult<TimerStart> {
                let mut task = lock_task(tx, task_id)?;
                let outcome = task.start_timer(actor, &*clock)?;
                if outcome.status == TimerStatus::Started {
                    tx.save_task(&task)?;
                }
                Ok(outcome)
            })
            .await?;

        if outcome.status == TimerStatus::Started {
            tracing::info!(
                task_id = %task_id,
                actor = %actor,
                first_start = outcome.first_start,
                "task timer started"
            );
        } else {
            tracing::debug!(task_id = %task_id, "task timer already running");
        }
        Ok(outcome)
    }

    /// Stops the task timer and accrues the whole seconds of the session.
    ///
    /// Stopping an idle timer reports [`TimerStatus::NotRunning`] and writes
    /// nothing. A session whose start lies after the current clock reading
    /// accrues nothing.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::TaskNotFound`] when the task does
    /// not exist, [`super::TaskServiceError::Domain`] when the stored timer
    /// fields are inconsistent or the total would overflow, or
    /// [`super::TaskServiceError::Store`] when persistence fails.
    pub async fn stop_timer(&self, task_id: TaskId) -> TaskServiceResult<TimerStop> {
        let clock = Arc::clone(&self.clock);
        let outcome = self
            .store
            .transaction(move |tx| -> TaskServiceResult<TimerStop> {
                let mut task = lock_task(tx, task_id)?;
                let now = clock.utc();
                if let TimerState::Running { since } = task.timer_state()? {
                    if since > now {
                        tracing::warn!(
                            task_id = %task_id,
                            started_at = %since,
                            now = %now,
                            "clock moved backwards during timer session; accruing nothing"
                        );
                    }
                }
                let outcome = task.stop_timer_at(now)?;
                if outcome.status == TimerStatus::Stopped {
                    tx.save_task(&task)?;
                }
                Ok(outcome)
            })
            .await?;

        if outcome.status == TimerStatus::Stopped {
            tracing::info!(
                task_id = %task_id,
                elapsed = %outcome.elapsed,
                total = %outcome.total_time,
                "task timer stopped"
            );
        } else {
            tracing::debug!(task_id = %task_id, "task timer not running");
        }
        Ok(outcome)
    }
}
