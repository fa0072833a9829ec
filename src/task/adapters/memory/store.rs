//! In-memory task store for tests and single-process deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use crate::task::{
    domain::{
        ColumnId, ColumnOrdering, ColumnSlot, NewSubtask, NewTask, Subtask, SubtaskId, Task,
        TaskId,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};

/// Thread-safe in-memory task store.
///
/// Each unit of work runs against a private copy of the whole store while
/// holding the store mutex; the copy replaces the shared state only when the
/// work succeeds. Units of work are therefore fully serialized.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<Mutex<InMemoryTaskState>>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryTaskState {
    columns: BTreeSet<ColumnId>,
    tasks: BTreeMap<TaskId, Task>,
    subtasks: BTreeMap<SubtaskId, Subtask>,
    last_task_id: i64,
    last_subtask_id: i64,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already knows the given columns.
    #[must_use]
    pub fn with_columns(columns: impl IntoIterator<Item = ColumnId>) -> Self {
        let state = InMemoryTaskState {
            columns: columns.into_iter().collect(),
            ..InMemoryTaskState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Makes a column known to the store, as the column collaborator would.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the store lock is
    /// poisoned.
    pub fn register_column(&self, column_id: ColumnId) -> TaskStoreResult<()> {
        let mut state = self.state.lock().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.columns.insert(column_id);
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let mut shared = self.state.lock().map_err(|err| {
            E::from(TaskStoreError::persistence(std::io::Error::other(
                err.to_string(),
            )))
        })?;
        let mut transaction = InMemoryTransaction {
            state: shared.clone(),
        };
        let output = work(&mut transaction)?;
        *shared = transaction.state;
        Ok(output)
    }
}

struct InMemoryTransaction {
    state: InMemoryTaskState,
}

impl InMemoryTransaction {
    fn assemble(&self, task: &Task) -> Task {
        let mut assembled = task.clone();
        let subtasks = self
            .state
            .subtasks
            .values()
            .filter(|subtask| subtask.task_id() == task.id())
            .cloned()
            .collect();
        assembled.attach_subtasks(subtasks);
        assembled
    }
}

fn missing_task(task_id: TaskId) -> TaskStoreError {
    TaskStoreError::MissingRow(format!("task {task_id}"))
}

fn missing_subtask(subtask_id: SubtaskId) -> TaskStoreError {
    TaskStoreError::MissingRow(format!("subtask {subtask_id}"))
}

impl TaskTransaction for InMemoryTransaction {
    fn lock_column(&mut self, column_id: ColumnId) -> TaskStoreResult<Option<ColumnOrdering>> {
        if !self.state.columns.contains(&column_id) {
            return Ok(None);
        }
        let slots = self
            .state
            .tasks
            .values()
            .filter(|task| task.column_id() == Some(column_id))
            .map(|task| ColumnSlot::new(task.id(), task.position()));
        Ok(Some(ColumnOrdering::new(column_id, slots)))
    }

    fn lock_column_row(
        &mut self,
        column_id: ColumnId,
    ) -> TaskStoreResult<Option<ColumnOrdering>> {
        self.lock_column(column_id)
    }

    fn lock_task(&mut self, task_id: TaskId) -> TaskStoreResult<Option<Task>> {
        Ok(self
            .state
            .tasks
            .get(&task_id)
            .map(|task| self.assemble(task)))
    }

    fn find_task(&mut self, task_id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.lock_task(task_id)
    }

    fn load_column_tasks(&mut self, column_id: ColumnId) -> TaskStoreResult<Option<Vec<Task>>> {
        if !self.state.columns.contains(&column_id) {
            return Ok(None);
        }
        let mut tasks: Vec<Task> = self
            .state
            .tasks
            .values()
            .filter(|task| task.column_id() == Some(column_id))
            .map(|task| self.assemble(task))
            .collect();
        tasks.sort_by_key(|task| (task.position(), task.id()));
        Ok(Some(tasks))
    }

    fn insert_task(&mut self, task: NewTask) -> TaskStoreResult<Task> {
        self.state.last_task_id += 1;
        let created = Task::from_new(TaskId::new(self.state.last_task_id), task);
        self.state.tasks.insert(created.id(), created.clone());
        Ok(created)
    }

    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        let stored = self
            .state
            .tasks
            .get_mut(&task.id())
            .ok_or_else(|| missing_task(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    fn assign_positions(
        &mut self,
        column_id: ColumnId,
        slots: &[ColumnSlot],
        updated_at: DateTime<Utc>,
    ) -> TaskStoreResult<()> {
        for slot in slots {
            let task = self
                .state
                .tasks
                .get_mut(&slot.task_id)
                .filter(|task| task.column_id() == Some(column_id))
                .ok_or_else(|| missing_task(slot.task_id))?;
            task.reposition(slot.position, updated_at);
        }
        Ok(())
    }

    fn lock_subtask(
        &mut self,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> TaskStoreResult<Option<Subtask>> {
        Ok(self
            .state
            .subtasks
            .get(&subtask_id)
            .filter(|subtask| subtask.task_id() == task_id)
            .cloned())
    }

    fn insert_subtask(&mut self, subtask: NewSubtask) -> TaskStoreResult<Subtask> {
        if !self.state.tasks.contains_key(&subtask.task_id) {
            return Err(missing_task(subtask.task_id));
        }
        self.state.last_subtask_id += 1;
        let created = Subtask::from_new(SubtaskId::new(self.state.last_subtask_id), subtask);
        self.state.subtasks.insert(created.id(), created.clone());
        Ok(created)
    }

    fn save_subtask(&mut self, subtask: &Subtask) -> TaskStoreResult<()> {
        let stored = self
            .state
            .subtasks
            .get_mut(&subtask.id())
            .ok_or_else(|| missing_subtask(subtask.id()))?;
        *stored = subtask.clone();
        Ok(())
    }

    fn delete_subtask(&mut self, task_id: TaskId, subtask_id: SubtaskId) -> TaskStoreResult<bool> {
        let belongs = self
            .state
            .subtasks
            .get(&subtask_id)
            .is_some_and(|subtask| subtask.task_id() == task_id);
        if belongs {
            self.state.subtasks.remove(&subtask_id);
        }
        Ok(belongs)
    }
}
