//! `PostgreSQL` store implementation for task board persistence.
//!
//! Units of work run on a pooled connection inside a read-committed
//! transaction. Rows are locked with `SELECT ... FOR UPDATE` before they are
//! written, always column row first and task rows after it. Appends and moves
//! lock the destination column row only; bulk reorders also lock the
//! column's task rows. Concurrent reorders of one column, and concurrent
//! timer commands on one task, queue behind each other instead of
//! interleaving.

use super::{
    models::{NewSubtaskRow, NewTaskRow, SubtaskRow, TaskChangeset, TaskRow, TaskTagRow},
    schema::{columns, subtasks, task_tags, tasks},
};
use crate::config::DatabaseConfig;
use crate::task::{
    domain::{
        ColumnId, ColumnOrdering, ColumnSlot, NewSubtask, NewTask, PersistedLifecycle,
        PersistedTaskData, Position, PriorityId, RoleId, Subtask, SubtaskId, TagId, Task,
        TaskDetails, TaskId, Title, UserId, WorkDuration,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool from database settings.
///
/// # Errors
///
/// Returns [`TaskStoreError::Persistence`] when the pool cannot be created.
pub fn build_pool(config: &DatabaseConfig) -> TaskStoreResult<TaskPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(config.url.as_str());
    Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build(manager)
        .map_err(TaskStoreError::persistence)
}

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }
}

/// Failure of a Diesel transaction: either the unit of work or the database.
enum TransactionFailure<E> {
    Work(E),
    Database(DieselError),
}

impl<E> From<DieselError> for TransactionFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| E::from(TaskStoreError::persistence(err)))?;
            connection
                .build_transaction()
                .read_committed()
                .run(|tx_connection| {
                    let mut transaction = PgTaskTransaction {
                        connection: tx_connection,
                    };
                    work(&mut transaction).map_err(TransactionFailure::Work)
                })
                .map_err(|failure| match failure {
                    TransactionFailure::Work(err) => err,
                    TransactionFailure::Database(err) => E::from(database_error(err)),
                })
        })
        .await
        .map_err(|err| E::from(TaskStoreError::persistence(err)))?
    }
}

struct PgTaskTransaction<'conn> {
    connection: &'conn mut PgConnection,
}

impl PgTaskTransaction<'_> {
    /// Loads tags and subtasks for the given rows and builds aggregates.
    fn assemble(&mut self, rows: Vec<TaskRow>) -> TaskStoreResult<Vec<Task>> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let tag_rows = task_tags::table
            .filter(task_tags::task_id.eq_any(&ids))
            .select(TaskTagRow::as_select())
            .load::<TaskTagRow>(self.connection)
            .map_err(database_error)?;
        let mut tags: BTreeMap<i64, BTreeSet<TagId>> = BTreeMap::new();
        for tag_row in tag_rows {
            tags.entry(tag_row.task_id)
                .or_default()
                .insert(TagId::new(tag_row.tag_id));
        }

        let subtask_rows = subtasks::table
            .filter(subtasks::task_id.eq_any(&ids))
            .select(SubtaskRow::as_select())
            .load::<SubtaskRow>(self.connection)
            .map_err(database_error)?;
        let mut owned: BTreeMap<i64, Vec<Subtask>> = BTreeMap::new();
        for subtask_row in subtask_rows {
            owned
                .entry(subtask_row.task_id)
                .or_default()
                .push(row_to_subtask(subtask_row)?);
        }

        rows.into_iter()
            .map(|row| {
                let row_tags = tags.remove(&row.id).unwrap_or_default();
                let row_subtasks = owned.remove(&row.id).unwrap_or_default();
                row_to_task(row, row_tags, row_subtasks)
            })
            .collect()
    }

    /// Locks the column row. Returns `false` when the column does not exist.
    fn lock_column_record(&mut self, column_id: ColumnId) -> TaskStoreResult<bool> {
        let column = columns::table
            .filter(columns::id.eq(column_id.value()))
            .select(columns::id)
            .for_update()
            .first::<i64>(self.connection)
            .optional()
            .map_err(lock_error)?;
        Ok(column.is_some())
    }

    fn replace_tags(&mut self, task_id: i64, tags: &BTreeSet<TagId>) -> TaskStoreResult<()> {
        diesel::delete(task_tags::table.filter(task_tags::task_id.eq(task_id)))
            .execute(self.connection)
            .map_err(database_error)?;
        if tags.is_empty() {
            return Ok(());
        }
        let rows: Vec<TaskTagRow> = tags
            .iter()
            .map(|tag| TaskTagRow {
                task_id,
                tag_id: tag.value(),
            })
            .collect();
        diesel::insert_into(task_tags::table)
            .values(&rows)
            .execute(self.connection)
            .map_err(database_error)?;
        Ok(())
    }
}

impl TaskTransaction for PgTaskTransaction<'_> {
    fn lock_column(&mut self, column_id: ColumnId) -> TaskStoreResult<Option<ColumnOrdering>> {
        if !self.lock_column_record(column_id)? {
            return Ok(None);
        }
        let rows = tasks::table
            .filter(tasks::column_id.eq(column_id.value()))
            .select((tasks::id, tasks::sort_order))
            .order((tasks::sort_order.asc(), tasks::id.asc()))
            .for_update()
            .load::<(i64, i32)>(self.connection)
            .map_err(lock_error)?;
        column_ordering(column_id, rows).map(Some)
    }

    fn lock_column_row(
        &mut self,
        column_id: ColumnId,
    ) -> TaskStoreResult<Option<ColumnOrdering>> {
        if !self.lock_column_record(column_id)? {
            return Ok(None);
        }
        let rows = tasks::table
            .filter(tasks::column_id.eq(column_id.value()))
            .select((tasks::id, tasks::sort_order))
            .load::<(i64, i32)>(self.connection)
            .map_err(database_error)?;
        column_ordering(column_id, rows).map(Some)
    }

    fn lock_task(&mut self, task_id: TaskId) -> TaskStoreResult<Option<Task>> {
        let row = tasks::table
            .filter(tasks::id.eq(task_id.value()))
            .select(TaskRow::as_select())
            .for_update()
            .first::<TaskRow>(self.connection)
            .optional()
            .map_err(lock_error)?;
        let Some(found) = row else {
            return Ok(None);
        };
        Ok(self.assemble(vec![found])?.into_iter().next())
    }

    fn find_task(&mut self, task_id: TaskId) -> TaskStoreResult<Option<Task>> {
        let row = tasks::table
            .filter(tasks::id.eq(task_id.value()))
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.connection)
            .optional()
            .map_err(database_error)?;
        let Some(found) = row else {
            return Ok(None);
        };
        Ok(self.assemble(vec![found])?.into_iter().next())
    }

    fn load_column_tasks(&mut self, column_id: ColumnId) -> TaskStoreResult<Option<Vec<Task>>> {
        let column_exists = diesel::select(diesel::dsl::exists(
            columns::table.filter(columns::id.eq(column_id.value())),
        ))
        .get_result::<bool>(self.connection)
        .map_err(database_error)?;
        if !column_exists {
            return Ok(None);
        }

        let rows = tasks::table
            .filter(tasks::column_id.eq(column_id.value()))
            .select(TaskRow::as_select())
            .order((tasks::sort_order.asc(), tasks::id.asc()))
            .load::<TaskRow>(self.connection)
            .map_err(database_error)?;
        self.assemble(rows).map(Some)
    }

    fn insert_task(&mut self, task: NewTask) -> TaskStoreResult<Task> {
        let new_row = to_new_row(&task);
        let id = diesel::insert_into(tasks::table)
            .values(&new_row)
            .returning(tasks::id)
            .get_result::<i64>(self.connection)
            .map_err(database_error)?;
        self.replace_tags(id, &task.details.tags)?;
        Ok(Task::from_new(TaskId::new(id), task))
    }

    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        let changeset = to_changeset(task)?;
        let updated = diesel::update(tasks::table.filter(tasks::id.eq(task.id().value())))
            .set(&changeset)
            .execute(self.connection)
            .map_err(database_error)?;
        if updated == 0 {
            return Err(TaskStoreError::MissingRow(format!("task {}", task.id())));
        }
        self.replace_tags(task.id().value(), &task.details().tags)
    }

    fn assign_positions(
        &mut self,
        column_id: ColumnId,
        slots: &[ColumnSlot],
        updated_at: DateTime<Utc>,
    ) -> TaskStoreResult<()> {
        for slot in slots {
            let updated = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(slot.task_id.value()))
                    .filter(tasks::column_id.eq(column_id.value())),
            )
            .set((
                tasks::sort_order.eq(slot.position.value()),
                tasks::updated_at.eq(updated_at),
            ))
            .execute(self.connection)
            .map_err(database_error)?;
            if updated == 0 {
                return Err(TaskStoreError::MissingRow(format!(
                    "task {} in column {column_id}",
                    slot.task_id
                )));
            }
        }
        Ok(())
    }

    fn lock_subtask(
        &mut self,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> TaskStoreResult<Option<Subtask>> {
        subtasks::table
            .filter(subtasks::id.eq(subtask_id.value()))
            .filter(subtasks::task_id.eq(task_id.value()))
            .select(SubtaskRow::as_select())
            .for_update()
            .first::<SubtaskRow>(self.connection)
            .optional()
            .map_err(lock_error)?
            .map(row_to_subtask)
            .transpose()
    }

    fn insert_subtask(&mut self, subtask: NewSubtask) -> TaskStoreResult<Subtask> {
        let new_row = NewSubtaskRow {
            task_id: subtask.task_id.value(),
            title: subtask.title.as_str().to_owned(),
            is_completed: false,
            sort_order: subtask.position.value(),
        };
        let id = diesel::insert_into(subtasks::table)
            .values(&new_row)
            .returning(subtasks::id)
            .get_result::<i64>(self.connection)
            .map_err(database_error)?;
        Ok(Subtask::from_new(SubtaskId::new(id), subtask))
    }

    fn save_subtask(&mut self, subtask: &Subtask) -> TaskStoreResult<()> {
        let updated = diesel::update(
            subtasks::table
                .filter(subtasks::id.eq(subtask.id().value()))
                .filter(subtasks::task_id.eq(subtask.task_id().value())),
        )
        .set((
            subtasks::title.eq(subtask.title().as_str()),
            subtasks::is_completed.eq(subtask.is_completed()),
            subtasks::sort_order.eq(subtask.position().value()),
        ))
        .execute(self.connection)
        .map_err(database_error)?;
        if updated == 0 {
            return Err(TaskStoreError::MissingRow(format!(
                "subtask {}",
                subtask.id()
            )));
        }
        Ok(())
    }

    fn delete_subtask(&mut self, task_id: TaskId, subtask_id: SubtaskId) -> TaskStoreResult<bool> {
        let deleted = diesel::delete(
            subtasks::table
                .filter(subtasks::id.eq(subtask_id.value()))
                .filter(subtasks::task_id.eq(task_id.value())),
        )
        .execute(self.connection)
        .map_err(database_error)?;
        Ok(deleted > 0)
    }
}

/// Maps Diesel errors, singling out serialization failures as retryable
/// conflicts.
fn database_error(err: DieselError) -> TaskStoreError {
    if matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _)
    ) {
        return conflict(err);
    }
    TaskStoreError::persistence(err)
}

/// Maps Diesel errors raised while waiting for a row lock.
///
/// Every unit of work takes its row locks up front, so a server-side error
/// during the wait is a lost race such as a deadlock or lock timeout and is
/// safe to retry. Broken connections remain persistence failures.
fn lock_error(err: DieselError) -> TaskStoreError {
    let lost_race = matches!(
        &err,
        DieselError::DatabaseError(kind, _) if !matches!(
            kind,
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand
        )
    );
    if lost_race {
        return conflict(err);
    }
    TaskStoreError::persistence(err)
}

fn conflict(err: DieselError) -> TaskStoreError {
    tracing::warn!(error = %err, "task transaction lost a concurrent update race");
    TaskStoreError::conflict(err)
}

fn column_ordering(column_id: ColumnId, rows: Vec<(i64, i32)>) -> TaskStoreResult<ColumnOrdering> {
    let slots = rows
        .into_iter()
        .map(|(id, sort_order)| -> TaskStoreResult<ColumnSlot> {
            let position =
                Position::try_from(sort_order).map_err(TaskStoreError::invalid_persisted_data)?;
            Ok(ColumnSlot::new(TaskId::new(id), position))
        })
        .collect::<TaskStoreResult<Vec<_>>>()?;
    Ok(ColumnOrdering::new(column_id, slots))
}

fn to_new_row(task: &NewTask) -> NewTaskRow {
    let details = &task.details;
    NewTaskRow {
        column_id: task.column_id.map(ColumnId::value),
        sort_order: task.position.value(),
        title: details.title.as_str().to_owned(),
        description: details.description.clone(),
        image: details.image.clone(),
        assignee_id: details.assignee.map(UserId::value),
        role_id: details.role_id.map(RoleId::value),
        priority_id: details.priority_id.map(PriorityId::value),
        due_date: details.due_date,
        assigned_at: task.lifecycle.assigned_at(),
        created_at: task.created_at,
        updated_at: task.created_at,
    }
}

fn to_changeset(task: &Task) -> TaskStoreResult<TaskChangeset> {
    let details = task.details();
    let lifecycle = task.lifecycle();
    let work_seconds =
        i64::try_from(task.time().as_secs()).map_err(TaskStoreError::persistence)?;
    Ok(TaskChangeset {
        column_id: task.column_id().map(ColumnId::value),
        sort_order: task.position().value(),
        title: details.title.as_str().to_owned(),
        description: details.description.clone(),
        image: details.image.clone(),
        assignee_id: details.assignee.map(UserId::value),
        role_id: details.role_id.map(RoleId::value),
        priority_id: details.priority_id.map(PriorityId::value),
        due_date: details.due_date,
        assigned_at: lifecycle.assigned_at(),
        started_at: lifecycle.started_at(),
        submitted_at: lifecycle.submitted_at(),
        completed_at: lifecycle.completed_at(),
        is_completed: lifecycle.is_completed(),
        work_seconds,
        timer_started_at: task.timer_started_at(),
        is_timer_running: task.is_timer_running(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(
    row: TaskRow,
    tags: BTreeSet<TagId>,
    subtasks: Vec<Subtask>,
) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        column_id,
        sort_order,
        title,
        description,
        image,
        assignee_id,
        role_id,
        priority_id,
        due_date,
        assigned_at,
        started_at,
        submitted_at,
        completed_at,
        is_completed,
        work_seconds,
        timer_started_at,
        is_timer_running,
        created_at,
        updated_at,
    } = row;

    let position = Position::try_from(sort_order).map_err(TaskStoreError::invalid_persisted_data)?;
    let parsed_title = Title::new(title).map_err(TaskStoreError::invalid_persisted_data)?;
    let seconds = u64::try_from(work_seconds).map_err(TaskStoreError::invalid_persisted_data)?;

    let data = PersistedTaskData {
        id: TaskId::new(id),
        column_id: column_id.map(ColumnId::new),
        position,
        details: TaskDetails {
            title: parsed_title,
            description,
            image,
            assignee: assignee_id.map(UserId::new),
            role_id: role_id.map(RoleId::new),
            priority_id: priority_id.map(PriorityId::new),
            due_date,
            tags,
        },
        lifecycle: PersistedLifecycle {
            assigned_at,
            started_at,
            submitted_at,
            completed_at,
            is_completed,
        },
        time: WorkDuration::from_secs(seconds),
        timer_started_at,
        is_timer_running,
        subtasks,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_subtask(row: SubtaskRow) -> TaskStoreResult<Subtask> {
    let title = Title::new(row.title).map_err(TaskStoreError::invalid_persisted_data)?;
    let position =
        Position::try_from(row.sort_order).map_err(TaskStoreError::invalid_persisted_data)?;
    Ok(Subtask::from_persisted(
        SubtaskId::new(row.id),
        TaskId::new(row.task_id),
        title,
        row.is_completed,
        position,
    ))
}
