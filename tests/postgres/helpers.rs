//! Shared test helpers for `PostgreSQL` integration tests.
//!
//! Each test gets its own schema, selected through the connection
//! `search_path`, and drops it when the fixture goes out of scope.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::test_helpers::ManualClock;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_types::{BigInt, Text};
use tasklane::task::{
    adapters::postgres::{PostgresTaskStore, TaskPgPool},
    domain::ColumnId,
    services::TaskBoardService,
};

/// Boxed error type for fallible test setup.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable naming the database used by these tests.
pub const TEST_DATABASE_URL_ENV: &str = "TASKLANE_TEST_DATABASE_URL";

/// SQL creating the task board schema.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-03-02-000000_create_task_board/up.sql");

/// Service type used by `PostgreSQL` integration tests.
pub type PgService = TaskBoardService<PostgresTaskStore, ManualClock>;

static SCHEMA_COUNTER: AtomicU32 = AtomicU32::new(0);

#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// A migrated, isolated schema with a service over it.
pub struct TestBoard {
    pub service: Arc<PgService>,
    pub clock: Arc<ManualClock>,
    pub pool: TaskPgPool,
    schema: String,
    url: String,
}

impl TestBoard {
    /// Provisions a schema when the test database is configured.
    ///
    /// Returns `Ok(None)` when `TASKLANE_TEST_DATABASE_URL` is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation or pool setup fails.
    pub fn provision() -> Result<Option<Self>, BoxError> {
        let Ok(url) = std::env::var(TEST_DATABASE_URL_ENV) else {
            return Ok(None);
        };
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.subsec_nanos();
        let schema = format!(
            "tasklane_test_{}_{}_{}",
            std::process::id(),
            SCHEMA_COUNTER.fetch_add(1, Ordering::Relaxed),
            nanos
        );

        let mut conn = PgConnection::establish(&url)?;
        conn.batch_execute(&format!(
            "CREATE SCHEMA {schema}; SET search_path TO {schema};"
        ))?;
        conn.batch_execute(CREATE_SCHEMA_SQL)?;

        let pool = Pool::builder()
            .max_size(4)
            .connection_customizer(Box::new(SearchPath(schema.clone())))
            .build(ConnectionManager::<PgConnection>::new(url.as_str()))?;
        let clock = Arc::new(ManualClock::starting());
        let store = Arc::new(PostgresTaskStore::new(pool.clone()));
        let service = Arc::new(TaskBoardService::new(store, Arc::clone(&clock)));
        Ok(Some(Self {
            service,
            clock,
            pool,
            schema,
            url,
        }))
    }

    /// Inserts a column row as the column collaborator would.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_column(&self, name: &str) -> Result<ColumnId, BoxError> {
        #[derive(QueryableByName)]
        struct Inserted {
            #[diesel(sql_type = BigInt)]
            id: i64,
        }

        let mut conn = self.pool.get()?;
        let inserted = diesel::sql_query(
            "INSERT INTO columns (board_id, name, position) VALUES (1, $1, 0) RETURNING id",
        )
        .bind::<Text, _>(name)
        .get_result::<Inserted>(&mut conn)?;
        Ok(ColumnId::new(inserted.id))
    }
}

impl Drop for TestBoard {
    fn drop(&mut self) {
        let sql = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema);
        let outcome = match PgConnection::establish(&self.url) {
            Ok(mut conn) => conn.batch_execute(&sql).map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };
        if let Err(err) = outcome {
            tracing::warn!(schema = %self.schema, error = %err, "failed to drop test schema");
        }
    }
}
