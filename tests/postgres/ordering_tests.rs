//! `PostgreSQL` persistence of append, move, and reorder.

use chrono::Duration;
use mockable::Clock;
use rstest::{fixture, rstest};
use tasklane::task::{
    domain::{ColumnId, TaskId},
    services::{AppendTaskRequest, ErrorKind, MoveTaskRequest, TaskServiceError},
};

use crate::postgres::helpers::{BoxError, PgService, TestBoard};

#[fixture]
fn board() -> Result<Option<TestBoard>, BoxError> {
    TestBoard::provision()
}

async fn append(service: &PgService, column: ColumnId, title: &str) -> Result<TaskId, BoxError> {
    Ok(service
        .append_task(column, AppendTaskRequest::new(title))
        .await?
        .id())
}

async fn order_of(service: &PgService, column: ColumnId) -> Result<Vec<(TaskId, i32)>, BoxError> {
    Ok(service
        .list_column(column)
        .await?
        .iter()
        .map(|task| (task.id(), task.position().value()))
        .collect())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_append_then_reorder(
    board: Result<Option<TestBoard>, BoxError>,
) -> Result<(), BoxError> {
    let Some(board) = board? else {
        return Ok(());
    };
    let column = board.create_column("Backlog")?;
    let service = &board.service;

    let t1 = append(service, column, "First").await?;
    let t2 = append(service, column, "Second").await?;
    let t3 = append(service, column, "Third").await?;
    assert_eq!(
        order_of(service, column).await?,
        vec![(t1, 0), (t2, 1), (t3, 2)]
    );

    board.clock.advance(Duration::hours(1));
    service.reorder_column(column, vec![t3, t1, t2]).await?;

    assert_eq!(
        order_of(service, column).await?,
        vec![(t3, 0), (t1, 1), (t2, 2)]
    );
    for task in [t1, t2, t3] {
        assert_eq!(service.get_task(task).await?.updated_at(), board.clock.utc());
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_move_leaves_source_untouched(
    board: Result<Option<TestBoard>, BoxError>,
) -> Result<(), BoxError> {
    let Some(board) = board? else {
        return Ok(());
    };
    let backlog = board.create_column("Backlog")?;
    let doing = board.create_column("Doing")?;
    let service = &board.service;
    let t1 = append(service, backlog, "First").await?;
    let t2 = append(service, backlog, "Second").await?;
    let t3 = append(service, backlog, "Third").await?;

    let moved = service
        .move_task(t1, MoveTaskRequest::new(doing).at_order(0))
        .await?;

    assert_eq!(moved.column_id(), Some(doing));
    assert_eq!(order_of(service, doing).await?, vec![(t1, 0)]);
    assert_eq!(order_of(service, backlog).await?, vec![(t2, 1), (t3, 2)]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_rejected_reorder_rolls_back(
    board: Result<Option<TestBoard>, BoxError>,
) -> Result<(), BoxError> {
    let Some(board) = board? else {
        return Ok(());
    };
    let column = board.create_column("Backlog")?;
    let service = &board.service;
    let t1 = append(service, column, "First").await?;
    let t2 = append(service, column, "Second").await?;

    let result = service.reorder_column(column, vec![t2, t2]).await;

    assert!(matches!(result, Err(ref err) if err.kind() == ErrorKind::InvalidArgument));
    assert_eq!(order_of(service, column).await?, vec![(t1, 0), (t2, 1)]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_unknown_column_is_not_found(
    board: Result<Option<TestBoard>, BoxError>,
) -> Result<(), BoxError> {
    let Some(board) = board? else {
        return Ok(());
    };

    let result = board
        .service
        .append_task(ColumnId::new(9_999), AppendTaskRequest::new("Nowhere"))
        .await;

    assert!(matches!(result, Err(TaskServiceError::ColumnNotFound(_))));
    Ok(())
}
