//! `PostgreSQL` persistence of timer sessions and lifecycle stamps.

use chrono::Duration;
use mockable::Clock;
use rstest::{fixture, rstest};
use tasklane::task::{
    domain::{TimerStatus, UserId, WorkDuration},
    services::AppendTaskRequest,
};

use crate::postgres::helpers::{BoxError, TestBoard};

#[fixture]
fn board() -> Result<Option<TestBoard>, BoxError> {
    TestBoard::provision()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_timer_sessions_accumulate(
    board: Result<Option<TestBoard>, BoxError>,
) -> Result<(), BoxError> {
    let Some(board) = board? else {
        return Ok(());
    };
    let column = board.create_column("Doing")?;
    let service = &board.service;
    let task = service
        .append_task(column, AppendTaskRequest::new("Timed"))
        .await?
        .id();
    let actor = UserId::new(5);

    let first = service.start_timer(task, actor).await?;
    board.clock.advance(Duration::minutes(10));
    service.stop_timer(task).await?;
    board.clock.advance(Duration::minutes(1));
    service.start_timer(task, actor).await?;
    let running = service.get_task(task).await?;
    board.clock.advance(Duration::seconds(90));
    let stopped = service.stop_timer(task).await?;

    assert!(first.first_start);
    assert!(running.is_timer_running());
    assert_eq!(stopped.status, TimerStatus::Stopped);
    assert_eq!(stopped.total_time.to_string(), "00:11:30");
    let stored = service.get_task(task).await?;
    assert_eq!(stored.time(), WorkDuration::from_secs(690));
    assert_eq!(stored.timer_started_at(), None);
    assert_eq!(stored.assignee(), Some(actor));
    assert_eq!(stored.lifecycle().started_at(), Some(first.started_at));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_lifecycle_stamps_persist(
    board: Result<Option<TestBoard>, BoxError>,
) -> Result<(), BoxError> {
    let Some(board) = board? else {
        return Ok(());
    };
    let column = board.create_column("Review")?;
    let service = &board.service;
    let task = service
        .append_task(
            column,
            AppendTaskRequest::new("Audit").with_assignee(UserId::new(8)),
        )
        .await?
        .id();
    let created_at = board.clock.utc();

    board.clock.advance(Duration::hours(1));
    service.notify_report_submitted(task).await?;
    let submitted_at = board.clock.utc();
    board.clock.advance(Duration::hours(1));
    service.notify_comment_approved(task).await?;
    let completed_at = board.clock.utc();
    board.clock.advance(Duration::hours(1));
    service.notify_comment_approved(task).await?;

    let stored = service.get_task(task).await?;
    assert_eq!(stored.lifecycle().assigned_at(), Some(created_at));
    assert_eq!(stored.lifecycle().submitted_at(), Some(submitted_at));
    assert_eq!(stored.lifecycle().completed_at(), Some(completed_at));
    assert!(stored.lifecycle().is_completed());
    Ok(())
}
