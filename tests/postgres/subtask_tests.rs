//! `PostgreSQL` persistence of subtasks and task details.

use chrono::NaiveDate;
use rstest::{fixture, rstest};
use tasklane::task::{
    domain::{PriorityId, RoleId, TagId},
    services::{AppendTaskRequest, ErrorKind, UpdateSubtaskRequest, UpdateTaskRequest},
};

use crate::postgres::helpers::{BoxError, TestBoard};

#[fixture]
fn board() -> Result<Option<TestBoard>, BoxError> {
    TestBoard::provision()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_subtasks_round_trip(
    board: Result<Option<TestBoard>, BoxError>,
) -> Result<(), BoxError> {
    let Some(board) = board? else {
        return Ok(());
    };
    let column = board.create_column("Backlog")?;
    let service = &board.service;
    let task = service
        .append_task(column, AppendTaskRequest::new("Checklist"))
        .await?
        .id();

    let draft = service.add_subtask(task, "Draft").await?;
    let review = service.add_subtask(task, "Review").await?;
    service
        .update_subtask(
            task,
            review.id(),
            UpdateSubtaskRequest::new()
                .with_title("Peer review")
                .with_completed(true)
                .at_order(0),
        )
        .await?;
    let other = service
        .append_task(column, AppendTaskRequest::new("Other"))
        .await?
        .id();
    let misdirected = service.delete_subtask(other, draft.id()).await;

    let stored = service.get_task(task).await?;
    let checklist: Vec<(&str, bool, i32)> = stored
        .subtasks()
        .iter()
        .map(|subtask| {
            (
                subtask.title().as_str(),
                subtask.is_completed(),
                subtask.position().value(),
            )
        })
        .collect();
    assert_eq!(
        checklist,
        vec![("Draft", false, 0), ("Peer review", true, 0)]
    );
    assert!(matches!(misdirected, Err(ref err) if err.kind() == ErrorKind::NotFound));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_task_details_round_trip(
    board: Result<Option<TestBoard>, BoxError>,
) -> Result<(), BoxError> {
    let Some(board) = board? else {
        return Ok(());
    };
    let column = board.create_column("Backlog")?;
    let service = &board.service;
    let due = NaiveDate::from_ymd_opt(2026, 4, 1).ok_or("invalid due date")?;
    let created = service
        .append_task(
            column,
            AppendTaskRequest::new("Detailed")
                .with_description("Long form")
                .with_image("covers/detailed.png")
                .with_role(RoleId::new(2))
                .with_priority(PriorityId::new(3))
                .with_due_date(due)
                .with_tags([TagId::new(4), TagId::new(5)]),
        )
        .await?;

    assert_eq!(service.get_task(created.id()).await?, created);

    let updated = service
        .update_task(
            created.id(),
            UpdateTaskRequest::new()
                .with_image(None)
                .with_due_date(None)
                .with_tags([TagId::new(6)]),
        )
        .await?;
    let stored = service.get_task(created.id()).await?;

    assert_eq!(stored, updated);
    assert_eq!(stored.details().image, None);
    assert_eq!(stored.details().description.as_deref(), Some("Long form"));
    assert!(stored.details().tags.iter().copied().eq([TagId::new(6)]));
    Ok(())
}
