//! End-to-end task journeys against the in-memory store.

use chrono::Duration;
use mockable::Clock;
use rstest::rstest;
use tasklane::task::{
    domain::{TagId, UserId},
    services::{MoveTaskRequest, UpdateSubtaskRequest, UpdateTaskRequest},
};

use crate::in_memory::helpers::{BoardFixture, DONE, IN_PROGRESS, TODO, append, board, positions};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_travels_from_todo_to_done(board: BoardFixture) -> Result<(), eyre::Report> {
    let BoardFixture { service, clock } = board;
    let task = append(&service, TODO, "Ship release").await?;
    let worker = UserId::new(21);

    let checklist = service.add_subtask(task.id(), "Tag build").await?;
    service
        .move_task(task.id(), MoveTaskRequest::new(IN_PROGRESS))
        .await?;
    let started = service.start_timer(task.id(), worker).await?;
    clock.advance(Duration::minutes(45));
    service.stop_timer(task.id()).await?;
    service
        .update_subtask(
            task.id(),
            checklist.id(),
            UpdateSubtaskRequest::new().with_completed(true),
        )
        .await?;
    clock.advance(Duration::minutes(5));
    service.notify_report_submitted(task.id()).await?;
    let submitted_at = clock.utc();
    service.move_task(task.id(), MoveTaskRequest::new(DONE)).await?;
    clock.advance(Duration::minutes(5));
    service.notify_comment_approved(task.id()).await?;

    let finished = service.get_task(task.id()).await?;
    eyre::ensure!(finished.column_id() == Some(DONE), "task should be done");
    eyre::ensure!(finished.time().to_string() == "00:45:00", "work time mismatch");
    eyre::ensure!(finished.assignee() == Some(worker), "worker should own task");
    eyre::ensure!(
        finished.lifecycle().started_at() == Some(started.started_at),
        "start stamp mismatch"
    );
    eyre::ensure!(
        finished.lifecycle().submitted_at() == Some(submitted_at),
        "submission stamp mismatch"
    );
    eyre::ensure!(finished.lifecycle().is_completed(), "task should be complete");
    eyre::ensure!(
        finished.subtasks().iter().all(|subtask| subtask.is_completed()),
        "checklist should be complete"
    );
    eyre::ensure!(positions(&service, TODO).await?.is_empty(), "todo should be empty");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_closes_gaps_left_by_moves(board: BoardFixture) -> Result<(), eyre::Report> {
    let service = board.service;
    let a = append(&service, TODO, "A").await?.id();
    let b = append(&service, TODO, "B").await?.id();
    let c = append(&service, TODO, "C").await?.id();
    let d = append(&service, TODO, "D").await?.id();

    service.move_task(b, MoveTaskRequest::new(DONE)).await?;
    eyre::ensure!(
        positions(&service, TODO).await? == vec![(a, 0), (c, 2), (d, 3)],
        "moving out must not renumber the source column"
    );

    let reordered = service.reorder_column(TODO, vec![d, a, c]).await?;
    eyre::ensure!(reordered.is_contiguous(), "reorder must produce 0..n");
    eyre::ensure!(
        positions(&service, TODO).await? == vec![(d, 0), (a, 1), (c, 2)],
        "reorder must follow the requested order"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_excluding_a_column_task_is_rejected(
    board: BoardFixture,
) -> Result<(), eyre::Report> {
    let service = board.service;
    let a = append(&service, TODO, "A").await?.id();
    let b = append(&service, TODO, "B").await?.id();
    append(&service, TODO, "C").await?;

    let result = service.reorder_column(TODO, vec![b, a]).await;

    eyre::ensure!(result.is_err(), "incomplete permutation must be rejected");
    eyre::ensure!(
        positions(&service, TODO).await?.iter().map(|(_, p)| *p).eq(0..3),
        "positions must be unchanged"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_replaces_tags_and_keeps_assignment_stamp(
    board: BoardFixture,
) -> Result<(), eyre::Report> {
    let BoardFixture { service, clock } = board;
    let task = append(&service, TODO, "Label me").await?;

    let first = service
        .update_task(
            task.id(),
            UpdateTaskRequest::new()
                .with_assignee(Some(UserId::new(1)))
                .with_tags([TagId::new(3), TagId::new(1)]),
        )
        .await?;
    clock.advance(Duration::hours(1));
    let second = service
        .update_task(
            task.id(),
            UpdateTaskRequest::new()
                .with_assignee(None)
                .with_tags([TagId::new(2)]),
        )
        .await?;

    eyre::ensure!(
        first.details().tags.iter().copied().eq([TagId::new(1), TagId::new(3)]),
        "tags should be stored as a set"
    );
    eyre::ensure!(
        second.details().tags.iter().copied().eq([TagId::new(2)]),
        "tags should be replaced"
    );
    eyre::ensure!(second.assignee().is_none(), "task should be unassigned");
    eyre::ensure!(
        second.lifecycle().assigned_at() == first.lifecycle().assigned_at(),
        "assignment stamp is never cleared"
    );
    Ok(())
}
