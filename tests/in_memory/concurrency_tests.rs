//! Racing commands against one in-memory store.

use std::sync::Arc;

use rstest::rstest;
use tasklane::task::{
    domain::{TaskId, TimerStatus, UserId},
    services::MoveTaskRequest,
};

use crate::in_memory::helpers::{BoardFixture, DONE, TODO, append, board, positions};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_starts_open_exactly_one_session(board: BoardFixture) -> Result<(), eyre::Report> {
    let service = board.service;
    let task = append(&service, TODO, "Contended").await?.id();

    let handles: Vec<_> = (1..=6)
        .map(|actor| {
            let racer = Arc::clone(&service);
            tokio::spawn(async move { racer.start_timer(task, UserId::new(actor)).await })
        })
        .collect();
    let mut started = 0;
    for handle in handles {
        if handle.await??.status == TimerStatus::Started {
            started += 1;
        }
    }

    eyre::ensure!(started == 1, "expected one opened session, got {started}");
    let stored = service.get_task(task).await?;
    eyre::ensure!(stored.is_timer_running(), "timer should be running");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_appends_and_moves_keep_positions_unique(
    board: BoardFixture,
) -> Result<(), eyre::Report> {
    let service = board.service;
    let mut movers = Vec::new();
    for index in 0..4 {
        movers.push(append(&service, TODO, &format!("Mover {index}")).await?.id());
    }

    let mut handles = Vec::new();
    for task in movers {
        let racer = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            racer
                .move_task(task, MoveTaskRequest::new(DONE))
                .await
                .map(|_| ())
        }));
    }
    for index in 0..4 {
        let racer = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            append(&racer, DONE, &format!("Fresh {index}"))
                .await
                .map(|_| ())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let done: Vec<i32> = positions(&service, DONE)
        .await?
        .into_iter()
        .map(|(_, position)| position)
        .collect();
    eyre::ensure!(
        done == (0..8).collect::<Vec<_>>(),
        "appends and moves should take successive slots, got {done:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_reorders_leave_one_requested_order(
    board: BoardFixture,
) -> Result<(), eyre::Report> {
    let service = board.service;
    let t1 = append(&service, TODO, "First").await?.id();
    let t2 = append(&service, TODO, "Second").await?.id();
    let t3 = append(&service, TODO, "Third").await?.id();
    let left = vec![t3, t1, t2];
    let right = vec![t2, t3, t1];

    let handles: Vec<_> = [left.clone(), right.clone()]
        .into_iter()
        .cycle()
        .take(8)
        .map(|ordered| {
            let racer = Arc::clone(&service);
            tokio::spawn(async move { racer.reorder_column(TODO, ordered).await })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    let listed = positions(&service, TODO).await?;
    let order: Vec<TaskId> = listed.iter().map(|(task, _)| *task).collect();
    let slots: Vec<i32> = listed.iter().map(|(_, position)| *position).collect();
    eyre::ensure!(slots == vec![0, 1, 2], "positions should be contiguous, got {slots:?}");
    eyre::ensure!(
        order == left || order == right,
        "final order {order:?} matches neither request"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposite_moves_between_columns_both_commit(
    board: BoardFixture,
) -> Result<(), eyre::Report> {
    let service = board.service;
    let leaving_todo = append(&service, TODO, "Leaving todo").await?.id();
    let leaving_done = append(&service, DONE, "Leaving done").await?.id();

    let to_done = {
        let racer = Arc::clone(&service);
        tokio::spawn(async move {
            racer
                .move_task(leaving_todo, MoveTaskRequest::new(DONE))
                .await
        })
    };
    let to_todo = {
        let racer = Arc::clone(&service);
        tokio::spawn(async move {
            racer
                .move_task(leaving_done, MoveTaskRequest::new(TODO))
                .await
        })
    };
    to_done.await??;
    to_todo.await??;

    let todo: Vec<TaskId> = positions(&service, TODO)
        .await?
        .into_iter()
        .map(|(task, _)| task)
        .collect();
    let done: Vec<TaskId> = positions(&service, DONE)
        .await?
        .into_iter()
        .map(|(task, _)| task)
        .collect();
    eyre::ensure!(todo == vec![leaving_done], "todo holds {todo:?}");
    eyre::ensure!(done == vec![leaving_todo], "done holds {done:?}");
    Ok(())
}
