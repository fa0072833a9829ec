//! When steps for task board BDD scenarios.

use super::world::{BoardWorld, names, run_async};
use chrono::Duration;
use mockable::Clock;
use rstest_bdd_macros::when;
use tasklane::task::{domain::UserId, services::MoveTaskRequest};

#[when(r#"column "{column}" is reordered as "{titles}""#)]
fn column_is_reordered(
    world: &mut BoardWorld,
    column: String,
    titles: String,
) -> Result<(), eyre::Report> {
    let column_id = world.column(&column)?;
    let ordered = names(&titles)
        .iter()
        .map(|title| world.task(title))
        .collect::<Result<Vec<_>, _>>()?;
    let result = run_async(world.service.reorder_column(column_id, ordered));
    world.record_failure(result);
    Ok(())
}

#[when(r#"the task "{title}" is moved to column "{column}""#)]
fn task_is_moved(world: &mut BoardWorld, title: String, column: String) -> Result<(), eyre::Report> {
    let request = MoveTaskRequest::new(world.column(&column)?);
    let result = run_async(world.service.move_task(world.task(&title)?, request));
    world.record_failure(result);
    Ok(())
}

#[when(r#"the task "{title}" is moved to column "{column}" at order {order:i64}"#)]
fn task_is_moved_to_order(
    world: &mut BoardWorld,
    title: String,
    column: String,
    order: i64,
) -> Result<(), eyre::Report> {
    let request = MoveTaskRequest::new(world.column(&column)?).at_order(order);
    let result = run_async(world.service.move_task(world.task(&title)?, request));
    world.record_failure(result);
    Ok(())
}

#[when(r#"user {user:i64} starts the timer on "{title}""#)]
fn user_starts_timer(world: &mut BoardWorld, user: i64, title: String) -> Result<(), eyre::Report> {
    let result = run_async(
        world
            .service
            .start_timer(world.task(&title)?, UserId::new(user)),
    );
    if let Some(outcome) = world.record_failure(result) {
        world.last_timer_status = Some(outcome.status);
    }
    Ok(())
}

#[when("{seconds:i64} seconds pass")]
fn seconds_pass(world: &mut BoardWorld, seconds: i64) {
    world.clock.advance(Duration::seconds(seconds));
}

#[when(r#"the timer on "{title}" is stopped"#)]
fn timer_is_stopped(world: &mut BoardWorld, title: String) -> Result<(), eyre::Report> {
    let result = run_async(world.service.stop_timer(world.task(&title)?));
    if let Some(outcome) = world.record_failure(result) {
        world.last_timer_status = Some(outcome.status);
        world.last_stop = Some(outcome);
    }
    Ok(())
}

#[when(r#"an approving comment is posted on "{title}""#)]
fn approving_comment_posted(world: &mut BoardWorld, title: String) {
    let now = world.clock.utc();
    let result = run_async(
        world
            .service
            .notify_comment_approved(world.task_or_unknown(&title)),
    );
    if world.record_failure(result).is_some() && world.first_approval_at.is_none() {
        world.first_approval_at = Some(now);
    }
}

#[when(r#"a report is submitted for "{title}""#)]
fn report_submitted(world: &mut BoardWorld, title: String) {
    let now = world.clock.utc();
    let result = run_async(
        world
            .service
            .notify_report_submitted(world.task_or_unknown(&title)),
    );
    if world.record_failure(result).is_some() {
        world.last_submission_at = Some(now);
    }
}
