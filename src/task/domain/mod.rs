//! Domain model for task ordering, time tracking, and lifecycle.
//!
//! The task domain keeps every board invariant that does not need storage:
//! position arithmetic, timer state transitions, and monotonic lifecycle
//! stamps. Infrastructure concerns stay outside of the domain boundary.

mod duration;
mod error;
mod ids;
mod lifecycle;
mod ordering;
mod subtask;
mod task;
mod timer;

pub use duration::WorkDuration;
pub use error::TaskDomainError;
pub use ids::{
    ColumnId, MAX_TITLE_LENGTH, Position, PriorityId, RoleId, SubtaskId, TagId, TaskId, Title,
    UserId,
};
pub use lifecycle::{LifecycleStamps, PersistedLifecycle};
pub use ordering::{ColumnOrdering, ColumnSlot, ParseReorderPolicyError, ReorderPolicy};
pub use subtask::{NewSubtask, Subtask, SubtaskUpdate};
pub use task::{
    MAX_IMAGE_REFERENCE_LENGTH, NewTask, PersistedTaskData, Task, TaskDetails, TaskUpdate,
    image_reference,
};
pub use timer::{TimerStart, TimerState, TimerStatus, TimerStop};
