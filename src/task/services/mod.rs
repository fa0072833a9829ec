//! Application services for task board orchestration.

mod board;
mod error;
mod lifecycle;
mod notifier;
mod ordering;
mod requests;
mod subtasks;
mod timer;

pub use board::TaskBoardService;
pub use error::{ErrorBody, ErrorKind, TaskServiceError, TaskServiceResult};
pub use notifier::{CompletionNotifier, SubmissionNotifier};
pub use requests::{AppendTaskRequest, MoveTaskRequest, UpdateSubtaskRequest, UpdateTaskRequest};
