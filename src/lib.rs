//! Tasklane: task board core for project-management backends.
//!
//! This crate owns the task, subtask, ordering, timer, and lifecycle rules
//! of a kanban-style board. Boards, columns, comments, and reports belong to
//! collaborating services that call into this crate.
//!
//! # Architecture
//!
//! Tasklane follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`config`]: Store and ordering configuration
//! - [`task`]: Task placement, timers, subtasks, and lifecycle stamps

pub mod config;
pub mod task;
