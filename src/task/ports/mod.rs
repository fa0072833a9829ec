//! Port contracts for task ordering, timing, and lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod store;

pub use store::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction};
