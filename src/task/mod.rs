//! Task board management.
//!
//! Tasks live in columns, carry a checklist of subtasks, accumulate working
//! time through a start/stop timer, and record assignment, start,
//! submission, and completion instants as they progress. Every command runs
//! as one unit of work so concurrent callers never observe a half-applied
//! change. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
