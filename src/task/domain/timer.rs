//! Per-task work timer states and command outcomes.

use super::WorkDuration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated timer state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimerState {
    /// No session is open.
    Idle,
    /// A session has been open since the given instant.
    Running {
        /// Instant the open session started.
        since: DateTime<Utc>,
    },
}

impl TimerState {
    /// Returns `true` when a session is open.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Outcome label reported by timer commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// A new session was opened.
    Started,
    /// Start was requested while a session was already open; nothing changed.
    AlreadyRunning,
    /// The open session was closed and accrued.
    Stopped,
    /// Stop was requested while no session was open; nothing changed.
    NotRunning,
}

impl TimerStatus {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::AlreadyRunning => "already_running",
            Self::Stopped => "stopped",
            Self::NotRunning => "not_running",
        }
    }
}

/// Result of a start command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStart {
    /// Whether a session was opened or was already open.
    pub status: TimerStatus,
    /// Start instant of the open session.
    pub started_at: DateTime<Utc>,
    /// Accumulated total, excluding the open session.
    pub total_time: WorkDuration,
    /// Whether this start was the first work ever recorded on the task.
    pub first_start: bool,
}

/// Result of a stop command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStop {
    /// Whether a session was closed or none was open.
    pub status: TimerStatus,
    /// Whole seconds accrued by the closed session.
    pub elapsed: WorkDuration,
    /// Accumulated total after accrual.
    pub total_time: WorkDuration,
}
