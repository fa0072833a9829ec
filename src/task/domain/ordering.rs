//! Ordering of tasks within a column.
//!
//! [`ColumnOrdering`] is a snapshot of one column's task positions, taken
//! under the column lock. It computes append slots and bulk reorder plans
//! without touching storage.

use super::{ColumnId, Position, TaskDomainError, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// How a bulk reorder treats requests that do not name every column task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderPolicy {
    /// The request must list every task in the column exactly once.
    #[default]
    Permutation,
    /// Tasks are positioned by their index in the request; foreign ids are
    /// skipped and unlisted tasks keep their stored positions.
    Partial,
}

impl ReorderPolicy {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permutation => "permutation",
            Self::Partial => "partial",
        }
    }
}

impl TryFrom<&str> for ReorderPolicy {
    type Error = ParseReorderPolicyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permutation" => Ok(Self::Permutation),
            "partial" => Ok(Self::Partial),
            _ => Err(ParseReorderPolicyError(value.to_owned())),
        }
    }
}

impl fmt::Display for ReorderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing a reorder policy name.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown reorder policy: {0}")]
pub struct ParseReorderPolicyError(pub String);

/// A task and its position within a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSlot {
    /// Task occupying the slot.
    pub task_id: TaskId,
    /// Stored position of the task.
    pub position: Position,
}

impl ColumnSlot {
    /// Creates a slot.
    #[must_use]
    pub const fn new(task_id: TaskId, position: Position) -> Self {
        Self { task_id, position }
    }
}

/// Snapshot of the task positions in one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrdering {
    column_id: ColumnId,
    slots: Vec<ColumnSlot>,
}

impl ColumnOrdering {
    /// Builds a snapshot, sorted by position then task identifier.
    #[must_use]
    pub fn new(column_id: ColumnId, slots: impl IntoIterator<Item = ColumnSlot>) -> Self {
        let mut collected: Vec<ColumnSlot> = slots.into_iter().collect();
        collected.sort_by_key(|slot| (slot.position, slot.task_id));
        Self {
            column_id,
            slots: collected,
        }
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the slots in display order.
    #[must_use]
    pub fn slots(&self) -> &[ColumnSlot] {
        &self.slots
    }

    /// Returns the number of tasks in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the column holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` when `task_id` is in the column.
    #[must_use]
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.slots.iter().any(|slot| slot.task_id == task_id)
    }

    /// Returns the position an appended task receives: one past the current
    /// maximum, or zero for an empty column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PositionOutOfRange`] when the maximum
    /// position has no successor.
    pub fn next_position(&self) -> Result<Position, TaskDomainError> {
        Position::after_last(self.slots.iter().map(|slot| slot.position))
    }

    /// Returns `true` when positions are exactly `0..n` without duplicates.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.slots
            .iter()
            .enumerate()
            .all(|(index, slot)| usize::try_from(slot.position.value()).ok() == Some(index))
    }

    /// Computes the positions a bulk reorder assigns.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyReorder`] for an empty request. Under
    /// [`ReorderPolicy::Permutation`] also returns
    /// [`TaskDomainError::DuplicateReorderEntry`],
    /// [`TaskDomainError::ForeignTaskInReorder`], or
    /// [`TaskDomainError::IncompleteReorder`] when the request is not a
    /// permutation of the column's tasks.
    pub fn plan_reorder(
        &self,
        requested: &[TaskId],
        policy: ReorderPolicy,
    ) -> Result<Vec<ColumnSlot>, TaskDomainError> {
        if requested.is_empty() {
            return Err(TaskDomainError::EmptyReorder);
        }
        match policy {
            ReorderPolicy::Permutation => self.plan_permutation(requested),
            ReorderPolicy::Partial => self.plan_partial(requested),
        }
    }

    /// Returns the snapshot after `plan` has been applied.
    #[must_use]
    pub fn with_assignments(&self, plan: &[ColumnSlot]) -> Self {
        let slots = self.slots.iter().map(|slot| {
            plan.iter()
                .find(|assigned| assigned.task_id == slot.task_id)
                .copied()
                .unwrap_or(*slot)
        });
        Self::new(self.column_id, slots)
    }

    fn plan_permutation(&self, requested: &[TaskId]) -> Result<Vec<ColumnSlot>, TaskDomainError> {
        let mut seen = HashSet::with_capacity(requested.len());
        let mut plan = Vec::with_capacity(requested.len());
        for (index, task_id) in requested.iter().copied().enumerate() {
            if !self.contains(task_id) {
                return Err(TaskDomainError::ForeignTaskInReorder(task_id));
            }
            if !seen.insert(task_id) {
                return Err(TaskDomainError::DuplicateReorderEntry(task_id));
            }
            plan.push(ColumnSlot::new(task_id, Position::from_index(index)?));
        }
        if plan.len() != self.slots.len() {
            return Err(TaskDomainError::IncompleteReorder {
                requested: plan.len(),
                expected: self.slots.len(),
            });
        }
        Ok(plan)
    }

    fn plan_partial(&self, requested: &[TaskId]) -> Result<Vec<ColumnSlot>, TaskDomainError> {
        let mut assignments = BTreeMap::new();
        for (index, task_id) in requested.iter().copied().enumerate() {
            if self.contains(task_id) {
                assignments.insert(task_id, Position::from_index(index)?);
            }
        }
        Ok(assignments
            .into_iter()
            .map(|(task_id, position)| ColumnSlot::new(task_id, position))
            .collect())
    }
}
