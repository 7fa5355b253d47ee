//! Sibling ordering and move-target position lists.
//!
//! Sorting is ascending by `position` and stable: siblings with equal
//! positions keep the order of the source sequence. The position lists are
//! flat `{id, position, label}` rows a move dialog offers as insertion
//! points.

use crate::view::{NestedColumnView, TaskView};
use composable_board_core::{ColumnId, TaskId};
use serde::Serialize;
use std::sync::Arc;

pub use composable_board_core::position::{
    Positioned, canonical_position, compare_positions, next_position, sort_by_position,
};

/// One selectable insertion point
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionEntry<Id> {
    /// Entity the entry stands for
    pub id: Id,
    /// Its position
    pub position: f64,
    /// Human-readable label
    pub label: String,
}

impl Positioned for NestedColumnView {
    fn position(&self) -> f64 {
        self.position
    }
}

impl<Id> Positioned for PositionEntry<Id> {
    fn position(&self) -> f64 {
        self.position
    }
}

/// `"{position}. {title} ({name})"`
#[must_use]
pub fn task_label(task: &TaskView) -> String {
    format!("{}. {} ({})", canonical_position(task.position), task.title, task.name)
}

/// `"{position}. {title}"`
#[must_use]
pub fn column_label(column: &NestedColumnView) -> String {
    format!("{}. {}", canonical_position(column.position), column.title)
}

/// Position list of already sorted tasks, in the same order
#[must_use]
pub fn task_position_list(tasks: &[Arc<TaskView>]) -> Vec<PositionEntry<TaskId>> {
    tasks
        .iter()
        .map(|task| PositionEntry {
            id: task.id,
            position: task.position,
            label: task_label(task),
        })
        .collect()
}

/// Position list of a board's columns, in the same order
#[must_use]
pub fn column_position_list(columns: &[Arc<NestedColumnView>]) -> Vec<PositionEntry<ColumnId>> {
    columns
        .iter()
        .map(|column| PositionEntry {
            id: column.id,
            position: column.position,
            label: column_label(column),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_board_core::Task;

    fn task(id: u64, position: f64, title: &str, name: &str) -> Arc<Task> {
        Arc::new(Task::new(TaskId::new(id), ColumnId::new(1), title, name, position))
    }

    #[test]
    fn stable_sort_of_tasks() {
        let mut tasks = vec![
            task(1, 2.0, "A", "a"),
            task(2, 1.0, "B", "b"),
            task(3, 1.0, "C", "c"),
            task(4, 3.0, "D", "d"),
        ];
        sort_by_position(&mut tasks);
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["B", "C", "A", "D"]);
    }

    #[test]
    fn labels_print_whole_positions_without_fraction() {
        let entries = task_position_list(&[task(1, 1.0, "Fix", "bug"), task(2, 2.5, "Test", "feature")]);
        assert_eq!(entries[0].label, "1. Fix (bug)");
        assert_eq!(entries[1].label, "2.5. Test (feature)");
    }

    #[test]
    fn negative_zero_labels_as_zero() {
        let entries = task_position_list(&[task(1, -0.0, "Fix", "bug")]);
        assert_eq!(entries[0].label, "0. Fix (bug)");
    }
}
