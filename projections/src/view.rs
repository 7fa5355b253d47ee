//! View shapes handed to renderers.
//!
//! Views are denormalized, read-only and shared: a view holds `Arc`s of the
//! entities and of the child views it was built from, so two views that
//! contain the same task point at the same allocation.

use composable_board_core::{Board, BoardId, Column, ColumnId, Task};
use serde::Serialize;
use std::sync::Arc;

/// A task as rendered; the entity already has exactly the view's fields
pub type TaskView = Task;

/// Tasks of one column, ascending by position
pub type TaskList = Arc<[Arc<TaskView>]>;

/// A column with its tasks resolved and sorted
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedColumnView {
    /// Column id
    pub id: ColumnId,
    /// Owning board
    pub board_id: BoardId,
    /// Column title
    pub title: String,
    /// Column position
    pub position: f64,
    /// Resolved tasks, ascending by position
    pub tasks: TaskList,
}

impl NestedColumnView {
    /// Combines a column's own fields with its resolved tasks
    #[must_use]
    pub fn new(column: &Column, tasks: TaskList) -> Self {
        Self {
            id: column.id,
            board_id: column.board_id,
            title: column.title.clone(),
            position: column.position,
            tasks,
        }
    }
}

/// A board with its columns resolved, in the board's own column order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NestedBoardView {
    /// Board id
    pub id: BoardId,
    /// Board title
    pub title: String,
    /// Resolved columns
    pub columns: Vec<Arc<NestedColumnView>>,
}

impl NestedBoardView {
    /// Combines a board's own fields with its resolved columns
    #[must_use]
    pub fn new(board: &Board, columns: Vec<Arc<NestedColumnView>>) -> Self {
        Self {
            id: board.id,
            title: board.title.clone(),
            columns,
        }
    }

    /// Finds a column of this board by id
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&Arc<NestedColumnView>> {
        self.columns.iter().find(|column| column.id == id)
    }

    /// Total number of tasks across all columns
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }
}
