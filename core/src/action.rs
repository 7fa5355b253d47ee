//! Write requests accepted by [`BoardReducer`](crate::BoardReducer).
//!
//! Optional parameters are explicit `Option`s; the reducer picks the default
//! (for example "after the last sibling" for a missing position).

use crate::id::{BoardId, ColumnId, TaskId};
use serde::{Deserialize, Serialize};

/// Title of a new or renamed board
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardParams {
    /// Board title
    pub title: String,
}

impl BoardParams {
    /// Creates params with the given title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Parameters of a new column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddColumnParams {
    /// Column title
    pub title: String,
    /// Position; defaults to one past the board's last column
    #[serde(default)]
    pub position: Option<f64>,
}

impl AddColumnParams {
    /// Creates params that append the column
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            position: None,
        }
    }

    /// Places the column at `position`
    #[must_use]
    pub const fn at(mut self, position: f64) -> Self {
        self.position = Some(position);
        self
    }
}

/// Fields to change on a column
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateColumnParams {
    /// New title, if any
    #[serde(default)]
    pub title: Option<String>,
}

/// Target of a column move
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveColumnParams {
    /// New position on the board
    pub position: f64,
}

/// Parameters of a new task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddTaskParams {
    /// Task title
    pub title: String,
    /// Secondary label
    pub name: String,
    /// Position; defaults to one past the column's last task
    #[serde(default)]
    pub position: Option<f64>,
}

impl AddTaskParams {
    /// Creates params that append the task
    #[must_use]
    pub fn new(title: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            name: name.into(),
            position: None,
        }
    }

    /// Places the task at `position`
    #[must_use]
    pub const fn at(mut self, position: f64) -> Self {
        self.position = Some(position);
        self
    }
}

/// Fields to change on a task
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTaskParams {
    /// New title, if any
    #[serde(default)]
    pub title: Option<String>,
    /// New name, if any
    #[serde(default)]
    pub name: Option<String>,
}

/// Target of a task move
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskParams {
    /// Destination column (may equal the current one)
    pub column_id: ColumnId,
    /// New position inside the destination column
    pub position: f64,
}

/// Every write the board reducer understands
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardAction {
    /// Create a board
    AddBoard {
        /// Title of the new board
        params: BoardParams,
    },
    /// Rename a board
    UpdateBoard {
        /// Board to rename
        board_id: BoardId,
        /// New title
        params: BoardParams,
    },
    /// Delete a board with its columns and tasks
    DeleteBoard {
        /// Board to delete
        board_id: BoardId,
    },
    /// Add a column to a board
    AddColumn {
        /// Owning board
        board_id: BoardId,
        /// Column fields
        params: AddColumnParams,
    },
    /// Change column fields
    UpdateColumn {
        /// Column to change
        column_id: ColumnId,
        /// Fields to change
        params: UpdateColumnParams,
    },
    /// Reposition a column on its board
    MoveColumn {
        /// Column to move
        column_id: ColumnId,
        /// Target position
        params: MoveColumnParams,
    },
    /// Delete a column with its tasks
    DeleteColumn {
        /// Column to delete
        column_id: ColumnId,
    },
    /// Add a task to a column
    AddTask {
        /// Owning column
        column_id: ColumnId,
        /// Task fields
        params: AddTaskParams,
    },
    /// Change task fields
    UpdateTask {
        /// Task to change
        task_id: TaskId,
        /// Fields to change
        params: UpdateTaskParams,
    },
    /// Reposition a task, possibly into another column
    MoveTask {
        /// Task to move
        task_id: TaskId,
        /// Target column and position
        params: MoveTaskParams,
    },
    /// Delete a task
    DeleteTask {
        /// Task to delete
        task_id: TaskId,
    },
}

impl BoardAction {
    /// Stable name used in logs and metrics labels
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddBoard { .. } => "add_board",
            Self::UpdateBoard { .. } => "update_board",
            Self::DeleteBoard { .. } => "delete_board",
            Self::AddColumn { .. } => "add_column",
            Self::UpdateColumn { .. } => "update_column",
            Self::MoveColumn { .. } => "move_column",
            Self::DeleteColumn { .. } => "delete_column",
            Self::AddTask { .. } => "add_task",
            Self::UpdateTask { .. } => "update_task",
            Self::MoveTask { .. } => "move_task",
            Self::DeleteTask { .. } => "delete_task",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_are_tagged_by_type() {
        let action = BoardAction::MoveTask {
            task_id: TaskId::new(4),
            params: MoveTaskParams {
                column_id: ColumnId::new(2),
                position: 3.0,
            },
        };
        let json = serde_json::to_value(&action).unwrap_or_default();
        assert_eq!(json["type"], "move_task");
        assert_eq!(json["params"]["columnId"], 2);
        assert_eq!(action.name(), "move_task");
    }

    #[test]
    fn missing_position_deserializes_as_none() {
        let params: AddTaskParams =
            serde_json::from_str(r#"{"title":"Fix","name":"bug"}"#).unwrap_or_else(|_| AddTaskParams::new("", ""));
        assert_eq!(params.title, "Fix");
        assert_eq!(params.position, None);
    }
}
