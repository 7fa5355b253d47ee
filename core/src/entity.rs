//! Normalized entities.
//!
//! A parent only ever holds child ids. Entities are immutable once shared:
//! the `with_*` helpers return an updated copy that the reducer wraps in a
//! fresh `Arc`.

use crate::id::{BoardId, ColumnId, TaskId};
use serde::{Deserialize, Serialize};

/// A board and the ordered ids of its columns
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Unique identifier
    pub id: BoardId,
    /// Display title
    pub title: String,
    /// Column ids in display order
    #[serde(default)]
    pub columns: Vec<ColumnId>,
}

impl Board {
    /// Creates a board without columns
    #[must_use]
    pub fn new(id: BoardId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            columns: Vec::new(),
        }
    }

    /// Returns a copy with a different title
    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with a different column sequence
    #[must_use]
    pub fn with_columns(&self, columns: Vec<ColumnId>) -> Self {
        Self {
            columns,
            ..self.clone()
        }
    }
}

/// A column on a board and the ids of its tasks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique identifier
    pub id: ColumnId,
    /// Owning board
    pub board_id: BoardId,
    /// Display title
    pub title: String,
    /// Ordering key among the board's columns
    pub position: f64,
    /// Task ids, in insertion order (views sort them by position)
    #[serde(default)]
    pub tasks: Vec<TaskId>,
}

impl Column {
    /// Creates a column without tasks
    #[must_use]
    pub fn new(id: ColumnId, board_id: BoardId, title: impl Into<String>, position: f64) -> Self {
        Self {
            id,
            board_id,
            title: title.into(),
            position,
            tasks: Vec::new(),
        }
    }

    /// Returns a copy with a different title
    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    /// Returns a copy at a different position
    #[must_use]
    pub fn with_position(&self, position: f64) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Returns a copy with a different task sequence
    #[must_use]
    pub fn with_tasks(&self, tasks: Vec<TaskId>) -> Self {
        Self {
            tasks,
            ..self.clone()
        }
    }
}

/// A task inside a column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Owning column
    pub column_id: ColumnId,
    /// Short title
    pub title: String,
    /// Secondary label (assignee, kind, ...)
    pub name: String,
    /// Ordering key among the column's tasks
    pub position: f64,
}

impl Task {
    /// Creates a task
    #[must_use]
    pub fn new(
        id: TaskId,
        column_id: ColumnId,
        title: impl Into<String>,
        name: impl Into<String>,
        position: f64,
    ) -> Self {
        Self {
            id,
            column_id,
            title: title.into(),
            name: name.into(),
            position,
        }
    }

    /// Returns a copy with the given title and name, keeping current values
    /// where `None`
    #[must_use]
    pub fn with_text(&self, title: Option<&str>, name: Option<&str>) -> Self {
        Self {
            title: title.map_or_else(|| self.title.clone(), str::to_owned),
            name: name.map_or_else(|| self.name.clone(), str::to_owned),
            ..self.clone()
        }
    }

    /// Returns a copy placed in `column_id` at `position`
    #[must_use]
    pub fn moved_to(&self, column_id: ColumnId, position: f64) -> Self {
        Self {
            column_id,
            position,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_json_uses_camel_case() {
        let column = Column::new(ColumnId::new(2), BoardId::new(1), "Doing", 1.5);
        let json = serde_json::to_value(&column).unwrap_or_default();
        assert_eq!(json["boardId"], 1);
        assert_eq!(json["position"], 1.5);
    }

    #[test]
    fn with_text_keeps_unspecified_fields() {
        let task = Task::new(TaskId::new(1), ColumnId::new(2), "Fix", "bug", 1.0);
        let renamed = task.with_text(None, Some("regression"));
        assert_eq!(renamed.title, "Fix");
        assert_eq!(renamed.name, "regression");
    }
}
