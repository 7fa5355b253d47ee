//! Builder for hand-written entity store snapshots.
//!
//! Ids are given explicitly so tests can refer to them afterwards. Columns
//! attach to the most recently added board, tasks to the most recently added
//! column, in call order.

#![allow(clippy::module_name_repetitions)]

use composable_board_core::{Board, BoardId, Column, ColumnId, EntityStore, Task, TaskId};

/// Fluent builder for an [`EntityStore`]
///
/// # Example
///
/// ```
/// use composable_board_testing::BoardFixture;
/// use composable_board_core::{ColumnId, TaskId};
///
/// let store = BoardFixture::new()
///     .board(1, "Sprint")
///     .column(10, "Todo", 1.0)
///     .task(100, "Fix", "bug", 1.0)
///     .dangling_task(999)
///     .build();
///
/// assert_eq!(store.task_ids_of(&ColumnId::new(10)), [TaskId::new(100), TaskId::new(999)]);
/// assert!(!store.contains_task(&TaskId::new(999)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoardFixture {
    store: EntityStore,
    current_board: Option<BoardId>,
    current_column: Option<ColumnId>,
}

impl BoardFixture {
    /// Start from an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a board without columns and make it current
    #[must_use]
    pub fn board(mut self, id: u64, title: impl Into<String>) -> Self {
        let id = BoardId::new(id);
        self.store.insert_board(Board::new(id, title));
        self.current_board = Some(id);
        self.current_column = None;
        self
    }

    /// Add a column to the current board and make it current
    ///
    /// # Panics
    ///
    /// Panics if no board was added yet.
    #[must_use]
    pub fn column(mut self, id: u64, title: impl Into<String>, position: f64) -> Self {
        let board_id = self.require_board();
        let id = ColumnId::new(id);
        self.store.insert_column(Column::new(id, board_id, title, position));
        self.push_column_id(board_id, id);
        self.current_column = Some(id);
        self
    }

    /// Add a task to the current column
    ///
    /// # Panics
    ///
    /// Panics if no column was added yet.
    #[must_use]
    pub fn task(mut self, id: u64, title: impl Into<String>, name: impl Into<String>, position: f64) -> Self {
        let column_id = self.require_column();
        let id = TaskId::new(id);
        self.store.insert_task(Task::new(id, column_id, title, name, position));
        self.push_task_id(column_id, id);
        self
    }

    /// Reference a task id from the current column without storing the task
    ///
    /// # Panics
    ///
    /// Panics if no column was added yet.
    #[must_use]
    pub fn dangling_task(mut self, id: u64) -> Self {
        let column_id = self.require_column();
        self.push_task_id(column_id, TaskId::new(id));
        self
    }

    /// Reference a column id from the current board without storing the column
    ///
    /// # Panics
    ///
    /// Panics if no board was added yet.
    #[must_use]
    pub fn dangling_column(mut self, id: u64) -> Self {
        let board_id = self.require_board();
        self.push_column_id(board_id, ColumnId::new(id));
        self
    }

    /// Finish the snapshot
    #[must_use]
    pub fn build(self) -> EntityStore {
        self.store
    }

    #[allow(clippy::expect_used)] // Misuse of a fixture is a test bug
    fn require_board(&self) -> BoardId {
        self.current_board.expect("add a board before its columns")
    }

    #[allow(clippy::expect_used)] // Misuse of a fixture is a test bug
    fn require_column(&self) -> ColumnId {
        self.current_column.expect("add a column before its tasks")
    }

    fn push_column_id(&mut self, board_id: BoardId, column_id: ColumnId) {
        if let Some(board) = self.store.board(&board_id).cloned() {
            let mut columns = board.columns.clone();
            columns.push(column_id);
            self.store.insert_board(board.with_columns(columns));
        }
    }

    fn push_task_id(&mut self, column_id: ColumnId, task_id: TaskId) {
        if let Some(column) = self.store.column(&column_id).cloned() {
            let mut tasks = column.tasks.clone();
            tasks.push(task_id);
            self.store.insert_column(column.with_tasks(tasks));
        }
    }
}

/// Board 1 with columns 10 ("Todo") and 20 ("Done"), two tasks each
///
/// | Column | Tasks (id, title, name, position) |
/// |--------|-----------------------------------|
/// | 10     | 100 Fix bug 1, 101 Test feature 2 |
/// | 20     | 200 Ship release 1, 201 Demo talk 2 |
#[must_use]
pub fn two_column_board() -> EntityStore {
    BoardFixture::new()
        .board(1, "Sprint")
        .column(10, "Todo", 1.0)
        .task(100, "Fix", "bug", 1.0)
        .task(101, "Test", "feature", 2.0)
        .column(20, "Done", 2.0)
        .task(200, "Ship", "release", 1.0)
        .task(201, "Demo", "talk", 2.0)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_attach_to_the_current_board_in_call_order() {
        let store = BoardFixture::new()
            .board(1, "A")
            .column(3, "x", 2.0)
            .column(2, "y", 1.0)
            .dangling_column(9)
            .build();
        assert_eq!(
            store.column_ids_of(&BoardId::new(1)),
            [ColumnId::new(3), ColumnId::new(2), ColumnId::new(9)]
        );
        assert_eq!(store.column_count(), 2);
    }

    #[test]
    fn two_column_board_layout() {
        let store = two_column_board();
        assert_eq!(store.board_count(), 1);
        assert_eq!(store.column_count(), 2);
        assert_eq!(store.task_count(), 4);
        assert_eq!(store.task_ids_of(&ColumnId::new(20)), [TaskId::new(200), TaskId::new(201)]);
    }

    #[test]
    #[should_panic(expected = "add a board")]
    fn column_without_board_is_a_test_bug() {
        let _ = BoardFixture::new().column(1, "orphan", 1.0);
    }
}
