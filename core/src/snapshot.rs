//! The normalized entity store.
//!
//! An [`EntityStore`] is a value: readers hold it behind an `Arc` and never
//! see it change. Writers clone it (which copies the three maps of `Arc`s,
//! never entity bodies), replace the entities they touch with new `Arc`s and
//! publish the result as the next snapshot.
//!
//! Child id sequences may name ids that are no longer in the maps. The store
//! does not repair them; every reader filters them out.

use crate::entity::{Board, Column, Task};
use crate::id::{BoardId, ColumnId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Normalized maps of every board, column and task
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityStore {
    boards: HashMap<BoardId, Arc<Board>>,
    columns: HashMap<ColumnId, Arc<Column>>,
    tasks: HashMap<TaskId, Arc<Task>>,
}

impl EntityStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a board
    #[must_use]
    pub fn board(&self, id: &BoardId) -> Option<&Arc<Board>> {
        self.boards.get(id)
    }

    /// Looks up a column
    #[must_use]
    pub fn column(&self, id: &ColumnId) -> Option<&Arc<Column>> {
        self.columns.get(id)
    }

    /// Looks up a task
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Arc<Task>> {
        self.tasks.get(id)
    }

    /// Ordered column ids of a board; empty when the board is absent
    #[must_use]
    pub fn column_ids_of(&self, board_id: &BoardId) -> &[ColumnId] {
        self.boards
            .get(board_id)
            .map(|board| board.columns.as_slice())
            .unwrap_or(&[])
    }

    /// Ordered task ids of a column; empty when the column is absent
    #[must_use]
    pub fn task_ids_of(&self, column_id: &ColumnId) -> &[TaskId] {
        self.columns
            .get(column_id)
            .map(|column| column.tasks.as_slice())
            .unwrap_or(&[])
    }

    /// Checks if a board exists
    #[must_use]
    pub fn contains_board(&self, id: &BoardId) -> bool {
        self.boards.contains_key(id)
    }

    /// Checks if a column exists
    #[must_use]
    pub fn contains_column(&self, id: &ColumnId) -> bool {
        self.columns.contains_key(id)
    }

    /// Checks if a task exists
    #[must_use]
    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Number of boards
    #[must_use]
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    /// Number of columns
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of tasks
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Board ids in ascending order
    #[must_use]
    pub fn board_ids(&self) -> Vec<BoardId> {
        let mut ids: Vec<BoardId> = self.boards.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Largest raw id used by any entity
    #[must_use]
    pub fn max_id(&self) -> Option<u64> {
        let boards = self.boards.keys().map(|id| id.get());
        let columns = self.columns.keys().map(|id| id.get());
        let tasks = self.tasks.keys().map(|id| id.get());
        boards.chain(columns).chain(tasks).max()
    }

    /// Stores `board` under a new `Arc`, replacing any previous entry
    pub fn insert_board(&mut self, board: Board) -> Arc<Board> {
        let board = Arc::new(board);
        self.boards.insert(board.id, Arc::clone(&board));
        board
    }

    /// Stores `column` under a new `Arc`, replacing any previous entry
    pub fn insert_column(&mut self, column: Column) -> Arc<Column> {
        let column = Arc::new(column);
        self.columns.insert(column.id, Arc::clone(&column));
        column
    }

    /// Stores `task` under a new `Arc`, replacing any previous entry
    pub fn insert_task(&mut self, task: Task) -> Arc<Task> {
        let task = Arc::new(task);
        self.tasks.insert(task.id, Arc::clone(&task));
        task
    }

    /// Removes a board, leaving its columns in place
    pub fn remove_board(&mut self, id: &BoardId) -> Option<Arc<Board>> {
        self.boards.remove(id)
    }

    /// Removes a column, leaving its tasks in place
    pub fn remove_column(&mut self, id: &ColumnId) -> Option<Arc<Column>> {
        self.columns.remove(id)
    }

    /// Removes a task
    pub fn remove_task(&mut self, id: &TaskId) -> Option<Arc<Task>> {
        self.tasks.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntityStore {
        let mut store = EntityStore::new();
        let mut board = Board::new(BoardId::new(1), "Board");
        board.columns = vec![ColumnId::new(10), ColumnId::new(11)];
        store.insert_board(board);
        let mut column = Column::new(ColumnId::new(10), BoardId::new(1), "Todo", 1.0);
        column.tasks = vec![TaskId::new(100)];
        store.insert_column(column);
        store.insert_task(Task::new(TaskId::new(100), ColumnId::new(10), "Fix", "bug", 1.0));
        store
    }

    #[test]
    fn child_ids_are_returned_verbatim() {
        let store = sample();
        assert_eq!(
            store.column_ids_of(&BoardId::new(1)),
            &[ColumnId::new(10), ColumnId::new(11)]
        );
        assert!(store.task_ids_of(&ColumnId::new(11)).is_empty());
        assert!(store.column_ids_of(&BoardId::new(9)).is_empty());
    }

    #[test]
    fn clone_shares_entity_allocations() {
        let store = sample();
        let copy = store.clone();
        let (Some(a), Some(b)) = (store.task(&TaskId::new(100)), copy.task(&TaskId::new(100))) else {
            unreachable!("sample contains task 100");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn insert_replaces_the_arc() {
        let mut store = sample();
        let before = store.column(&ColumnId::new(10)).cloned();
        store.insert_column(Column::new(ColumnId::new(10), BoardId::new(1), "Todo", 1.0));
        let after = store.column(&ColumnId::new(10)).cloned();
        assert!(matches!((before, after), (Some(a), Some(b)) if !Arc::ptr_eq(&a, &b)));
    }

    #[test]
    fn round_trips_through_json() {
        let store = sample();
        let json = serde_json::to_string(&store).unwrap_or_default();
        let parsed: EntityStore = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(parsed.board_count(), 1);
        assert_eq!(parsed.task(&TaskId::new(100)).map(|t| t.title.as_str()), Some("Fix"));
        assert_eq!(parsed.max_id(), Some(100));
    }
}
