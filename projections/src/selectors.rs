//! The composition engine.
//!
//! [`BoardViews`] owns one [`MemoSelector`] per selector identity, which makes
//! it the single `(selector, key) → slot` map of the read side. Every method
//! takes the snapshot explicitly; nothing is read from ambient state.
//!
//! ```text
//! select_nested_board_by_id(board)
//!   inputs: board Arc, [select_nested_column_by_id(c) for c in board.columns]
//!
//! select_nested_column_by_id(column)
//!   inputs: column Arc, select_tasks_of_column(column)
//!
//! select_tasks_of_column(column)
//!   inputs: [select_task_by_id(t) for t in column.tasks], or "no column"
//! ```
//!
//! Because each level only sees the `Arc`s of the level below, replacing one
//! task re-derives that task's column and board and nothing else: sibling
//! columns return the pointer they returned before.
//!
//! The tasks selector reads only the resolved tasks, not the column `Arc`.
//! Renaming a column yields a new nested column view but keeps its task list
//! and task position list.

use crate::memo::{CacheStats, MemoSelector, SelectorId, ViewCacheConfig};
use crate::ordering::{PositionEntry, column_position_list, sort_by_position, task_position_list};
use crate::view::{NestedBoardView, NestedColumnView, TaskList};
use composable_board_core::{Board, BoardId, Column, ColumnId, EntityStore, Task, TaskId};
use std::sync::Arc;

/// Resolved task ids of a column; `None` when the column itself is absent
type TasksInputs = Option<Vec<Option<Arc<Task>>>>;
type NestedColumnInputs = (Option<Arc<Column>>, TaskList);
type NestedBoardInputs = (Option<Arc<Board>>, Vec<Option<Arc<NestedColumnView>>>);

/// Shared, immutable position list
pub type PositionList<Id> = Arc<[PositionEntry<Id>]>;

/// Memoized nested views of boards, columns and tasks
///
/// # Example
///
/// ```
/// use composable_board_core::{Board, BoardId, Column, ColumnId, EntityStore};
/// use composable_board_projections::BoardViews;
///
/// let mut store = EntityStore::new();
/// store.insert_board(Board::new(BoardId::new(1), "Sprint").with_columns(vec![ColumnId::new(2)]));
/// store.insert_column(Column::new(ColumnId::new(2), BoardId::new(1), "Todo", 1.0));
///
/// let views = BoardViews::new();
/// let board = views.select_nested_board_by_id(&store, BoardId::new(1));
/// assert_eq!(board.map(|b| b.columns.len()), Some(1));
/// ```
#[derive(Debug)]
pub struct BoardViews {
    tasks_of_column: MemoSelector<ColumnId, TasksInputs, TaskList>,
    nested_column: MemoSelector<ColumnId, NestedColumnInputs, Option<Arc<NestedColumnView>>>,
    nested_board: MemoSelector<BoardId, NestedBoardInputs, Option<Arc<NestedBoardView>>>,
    task_positions: MemoSelector<ColumnId, TaskList, PositionList<TaskId>>,
    column_positions: MemoSelector<BoardId, Option<Arc<NestedBoardView>>, PositionList<ColumnId>>,
}

impl BoardViews {
    /// Create an empty cache with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ViewCacheConfig::default())
    }

    /// Create an empty cache
    #[must_use]
    pub fn with_config(config: ViewCacheConfig) -> Self {
        Self {
            tasks_of_column: MemoSelector::with_config(SelectorId::TasksOfColumn, config),
            nested_column: MemoSelector::with_config(SelectorId::NestedColumn, config),
            nested_board: MemoSelector::with_config(SelectorId::NestedBoard, config),
            task_positions: MemoSelector::with_config(SelectorId::TaskPositionsOfColumn, config),
            column_positions: MemoSelector::with_config(SelectorId::ColumnPositionsOfBoard, config),
        }
    }

    // ========== Entity selectors ==========

    /// The stored board; the `Arc` is already stable across snapshots until
    /// the board is replaced
    #[must_use]
    #[allow(clippy::unused_self)] // Same call shape as the memoized selectors
    pub fn select_board_by_id(&self, store: &EntityStore, board_id: BoardId) -> Option<Arc<Board>> {
        store.board(&board_id).cloned()
    }

    /// The stored column
    #[must_use]
    #[allow(clippy::unused_self)] // Same call shape as the memoized selectors
    pub fn select_column_by_id(&self, store: &EntityStore, column_id: ColumnId) -> Option<Arc<Column>> {
        store.column(&column_id).cloned()
    }

    /// The stored task
    #[must_use]
    #[allow(clippy::unused_self)] // Same call shape as the memoized selectors
    pub fn select_task_by_id(&self, store: &EntityStore, task_id: TaskId) -> Option<Arc<Task>> {
        store.task(&task_id).cloned()
    }

    // ========== Composed selectors ==========

    /// Tasks of a column, dangling ids dropped, ascending by position
    ///
    /// An absent column yields an empty list.
    pub fn select_tasks_of_column(&self, store: &EntityStore, column_id: ColumnId) -> TaskList {
        let inputs: TasksInputs = self.select_column_by_id(store, column_id).map(|column| {
            column
                .tasks
                .iter()
                .map(|task_id| self.select_task_by_id(store, *task_id))
                .collect()
        });

        self.tasks_of_column.select(column_id, inputs, |inputs| {
            let Some(resolved) = inputs else {
                return Arc::from(Vec::new());
            };
            let mut tasks: Vec<Arc<Task>> = resolved.iter().flatten().cloned().collect();
            let dangling = resolved.len() - tasks.len();
            if dangling > 0 {
                tracing::debug!(column_id = %column_id, dangling, "Skipping dangling task ids");
            }
            sort_by_position(&mut tasks);
            Arc::from(tasks)
        })
    }

    /// A column with its sorted tasks; `None` when the column is absent
    pub fn select_nested_column_by_id(
        &self,
        store: &EntityStore,
        column_id: ColumnId,
    ) -> Option<Arc<NestedColumnView>> {
        let column = self.select_column_by_id(store, column_id);
        let tasks = self.select_tasks_of_column(store, column_id);

        self.nested_column.select(column_id, (column, tasks), |(column, tasks)| {
            column
                .as_ref()
                .map(|column| Arc::new(NestedColumnView::new(column, Arc::clone(tasks))))
        })
    }

    /// A board with its nested columns in the board's own order; `None` when
    /// the board is absent
    ///
    /// Column ids that do not resolve are left out.
    pub fn select_nested_board_by_id(
        &self,
        store: &EntityStore,
        board_id: BoardId,
    ) -> Option<Arc<NestedBoardView>> {
        let board = self.select_board_by_id(store, board_id);
        let columns: Vec<Option<Arc<NestedColumnView>>> = board
            .as_ref()
            .map(|board| {
                board
                    .columns
                    .iter()
                    .map(|column_id| self.select_nested_column_by_id(store, *column_id))
                    .collect()
            })
            .unwrap_or_default();

        self.nested_board.select(board_id, (board, columns), |(board, columns)| {
            board.as_ref().map(|board| {
                let resolved: Vec<Arc<NestedColumnView>> = columns.iter().flatten().cloned().collect();
                Arc::new(NestedBoardView::new(board, resolved))
            })
        })
    }

    /// Move-target list of a column's tasks, labelled `"{position}. {title} ({name})"`
    pub fn select_position_list_of_column(
        &self,
        store: &EntityStore,
        column_id: ColumnId,
    ) -> PositionList<TaskId> {
        let tasks = self.select_tasks_of_column(store, column_id);
        self.task_positions
            .select(column_id, tasks, |tasks| Arc::from(task_position_list(tasks)))
    }

    /// Move-target list of a board's columns in board order, labelled
    /// `"{position}. {title}"`; empty when the board is absent
    pub fn select_column_positions_of_board(
        &self,
        store: &EntityStore,
        board_id: BoardId,
    ) -> PositionList<ColumnId> {
        let board = self.select_nested_board_by_id(store, board_id);
        self.column_positions.select(board_id, board, |board| {
            board
                .as_ref()
                .map_or_else(|| Arc::from(Vec::new()), |board| Arc::from(column_position_list(&board.columns)))
        })
    }

    // ========== Cache management ==========

    /// Evict every slot whose key no longer resolves in `store`
    ///
    /// Slots of keys that still exist are untouched, so views that survive
    /// the prune keep their identity. Returns the number of evicted slots.
    pub fn prune(&self, store: &EntityStore) -> usize {
        let evicted = self.tasks_of_column.retain(|id| store.contains_column(id))
            + self.nested_column.retain(|id| store.contains_column(id))
            + self.task_positions.retain(|id| store.contains_column(id))
            + self.nested_board.retain(|id| store.contains_board(id))
            + self.column_positions.retain(|id| store.contains_board(id));

        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.slot_count(), "Pruned view cache");
        }
        evicted
    }

    /// Evict every slot keyed by `board_id`
    pub fn evict_board(&self, board_id: BoardId) -> usize {
        usize::from(self.nested_board.evict(&board_id)) + usize::from(self.column_positions.evict(&board_id))
    }

    /// Evict every slot keyed by `column_id`
    pub fn evict_column(&self, column_id: ColumnId) -> usize {
        usize::from(self.tasks_of_column.evict(&column_id))
            + usize::from(self.nested_column.evict(&column_id))
            + usize::from(self.task_positions.evict(&column_id))
    }

    /// Drop every slot
    pub fn clear(&self) {
        self.tasks_of_column.clear();
        self.nested_column.clear();
        self.nested_board.clear();
        self.task_positions.clear();
        self.column_positions.clear();
    }

    /// Live slots across all selectors
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.tasks_of_column.len()
            + self.nested_column.len()
            + self.nested_board.len()
            + self.task_positions.len()
            + self.column_positions.len()
    }

    /// Counters of every selector
    #[must_use]
    pub fn stats(&self) -> Vec<CacheStats> {
        vec![
            self.tasks_of_column.stats(),
            self.nested_column.stats(),
            self.nested_board.stats(),
            self.task_positions.stats(),
            self.column_positions.stats(),
        ]
    }
}

impl Default for BoardViews {
    fn default() -> Self {
        Self::new()
    }
}
