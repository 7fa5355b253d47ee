//! Reference reducer for boards, columns and tasks.
//!
//! Every accepted action follows the copy-on-write rule:
//!
//! - the touched entity is replaced by a new `Arc`, never written through;
//! - when a child is added, moved or removed, the parent is replaced too, so
//!   its child id sequence is a new allocation;
//! - every other `Arc` in the snapshot is left pointer-equal.
//!
//! Selectors rely on this to decide what to recompute.

use crate::action::{
    AddColumnParams, AddTaskParams, BoardAction, BoardParams, MoveColumnParams, MoveTaskParams,
    UpdateColumnParams, UpdateTaskParams,
};
use crate::entity::{Board, Column, Task};
use crate::environment::{IdGenerator, SequentialIdGenerator};
use crate::error::BoardError;
use crate::id::{BoardId, ColumnId, TaskId};
use crate::position::{compare_positions, next_position};
use crate::reducer::Reducer;
use crate::snapshot::EntityStore;
use std::sync::Arc;

/// Environment dependencies for the board reducer
#[derive(Clone)]
pub struct BoardEnvironment {
    /// Id source for new entities
    pub ids: Arc<dyn IdGenerator>,
}

impl BoardEnvironment {
    /// Creates a new `BoardEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Environment with a sequential id generator starting at 1
    #[must_use]
    pub fn sequential() -> Self {
        Self::new(Arc::new(SequentialIdGenerator::default()))
    }

    /// Environment whose ids never collide with entities already in `store`
    #[must_use]
    pub fn continuing(store: &EntityStore) -> Self {
        Self::new(Arc::new(SequentialIdGenerator::after(store)))
    }
}

impl std::fmt::Debug for BoardEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the board aggregate
#[derive(Clone, Debug, Default)]
pub struct BoardReducer;

impl BoardReducer {
    /// Creates a new `BoardReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_title(title: &str) -> Result<String, BoardError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        Ok(trimmed.to_owned())
    }

    fn validate_position(position: f64) -> Result<f64, BoardError> {
        if position.is_finite() {
            Ok(position)
        } else {
            Err(BoardError::InvalidPosition(position))
        }
    }

    fn existing_board(state: &EntityStore, id: BoardId) -> Result<Arc<Board>, BoardError> {
        state.board(&id).cloned().ok_or(BoardError::BoardNotFound(id))
    }

    fn existing_column(state: &EntityStore, id: ColumnId) -> Result<Arc<Column>, BoardError> {
        state.column(&id).cloned().ok_or(BoardError::ColumnNotFound(id))
    }

    fn existing_task(state: &EntityStore, id: TaskId) -> Result<Arc<Task>, BoardError> {
        state.task(&id).cloned().ok_or(BoardError::TaskNotFound(id))
    }

    /// Column ids re-sorted by position; dangling ids keep their relative
    /// order at the end
    fn ordered_column_ids(state: &EntityStore, ids: &[ColumnId]) -> Vec<ColumnId> {
        let mut keyed: Vec<(f64, ColumnId)> = ids
            .iter()
            .map(|id| {
                let position = state.column(id).map_or(f64::INFINITY, |c| c.position);
                (position, *id)
            })
            .collect();
        keyed.sort_by(|a, b| compare_positions(a.0, b.0));
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    fn remove_column_with_tasks(state: &mut EntityStore, column_id: ColumnId) -> usize {
        let Some(column) = state.remove_column(&column_id) else {
            return 0;
        };
        column
            .tasks
            .iter()
            .filter(|task_id| state.remove_task(task_id).is_some())
            .count()
    }

    fn add_board(state: &mut EntityStore, params: &BoardParams, env: &BoardEnvironment) -> Result<(), BoardError> {
        let title = Self::validate_title(&params.title)?;
        let id = BoardId::new(env.ids.next_id());
        state.insert_board(Board::new(id, title));
        tracing::debug!(board_id = %id, "Board added");
        Ok(())
    }

    fn update_board(state: &mut EntityStore, board_id: BoardId, params: &BoardParams) -> Result<(), BoardError> {
        let board = Self::existing_board(state, board_id)?;
        let title = Self::validate_title(&params.title)?;
        state.insert_board(board.with_title(title));
        Ok(())
    }

    fn delete_board(state: &mut EntityStore, board_id: BoardId) -> Result<(), BoardError> {
        let board = Self::existing_board(state, board_id)?;
        state.remove_board(&board_id);
        let tasks: usize = board
            .columns
            .iter()
            .map(|column_id| Self::remove_column_with_tasks(state, *column_id))
            .sum();
        tracing::debug!(board_id = %board_id, columns = board.columns.len(), tasks, "Board deleted");
        Ok(())
    }

    fn add_column(
        state: &mut EntityStore,
        board_id: BoardId,
        params: &AddColumnParams,
        env: &BoardEnvironment,
    ) -> Result<(), BoardError> {
        let board = Self::existing_board(state, board_id)?;
        let title = Self::validate_title(&params.title)?;
        let position = match params.position {
            Some(position) => Self::validate_position(position)?,
            None => next_position(
                board
                    .columns
                    .iter()
                    .filter_map(|id| state.column(id))
                    .map(|c| c.position),
            ),
        };

        let id = ColumnId::new(env.ids.next_id());
        state.insert_column(Column::new(id, board_id, title, position));

        let mut columns = board.columns.clone();
        columns.push(id);
        let columns = Self::ordered_column_ids(state, &columns);
        state.insert_board(board.with_columns(columns));

        tracing::debug!(board_id = %board_id, column_id = %id, position, "Column added");
        Ok(())
    }

    fn update_column(
        state: &mut EntityStore,
        column_id: ColumnId,
        params: &UpdateColumnParams,
    ) -> Result<(), BoardError> {
        let column = Self::existing_column(state, column_id)?;
        let Some(title) = params.title.as_deref() else {
            return Ok(());
        };
        let title = Self::validate_title(title)?;
        state.insert_column(column.with_title(title));
        Ok(())
    }

    fn move_column(
        state: &mut EntityStore,
        column_id: ColumnId,
        params: MoveColumnParams,
    ) -> Result<(), BoardError> {
        let column = Self::existing_column(state, column_id)?;
        let position = Self::validate_position(params.position)?;
        state.insert_column(column.with_position(position));

        if let Some(board) = state.board(&column.board_id).cloned() {
            let columns = Self::ordered_column_ids(state, &board.columns);
            state.insert_board(board.with_columns(columns));
        }

        tracing::debug!(column_id = %column_id, from = column.position, to = position, "Column moved");
        Ok(())
    }

    fn delete_column(state: &mut EntityStore, column_id: ColumnId) -> Result<(), BoardError> {
        let column = Self::existing_column(state, column_id)?;
        let tasks = Self::remove_column_with_tasks(state, column_id);

        if let Some(board) = state.board(&column.board_id).cloned() {
            let columns = board.columns.iter().copied().filter(|id| *id != column_id).collect();
            state.insert_board(board.with_columns(columns));
        }

        tracing::debug!(column_id = %column_id, tasks, "Column deleted");
        Ok(())
    }

    fn add_task(
        state: &mut EntityStore,
        column_id: ColumnId,
        params: &AddTaskParams,
        env: &BoardEnvironment,
    ) -> Result<(), BoardError> {
        let column = Self::existing_column(state, column_id)?;
        let title = Self::validate_title(&params.title)?;
        let position = match params.position {
            Some(position) => Self::validate_position(position)?,
            None => next_position(
                column
                    .tasks
                    .iter()
                    .filter_map(|id| state.task(id))
                    .map(|t| t.position),
            ),
        };

        let id = TaskId::new(env.ids.next_id());
        state.insert_task(Task::new(id, column_id, title, params.name.trim(), position));

        let mut tasks = column.tasks.clone();
        tasks.push(id);
        state.insert_column(column.with_tasks(tasks));

        tracing::debug!(column_id = %column_id, task_id = %id, position, "Task added");
        Ok(())
    }

    fn update_task(state: &mut EntityStore, task_id: TaskId, params: &UpdateTaskParams) -> Result<(), BoardError> {
        let task = Self::existing_task(state, task_id)?;
        if params.title.is_none() && params.name.is_none() {
            return Ok(());
        }
        let title = params.title.as_deref().map(Self::validate_title).transpose()?;
        let name = params.name.as_deref().map(str::trim);
        state.insert_task(task.with_text(title.as_deref(), name));
        Ok(())
    }

    fn move_task(state: &mut EntityStore, task_id: TaskId, params: MoveTaskParams) -> Result<(), BoardError> {
        let task = Self::existing_task(state, task_id)?;
        let target = Self::existing_column(state, params.column_id)?;
        let position = Self::validate_position(params.position)?;

        if let Some(source) = state.column(&task.column_id).cloned() {
            if source.id != target.id {
                let tasks = source.tasks.iter().copied().filter(|id| *id != task_id).collect();
                state.insert_column(source.with_tasks(tasks));
            }
        }

        let mut tasks: Vec<TaskId> = target.tasks.iter().copied().filter(|id| *id != task_id).collect();
        tasks.push(task_id);
        state.insert_column(target.with_tasks(tasks));
        state.insert_task(task.moved_to(target.id, position));

        tracing::debug!(
            task_id = %task_id,
            from = %task.column_id,
            to = %target.id,
            position,
            "Task moved"
        );
        Ok(())
    }

    fn delete_task(state: &mut EntityStore, task_id: TaskId) -> Result<(), BoardError> {
        let task = Self::existing_task(state, task_id)?;
        state.remove_task(&task_id);

        if let Some(column) = state.column(&task.column_id).cloned() {
            let tasks = column.tasks.iter().copied().filter(|id| *id != task_id).collect();
            state.insert_column(column.with_tasks(tasks));
        }

        tracing::debug!(task_id = %task_id, "Task deleted");
        Ok(())
    }
}

impl Reducer for BoardReducer {
    type State = EntityStore;
    type Action = BoardAction;
    type Environment = BoardEnvironment;
    type Error = BoardError;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Result<(), Self::Error> {
        let name = action.name();
        let outcome = match action {
            BoardAction::AddBoard { params } => Self::add_board(state, &params, env),
            BoardAction::UpdateBoard { board_id, params } => Self::update_board(state, board_id, &params),
            BoardAction::DeleteBoard { board_id } => Self::delete_board(state, board_id),
            BoardAction::AddColumn { board_id, params } => Self::add_column(state, board_id, &params, env),
            BoardAction::UpdateColumn { column_id, params } => Self::update_column(state, column_id, &params),
            BoardAction::MoveColumn { column_id, params } => Self::move_column(state, column_id, params),
            BoardAction::DeleteColumn { column_id } => Self::delete_column(state, column_id),
            BoardAction::AddTask { column_id, params } => Self::add_task(state, column_id, &params, env),
            BoardAction::UpdateTask { task_id, params } => Self::update_task(state, task_id, &params),
            BoardAction::MoveTask { task_id, params } => Self::move_task(state, task_id, params),
            BoardAction::DeleteTask { task_id } => Self::delete_task(state, task_id),
        };

        if let Err(error) = &outcome {
            tracing::warn!(action = name, %error, "Action rejected");
        }
        outcome
    }
}
