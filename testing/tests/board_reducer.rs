//! Copy-on-write behaviour of the board reducer.
//!
//! Every accepted action must replace the `Arc`s it touches (the entity and
//! its parent's child-id sequence) and leave every other `Arc` pointer-equal.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use composable_board_core::{
    AddColumnParams, AddTaskParams, BoardAction, BoardEnvironment, BoardError, BoardId, BoardParams, BoardReducer,
    ColumnId, EntityStore, MoveColumnParams, MoveTaskParams, TaskId, UpdateColumnParams,
    UpdateTaskParams,
};
use composable_board_testing::fixtures::two_column_board;
use composable_board_testing::{ReducerTest, assert_distinct_arc, assert_same_arc, test_environment};

const BOARD: BoardId = BoardId::new(1);
const TODO: ColumnId = ColumnId::new(10);
const DONE: ColumnId = ColumnId::new(20);
const FIX: TaskId = TaskId::new(100);
const TEST: TaskId = TaskId::new(101);
const SHIP: TaskId = TaskId::new(200);

fn board_test() -> ReducerTest<BoardReducer, EntityStore, BoardAction, BoardEnvironment, BoardError> {
    ReducerTest::new(BoardReducer::new())
        .with_env(test_environment())
        .given_state(two_column_board())
}

fn assert_board_kept(before: &EntityStore, after: &EntityStore) {
    assert_same_arc(before.board(&BOARD).unwrap(), after.board(&BOARD).unwrap());
}

fn assert_column_kept(before: &EntityStore, after: &EntityStore, id: ColumnId) {
    assert_same_arc(before.column(&id).unwrap(), after.column(&id).unwrap());
}

fn assert_column_replaced(before: &EntityStore, after: &EntityStore, id: ColumnId) {
    assert_distinct_arc(before.column(&id).unwrap(), after.column(&id).unwrap());
}

fn assert_task_kept(before: &EntityStore, after: &EntityStore, id: TaskId) {
    assert_same_arc(before.task(&id).unwrap(), after.task(&id).unwrap());
}

#[test]
fn add_board_touches_nothing_else() {
    board_test()
        .when_action(BoardAction::AddBoard {
            params: BoardParams::new("  Roadmap  "),
        })
        .then_state(|state| {
            let added = state.board(&BoardId::new(1000)).unwrap();
            assert_eq!(added.title, "Roadmap");
            assert!(added.columns.is_empty());
        })
        .then_transition(|before, after| {
            assert_board_kept(before, after);
            assert_column_kept(before, after, TODO);
            assert_column_kept(before, after, DONE);
        })
        .run();
}

#[test]
fn update_board_replaces_only_the_board() {
    board_test()
        .when_action(BoardAction::UpdateBoard {
            board_id: BOARD,
            params: BoardParams::new("Sprint 2"),
        })
        .then_transition(|before, after| {
            assert_distinct_arc(before.board(&BOARD).unwrap(), after.board(&BOARD).unwrap());
            assert_eq!(after.board(&BOARD).unwrap().title, "Sprint 2");
            assert_column_kept(before, after, TODO);
            assert_column_kept(before, after, DONE);
        })
        .run();
}

#[test]
fn delete_board_cascades() {
    board_test()
        .when_action(BoardAction::DeleteBoard { board_id: BOARD })
        .then_state(|state| {
            assert_eq!(state.board_count(), 0);
            assert_eq!(state.column_count(), 0);
            assert_eq!(state.task_count(), 0);
        })
        .run();
}

#[test]
fn add_column_replaces_board_and_defaults_position() {
    board_test()
        .when_action(BoardAction::AddColumn {
            board_id: BOARD,
            params: AddColumnParams::new("Review"),
        })
        .then_transition(|before, after| {
            let new_id = ColumnId::new(1000);
            assert_eq!(after.column(&new_id).unwrap().position, 3.0);
            assert_eq!(after.column_ids_of(&BOARD), [TODO, DONE, new_id]);
            assert_distinct_arc(before.board(&BOARD).unwrap(), after.board(&BOARD).unwrap());
            assert_column_kept(before, after, TODO);
            assert_column_kept(before, after, DONE);
        })
        .run();
}

#[test]
fn add_column_at_position_is_ordered_into_the_board() {
    board_test()
        .when_action(BoardAction::AddColumn {
            board_id: BOARD,
            params: AddColumnParams::new("Doing").at(1.5),
        })
        .then_state(|state| {
            assert_eq!(state.column_ids_of(&BOARD), [TODO, ColumnId::new(1000), DONE]);
        })
        .run();
}

#[test]
fn update_column_replaces_only_that_column() {
    board_test()
        .when_action(BoardAction::UpdateColumn {
            column_id: TODO,
            params: UpdateColumnParams {
                title: Some("Backlog".into()),
            },
        })
        .then_transition(|before, after| {
            assert_column_replaced(before, after, TODO);
            assert_column_kept(before, after, DONE);
            assert_board_kept(before, after);
            assert_task_kept(before, after, FIX);
        })
        .run();
}

#[test]
fn move_column_replaces_column_and_board() {
    board_test()
        .when_action(BoardAction::MoveColumn {
            column_id: TODO,
            params: MoveColumnParams { position: 5.0 },
        })
        .then_transition(|before, after| {
            assert_eq!(after.column_ids_of(&BOARD), [DONE, TODO]);
            assert_column_replaced(before, after, TODO);
            assert_column_kept(before, after, DONE);
            assert_distinct_arc(before.board(&BOARD).unwrap(), after.board(&BOARD).unwrap());
        })
        .run();
}

#[test]
fn delete_column_removes_its_tasks_only() {
    board_test()
        .when_action(BoardAction::DeleteColumn { column_id: TODO })
        .then_transition(|before, after| {
            assert!(!after.contains_column(&TODO));
            assert!(!after.contains_task(&FIX));
            assert!(!after.contains_task(&TEST));
            assert_eq!(after.column_ids_of(&BOARD), [DONE]);
            assert_column_kept(before, after, DONE);
            assert_task_kept(before, after, SHIP);
        })
        .run();
}

#[test]
fn add_task_replaces_its_column() {
    board_test()
        .when_action(BoardAction::AddTask {
            column_id: DONE,
            params: AddTaskParams::new("Retro", "meeting"),
        })
        .then_transition(|before, after| {
            let new_id = TaskId::new(1000);
            assert_eq!(after.task(&new_id).unwrap().position, 3.0);
            assert_eq!(after.task_ids_of(&DONE).last(), Some(&new_id));
            assert_column_replaced(before, after, DONE);
            assert_column_kept(before, after, TODO);
            assert_board_kept(before, after);
        })
        .run();
}

#[test]
fn update_task_replaces_only_the_task() {
    board_test()
        .when_action(BoardAction::UpdateTask {
            task_id: FIX,
            params: UpdateTaskParams {
                title: None,
                name: Some("regression".into()),
            },
        })
        .then_transition(|before, after| {
            let task = after.task(&FIX).unwrap();
            assert_eq!((task.title.as_str(), task.name.as_str()), ("Fix", "regression"));
            assert_distinct_arc(before.task(&FIX).unwrap(), task);
            assert_task_kept(before, after, TEST);
            assert_column_kept(before, after, TODO);
            assert_board_kept(before, after);
        })
        .run();
}

#[test]
fn empty_task_update_changes_nothing() {
    board_test()
        .when_action(BoardAction::UpdateTask {
            task_id: FIX,
            params: UpdateTaskParams::default(),
        })
        .then_transition(|before, after| {
            assert_task_kept(before, after, FIX);
        })
        .run();
}

#[test]
fn move_task_across_columns_replaces_both_columns() {
    board_test()
        .when_action(BoardAction::MoveTask {
            task_id: FIX,
            params: MoveTaskParams {
                column_id: DONE,
                position: 1.5,
            },
        })
        .then_transition(|before, after| {
            let moved = after.task(&FIX).unwrap();
            assert_eq!((moved.column_id, moved.position), (DONE, 1.5));
            assert_eq!(after.task_ids_of(&TODO), [TEST]);
            assert_eq!(after.task_ids_of(&DONE), [SHIP, TaskId::new(201), FIX]);
            assert_column_replaced(before, after, TODO);
            assert_column_replaced(before, after, DONE);
            assert_task_kept(before, after, TEST);
            assert_task_kept(before, after, SHIP);
            assert_board_kept(before, after);
        })
        .run();
}

#[test]
fn move_task_within_a_column_keeps_one_entry() {
    board_test()
        .when_action(BoardAction::MoveTask {
            task_id: FIX,
            params: MoveTaskParams {
                column_id: TODO,
                position: 9.0,
            },
        })
        .then_transition(|before, after| {
            assert_eq!(after.task_ids_of(&TODO), [TEST, FIX]);
            assert_column_replaced(before, after, TODO);
            assert_column_kept(before, after, DONE);
        })
        .run();
}

#[test]
fn delete_task_replaces_its_column() {
    board_test()
        .when_action(BoardAction::DeleteTask { task_id: TEST })
        .then_transition(|before, after| {
            assert!(!after.contains_task(&TEST));
            assert_eq!(after.task_ids_of(&TODO), [FIX]);
            assert_column_replaced(before, after, TODO);
            assert_task_kept(before, after, FIX);
            assert_column_kept(before, after, DONE);
        })
        .run();
}

#[test]
fn missing_targets_are_rejected() {
    board_test()
        .when_action(BoardAction::DeleteTask {
            task_id: TaskId::new(404),
        })
        .then_error(|error| assert_eq!(*error, BoardError::TaskNotFound(TaskId::new(404))))
        .run();

    board_test()
        .when_action(BoardAction::MoveTask {
            task_id: FIX,
            params: MoveTaskParams {
                column_id: ColumnId::new(404),
                position: 1.0,
            },
        })
        .then_error(|error| assert_eq!(*error, BoardError::ColumnNotFound(ColumnId::new(404))))
        .run();

    board_test()
        .when_action(BoardAction::UpdateBoard {
            board_id: BoardId::new(404),
            params: BoardParams::new("Nope"),
        })
        .then_error(|error| assert_eq!(*error, BoardError::BoardNotFound(BoardId::new(404))))
        .run();
}

#[test]
fn blank_task_title_is_rejected() {
    board_test()
        .when_action(BoardAction::AddTask {
            column_id: TODO,
            params: AddTaskParams::new(" ", "bug"),
        })
        .then_error(|error| assert_eq!(*error, BoardError::EmptyTitle))
        .run();
}

#[test]
fn actions_round_trip_through_json() {
    let action = BoardAction::MoveTask {
        task_id: FIX,
        params: MoveTaskParams {
            column_id: DONE,
            position: 2.0,
        },
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["type"], "move_task");
    let back: BoardAction = serde_json::from_value(json).unwrap();
    assert_eq!(back, action);
}
