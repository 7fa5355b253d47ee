//! # Composable Board Testing
//!
//! Testing utilities and helpers for Composable Board.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A fixture builder for entity store snapshots
//! - Property-based testing strategies
//! - Assertion helpers for reference identity
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```
//! use composable_board_core::{BoardAction, BoardId, UpdateColumnParams, ColumnId, BoardReducer};
//! use composable_board_testing::{BoardFixture, ReducerTest, test_environment};
//!
//! let store = BoardFixture::new()
//!     .board(1, "Sprint")
//!     .column(2, "Todo", 1.0)
//!     .build();
//!
//! ReducerTest::new(BoardReducer::new())
//!     .with_env(test_environment())
//!     .given_state(store)
//!     .when_action(BoardAction::UpdateColumn {
//!         column_id: ColumnId::new(2),
//!         params: UpdateColumnParams { title: Some("Doing".into()) },
//!     })
//!     .then_state(|state| {
//!         assert_eq!(state.column(&ColumnId::new(2)).map(|c| c.title.as_str()), Some("Doing"));
//!         assert!(state.contains_board(&BoardId::new(1)));
//!     })
//!     .run();
//! ```

pub mod fixtures;

use composable_board_core::environment::IdGenerator;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::IdGenerator;
    use composable_board_core::BoardEnvironment;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Id generator that hands out a scripted sequence first
    ///
    /// Once the script is exhausted it keeps counting upward from the last
    /// scripted id, so tests can name the ids they care about and ignore the
    /// rest.
    ///
    /// # Example
    ///
    /// ```
    /// use composable_board_testing::mocks::ScriptedIds;
    /// use composable_board_core::environment::IdGenerator;
    ///
    /// let ids = ScriptedIds::new([10, 20]);
    /// assert_eq!(ids.next_id(), 10);
    /// assert_eq!(ids.next_id(), 20);
    /// assert_eq!(ids.next_id(), 21);
    /// ```
    #[derive(Debug, Default)]
    pub struct ScriptedIds {
        state: Mutex<ScriptState>,
    }

    #[derive(Debug, Default)]
    struct ScriptState {
        script: VecDeque<u64>,
        last: u64,
    }

    impl ScriptedIds {
        /// Create a generator that yields `ids` in order
        #[must_use]
        pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
            Self {
                state: Mutex::new(ScriptState {
                    script: ids.into_iter().collect(),
                    last: 0,
                }),
            }
        }
    }

    impl IdGenerator for ScriptedIds {
        fn next_id(&self) -> u64 {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let id = state.script.pop_front().unwrap_or(state.last + 1);
            state.last = id;
            id
        }
    }

    /// Create a board environment with ids 1000, 1001, ... for tests
    ///
    /// The starting point is far above the ids fixtures usually pick by hand.
    #[must_use]
    pub fn test_environment() -> BoardEnvironment {
        BoardEnvironment::new(Arc::new(ScriptedIds::new([1000])))
    }
}

/// Reference-identity assertions
pub mod assertions {
    use std::fmt::Debug;
    use std::sync::Arc;

    /// Assert that two `Arc`s point at the same allocation
    ///
    /// # Panics
    ///
    /// Panics if the pointers differ.
    #[allow(clippy::panic)] // Test assertion
    #[track_caller]
    pub fn assert_same_arc<T: ?Sized + Debug>(left: &Arc<T>, right: &Arc<T>) {
        assert!(
            Arc::ptr_eq(left, right),
            "Expected the same reference, got distinct allocations:\n left: {left:?}\nright: {right:?}"
        );
    }

    /// Assert that two `Arc`s point at different allocations
    ///
    /// # Panics
    ///
    /// Panics if the pointers are equal.
    #[allow(clippy::panic)] // Test assertion
    #[track_caller]
    pub fn assert_distinct_arc<T: ?Sized + Debug>(left: &Arc<T>, right: &Arc<T>) {
        assert!(
            !Arc::ptr_eq(left, right),
            "Expected a new reference, got the same allocation: {left:?}"
        );
    }

    /// Optional variant of [`assert_same_arc`]; two absent values are the same
    ///
    /// # Panics
    ///
    /// Panics if exactly one side is absent or the pointers differ.
    #[allow(clippy::panic)] // Test assertion
    #[track_caller]
    pub fn assert_same_option_arc<T: ?Sized + Debug>(left: Option<&Arc<T>>, right: Option<&Arc<T>>) {
        match (left, right) {
            (Some(left), Some(right)) => assert_same_arc(left, right),
            (None, None) => {}
            (left, right) => panic!("Expected both present or both absent: {left:?} vs {right:?}"),
        }
    }
}

/// Property-based testing utilities using proptest
pub mod properties {
    use crate::fixtures::BoardFixture;
    use composable_board_core::EntityStore;
    use proptest::prelude::*;

    /// Finite positions drawn from a small set so ties are common
    ///
    /// Zero comes out as either `0.0` or `-0.0`.
    pub fn position() -> impl Strategy<Value = f64> {
        (0u8..6, any::<bool>()).prop_map(|(p, negative)| match (p, negative) {
            (0, true) => -0.0,
            _ => f64::from(p),
        })
    }

    /// A position vector with plenty of duplicates
    pub fn positions(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(position(), 0..=max_len)
    }

    /// Shape of a generated board: one entry per column, holding task positions
    pub fn board_shape() -> impl Strategy<Value = Vec<Vec<f64>>> {
        prop::collection::vec(positions(5), 1..5)
    }

    /// Build a single-board store from a shape
    ///
    /// The board has id 1; column `c` has id `100 + c` and position `c`;
    /// task `t` of column `c` has id `1000 + 100 * c + t`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Small indexes
    pub fn store_from_shape(shape: &[Vec<f64>]) -> EntityStore {
        let mut fixture = BoardFixture::new().board(1, "Generated");
        for (c, tasks) in shape.iter().enumerate() {
            let c = c as u64;
            fixture = fixture.column(100 + c, format!("Column {c}"), c as f64);
            for (t, position) in tasks.iter().enumerate() {
                let id = 1000 + 100 * c + t as u64;
                fixture = fixture.task(id, format!("Task {id}"), "generated", *position);
            }
        }
        fixture.build()
    }

    /// Stores generated from [`board_shape`]
    pub fn entity_store() -> impl Strategy<Value = EntityStore> {
        board_shape().prop_map(|shape| store_from_shape(&shape))
    }
}

// Re-export commonly used items
pub use assertions::{assert_distinct_arc, assert_same_arc, assert_same_option_arc};
pub use fixtures::BoardFixture;
pub use mocks::{ScriptedIds, test_environment};
pub use reducer_test::ReducerTest;
