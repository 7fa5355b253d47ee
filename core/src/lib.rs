//! # Composable Board Core
//!
//! Core types for the Composable Board architecture.
//!
//! This crate provides the normalized entity model (boards → columns → tasks),
//! the immutable [`EntityStore`] snapshot that every read path receives, and
//! the write side that produces new snapshots.
//!
//! ## Core Concepts
//!
//! - **Entity**: A board, column or task, stored once and referenced by id
//! - **Snapshot**: An [`EntityStore`] value; readers never observe it changing
//! - **Action**: A write request (`AddColumn`, `MoveTask`, ...)
//! - **Reducer**: `(Snapshot, Action, Environment) → Snapshot'`
//! - **Environment**: Injected dependencies (id generation)
//!
//! ## Architecture Principles
//!
//! - Unidirectional Data Flow: store → selectors → views
//! - Copy-on-write entities: every change allocates a new `Arc`
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```
//! use composable_board_core::{
//!     BoardAction, BoardEnvironment, BoardParams, BoardReducer, EntityStore,
//!     reducer::Reducer,
//! };
//!
//! let env = BoardEnvironment::sequential();
//! let mut store = EntityStore::default();
//!
//! BoardReducer::new()
//!     .reduce(
//!         &mut store,
//!         BoardAction::AddBoard { params: BoardParams::new("Roadmap") },
//!         &env,
//!     )
//!     .unwrap();
//!
//! assert_eq!(store.board_count(), 1);
//! ```

pub mod action;
pub mod board_reducer;
pub mod entity;
pub mod error;
pub mod id;
pub mod position;
pub mod snapshot;

pub use action::{
    AddColumnParams, AddTaskParams, BoardAction, BoardParams, MoveColumnParams, MoveTaskParams,
    UpdateColumnParams, UpdateTaskParams,
};
pub use board_reducer::{BoardEnvironment, BoardReducer};
pub use entity::{Board, Column, Task};
pub use error::BoardError;
pub use id::{BoardId, ColumnId, TaskId};
pub use position::{Positioned, next_position, sort_by_position};
pub use snapshot::EntityStore;

/// Reducer module - The write-side abstraction
///
/// Reducers are the only writers of a snapshot. They receive a private copy
/// of the current snapshot and must follow the copy-on-write rule: replace an
/// entity's `Arc` instead of mutating through it. Selectors detect change by
/// pointer identity, so an in-place write produces stale views without any
/// error.
pub mod reducer {
    /// The Reducer trait - core abstraction for writes
    ///
    /// # Type Parameters
    ///
    /// - `State`: The snapshot type this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    /// - `Error`: Why an action was rejected
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CounterReducer {
    ///     type State = CounterState;
    ///     type Action = CounterAction;
    ///     type Environment = ();
    ///     type Error = CounterError;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut CounterState,
    ///         action: CounterAction,
    ///         _env: &(),
    ///     ) -> Result<(), CounterError> {
    ///         match action {
    ///             CounterAction::Increment => state.count += 1,
    ///         }
    ///         Ok(())
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// The rejection type
        type Error;

        /// Reduce an action into state changes
        ///
        /// On `Err` the caller discards `state`; implementations may leave it
        /// partially written.
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action is rejected.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<(), Self::Error>;
    }
}

/// Environment module - Dependency injection traits
///
/// All non-deterministic inputs of a reducer are abstracted behind traits and
/// injected via the Environment parameter.
pub mod environment {
    use crate::snapshot::EntityStore;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Source of fresh entity ids
    ///
    /// Ids are shared by all entity types, so a single counter is enough.
    ///
    /// # Examples
    ///
    /// ```
    /// use composable_board_core::environment::{IdGenerator, SequentialIdGenerator};
    ///
    /// let ids = SequentialIdGenerator::starting_at(7);
    /// assert_eq!(ids.next_id(), 7);
    /// assert_eq!(ids.next_id(), 8);
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Returns an id never returned before by this generator
        fn next_id(&self) -> u64;
    }

    /// Monotonic id generator backed by an atomic counter
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first id is `first`
        #[must_use]
        pub const fn starting_at(first: u64) -> Self {
            Self {
                next: AtomicU64::new(first),
            }
        }

        /// Create a generator that never collides with ids already in `store`
        #[must_use]
        pub fn after(store: &EntityStore) -> Self {
            Self::starting_at(store.max_id().map_or(1, |max| max.saturating_add(1)))
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::starting_at(1)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> u64 {
            self.next.fetch_add(1, Ordering::Relaxed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::environment::{IdGenerator, SequentialIdGenerator};
    use super::*;

    #[test]
    fn sequential_ids_skip_existing_entities() {
        let mut store = EntityStore::default();
        store.insert_board(Board::new(BoardId::new(41), "Existing"));

        let ids = SequentialIdGenerator::after(&store);
        assert_eq!(ids.next_id(), 42);
        assert_eq!(ids.next_id(), 43);
    }

    #[test]
    fn sequential_ids_start_at_one_for_empty_store() {
        let ids = SequentialIdGenerator::after(&EntityStore::default());
        assert_eq!(ids.next_id(), 1);
    }
}
