//! # Composable Board Runtime
//!
//! Runtime implementation for Composable Board.
//!
//! This crate provides the Store: the single writer of the entity store
//! snapshot. It serializes actions through a reducer, commits each accepted
//! result as a new immutable snapshot, keeps an attached view cache pruned,
//! and tells observers about every commit.
//!
//! ## Core Components
//!
//! - **Store**: Owns the current snapshot and serializes writers
//! - **Observers**: Callbacks invoked with each committed snapshot
//! - **Metrics**: Names and descriptions of the emitted metrics
//!
//! ## Example
//!
//! ```
//! use composable_board_core::{BoardAction, BoardEnvironment, BoardParams, BoardReducer, EntityStore};
//! use composable_board_runtime::Store;
//!
//! let store = Store::new(EntityStore::new(), BoardReducer::new(), BoardEnvironment::sequential());
//!
//! // Send an action
//! store
//!     .send(BoardAction::AddBoard { params: BoardParams::new("Roadmap") })
//!     .unwrap();
//!
//! // Read state
//! let boards = store.state(|s| s.board_count());
//! assert_eq!(boards, 1);
//! ```

use std::sync::Arc;

/// Metric names and descriptions
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The reducer rejected the action
        ///
        /// The committed snapshot is unchanged and observers were not
        /// notified.
        #[error("Action {action} rejected: {reason}")]
        Rejected {
            /// Label of the rejected action
            action: String,
            /// The reducer's reason
            reason: String,
        },
    }
}

pub use error::StoreError;

/// Configuration for the Store
///
/// # Example
///
/// ```
/// use composable_board_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_prune_views(false)
///     .with_notify_observers(true);
/// assert!(!config.prune_views);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Prune the attached view cache after every commit
    pub prune_views: bool,
    /// Invoke observers after every commit
    pub notify_observers: bool,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(prune_views: bool, notify_observers: bool) -> Self {
        Self {
            prune_views,
            notify_observers,
        }
    }

    /// Enable or disable view cache pruning
    #[must_use]
    pub const fn with_prune_views(mut self, enabled: bool) -> Self {
        self.prune_views = enabled;
        self
    }

    /// Enable or disable observer notification
    #[must_use]
    pub const fn with_notify_observers(mut self, enabled: bool) -> Self {
        self.notify_observers = enabled;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Handle returned by [`Store::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// The raw value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Callback invoked with each committed snapshot
pub type Observer<S> = Arc<dyn Fn(&Arc<S>) + Send + Sync>;

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, Observer, StoreConfig, StoreError, SubscriptionId};
    use crate::metrics::StoreMetrics;
    use composable_board_core::EntityStore;
    use composable_board_core::reducer::Reducer;
    use composable_board_projections::BoardViews;
    use std::fmt::Display;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
    use std::time::Instant;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (an `Arc` snapshot behind a `RwLock`, swapped on commit)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Commit hooks and observers
    ///
    /// Readers take the current `Arc` and keep it as long as they like; a
    /// commit never changes a snapshot someone already holds.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: RwLock<Arc<S>>,
        write_gate: Mutex<()>,
        reducer: R,
        environment: E,
        config: StoreConfig,
        commit_hooks: Mutex<Vec<Observer<S>>>,
        observers: Mutex<Vec<(SubscriptionId, Observer<S>)>>,
        next_subscription: AtomicU64,
        revision: AtomicU64,
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        R::Error: Display,
        S: Clone,
        A: std::fmt::Debug,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            Self {
                state: RwLock::new(Arc::new(initial_state)),
                write_gate: Mutex::new(()),
                reducer,
                environment,
                config,
                commit_hooks: Mutex::new(Vec::new()),
                observers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
                revision: AtomicU64::new(0),
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> StoreConfig {
            self.config
        }

        /// The injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action through the reducer
        ///
        /// The reducer works on a private copy of the current snapshot. If it
        /// accepts the action, the copy becomes the new snapshot, commit hooks
        /// run, and then observers are called in subscription order. If it
        /// rejects the action, nothing changes.
        ///
        /// Writers are serialized, so observers see commits one at a time and
        /// in commit order.
        ///
        /// # Deadlocks
        ///
        /// Observers and hooks run while the write gate is held; calling
        /// `send` from inside one blocks forever.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Rejected`] when the reducer rejects the action.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&self, action: A) -> Result<Arc<S>, StoreError> {
            let _gate = lock(&self.write_gate);
            let label = format!("{action:?}");

            let mut next = S::clone(&self.snapshot());
            let start = Instant::now();
            let outcome = {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();
                self.reducer.reduce(&mut next, action, &self.environment)
            };
            StoreMetrics::record_command(start.elapsed(), outcome.is_ok());

            if let Err(error) = outcome {
                tracing::debug!(%error, "Snapshot left unchanged");
                return Err(StoreError::Rejected {
                    action: label,
                    reason: error.to_string(),
                });
            }

            let next = Arc::new(next);
            *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
            let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
            tracing::debug!(revision, "Snapshot committed");

            let hooks: Vec<Observer<S>> = lock(&self.commit_hooks).clone();
            for hook in &hooks {
                hook(&next);
            }

            if self.config.notify_observers {
                let observers: Vec<Observer<S>> =
                    lock(&self.observers).iter().map(|(_, observer)| Arc::clone(observer)).collect();
                tracing::trace!(observers = observers.len(), "Notifying observers");
                for observer in &observers {
                    observer(&next);
                }
            }

            Ok(next)
        }

        /// The current snapshot
        #[must_use]
        pub fn snapshot(&self) -> Arc<S> {
            Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let task_count = store.state(|s| s.task_count());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            f(&state)
        }

        /// Number of commits so far
        #[must_use]
        pub fn revision(&self) -> u64 {
            self.revision.load(Ordering::Acquire)
        }

        /// Register a callback for every future commit
        pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
        where
            F: Fn(&Arc<S>) + Send + Sync + 'static,
        {
            let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
            lock(&self.observers).push((id, Arc::new(observer)));
            tracing::debug!(subscription = %id, "Observer subscribed");
            id
        }

        /// Remove an observer; returns whether it was registered
        pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
            let mut observers = lock(&self.observers);
            let before = observers.len();
            observers.retain(|(existing, _)| *existing != id);
            let removed = observers.len() != before;
            if removed {
                tracing::debug!(subscription = %id, "Observer unsubscribed");
            }
            removed
        }

        /// Number of registered observers
        #[must_use]
        pub fn observer_count(&self) -> usize {
            lock(&self.observers).len()
        }

        fn add_commit_hook(&self, hook: Observer<S>) {
            lock(&self.commit_hooks).push(hook);
        }
    }

    impl<A, E, R> Store<EntityStore, A, E, R>
    where
        R: Reducer<State = EntityStore, Action = A, Environment = E>,
        R::Error: Display,
        A: std::fmt::Debug,
    {
        /// Keep `views` free of slots for deleted entities
        ///
        /// With [`StoreConfig::prune_views`] enabled, every commit prunes the
        /// cache before observers run, so observers re-selecting views never
        /// pay for dead slots. Slots of entities that still exist are never
        /// touched. With pruning disabled this only logs.
        pub fn attach_views(&self, views: Arc<BoardViews>) {
            if !self.config.prune_views {
                tracing::debug!("View pruning disabled, cache attached without hook");
                return;
            }
            self.add_commit_hook(Arc::new(move |snapshot: &Arc<EntityStore>| {
                views.prune(snapshot);
            }));
        }
    }

    impl<S, A, E, R> std::fmt::Debug for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("config", &self.config)
                .field("revision", &self.revision.load(Ordering::Relaxed))
                .finish_non_exhaustive()
        }
    }
}

pub use store::Store;

/// Store specialised to the board reducer
pub type BoardStore = Store<
    composable_board_core::EntityStore,
    composable_board_core::BoardAction,
    composable_board_core::BoardEnvironment,
    composable_board_core::BoardReducer,
>;

#[cfg(test)]
mod tests {
    use super::*;
    use composable_board_core::{
        AddColumnParams, BoardAction, BoardEnvironment, BoardId, BoardParams, BoardReducer,
        EntityStore,
    };
    use std::sync::Mutex;

    fn store() -> BoardStore {
        Store::new(EntityStore::new(), BoardReducer::new(), BoardEnvironment::sequential())
    }

    #[test]
    fn test_store_creation() {
        let store = store();
        assert_eq!(store.revision(), 0);
        assert_eq!(store.state(EntityStore::board_count), 0);
        assert_eq!(store.config(), StoreConfig::default());
    }

    #[test]
    fn test_send_commits_new_snapshot() {
        let store = store();
        let before = store.snapshot();
        let committed = store
            .send(BoardAction::AddBoard {
                params: BoardParams::new("Roadmap"),
            })
            .unwrap_or_else(|_| Arc::clone(&before));

        assert!(!Arc::ptr_eq(&before, &committed));
        assert!(Arc::ptr_eq(&committed, &store.snapshot()));
        assert_eq!(store.revision(), 1);
        assert_eq!(before.board_count(), 0);
    }

    #[test]
    fn test_rejection_keeps_snapshot() {
        let store = store();
        let before = store.snapshot();
        let result = store.send(BoardAction::AddColumn {
            board_id: BoardId::new(9),
            params: AddColumnParams::new("Todo"),
        });

        assert!(matches!(result, Err(StoreError::Rejected { ref reason, .. }) if reason.contains("not found")));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let store = store();
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        let id = store.subscribe(move |_| {
            *counter.lock().unwrap_or_else(std::sync::PoisonError::into_inner) += 1;
        });

        let _ = store.send(BoardAction::AddBoard {
            params: BoardParams::new("One"),
        });
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        let _ = store.send(BoardAction::AddBoard {
            params: BoardParams::new("Two"),
        });

        assert_eq!(*seen.lock().unwrap_or_else(std::sync::PoisonError::into_inner), 1);
        assert_eq!(store.observer_count(), 0);
    }

    #[test]
    fn test_silenced_observers() {
        let store = Store::with_config(
            EntityStore::new(),
            BoardReducer::new(),
            BoardEnvironment::sequential(),
            StoreConfig::default().with_notify_observers(false),
        );
        let seen = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&seen);
        store.subscribe(move |_| {
            *flag.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = true;
        });

        let _ = store.send(BoardAction::AddBoard {
            params: BoardParams::new("Quiet"),
        });
        assert!(!*seen.lock().unwrap_or_else(std::sync::PoisonError::into_inner));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_subscription_id_display() {
        assert_eq!(SubscriptionId(7).to_string(), "sub-7");
    }
}
