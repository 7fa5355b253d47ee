//! Memoized board views for Composable Board.
//!
//! # Overview
//!
//! This crate is the read side. It turns a normalized
//! [`EntityStore`](composable_board_core::EntityStore) snapshot into nested,
//! render-ready views and keeps them referentially stable between reads:
//!
//! - **`memo`**: per-key single-slot memoization (`MemoSelector`)
//! - **`selectors`**: the composition engine (`BoardViews`)
//! - **`ordering`**: stable position sort and move-target position lists
//! - **`view`**: the view shapes handed to renderers
//!
//! # Data Flow
//!
//! ```text
//! EntityStore ──▶ tasks_of_column ──▶ nested_column ──▶ nested_board
//!                       │                                   │
//!                       ▼                                   ▼
//!              task position list                 column position list
//! ```
//!
//! Every arrow is a memoized selector. A selector returns the *same* `Arc` as
//! its previous call for the same key while all of its inputs are the same
//! `Arc`s, so a renderer can skip any subtree whose pointer did not change.
//!
//! # Example
//!
//! ```
//! use composable_board_core::{Board, BoardId, EntityStore};
//! use composable_board_projections::BoardViews;
//! use std::sync::Arc;
//!
//! let mut store = EntityStore::new();
//! store.insert_board(Board::new(BoardId::new(1), "Roadmap"));
//!
//! let views = BoardViews::new();
//! let first = views.select_nested_board_by_id(&store, BoardId::new(1));
//! let second = views.select_nested_board_by_id(&store, BoardId::new(1));
//!
//! match (first, second) {
//!     (Some(a), Some(b)) => assert!(Arc::ptr_eq(&a, &b)),
//!     _ => unreachable!(),
//! }
//! ```

pub mod identity;
pub mod memo;
pub mod ordering;
pub mod selectors;
pub mod view;

// Re-export main types for convenience
pub use identity::Identity;
pub use memo::{CacheStats, MemoSelector, SelectorId, ViewCacheConfig};
pub use ordering::{PositionEntry, column_position_list, task_position_list};
pub use selectors::{BoardViews, PositionList};
pub use view::{NestedBoardView, NestedColumnView, TaskList, TaskView};
