//! Write-side errors.
//!
//! Reads never fail: absence is an `Option`. Only a rejected write produces
//! an error, and a rejected write leaves the published snapshot untouched.

use crate::id::{BoardId, ColumnId, TaskId};
use thiserror::Error;

/// Why [`BoardReducer`](crate::BoardReducer) rejected an action
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    /// The target board does not exist
    #[error("Board {0} not found")]
    BoardNotFound(BoardId),

    /// The target column does not exist
    #[error("Column {0} not found")]
    ColumnNotFound(ColumnId),

    /// The target task does not exist
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    /// A title was empty after trimming
    #[error("Title cannot be empty")]
    EmptyTitle,

    /// A position was NaN or infinite
    #[error("Invalid position: {0}")]
    InvalidPosition(f64),
}
