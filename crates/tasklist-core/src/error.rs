//! Error types for the task store.

use thiserror::Error;

use crate::task::TaskId;

/// Result type alias for task store operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Errors surfaced by the storage engine and task repository.
///
/// A declined delete confirmation is not represented here; it is the
/// [`crate::repository::DeleteOutcome::Cancelled`] value, a valid
/// terminal outcome rather than a failure.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A field failed validation; nothing was persisted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No task with the requested id exists.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The backing store could not be opened or created, or its
    /// schema is newer than this build understands.
    #[error("storage init failed: {0}")]
    StorageInit(String),

    /// An underlying SQLite operation failed. The enclosing
    /// transaction is rolled back, never left half-applied.
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// A session was used after it was committed or rolled back.
    #[error("session already finished")]
    SessionFinished,
}
