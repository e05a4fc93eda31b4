//! Task persistence and mutation layer for the tasklist CLI.
//!
//! The [`StorageEngine`] owns the SQLite file and hands out scoped
//! transactional [`Session`]s; the [`repository`] module applies
//! validated CRUD operations on top. No terminal I/O happens here:
//! callers render the returned values and drive any confirmation
//! prompt through an injected callback.

pub mod error;
pub mod repository;
pub mod storage;
pub mod task;

pub use error::{Result, TaskError};
pub use repository::DeleteOutcome;
pub use storage::{Session, StorageEngine};
pub use task::{SortKey, Task, TaskId, TaskPatch, TITLE_MAX_CHARS};
