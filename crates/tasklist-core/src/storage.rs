//! Storage engine: SQLite connection lifecycle and scoped sessions.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction};

use crate::error::{Result, TaskError};

/// Schema version recorded in the database. A stored version newer
/// than this one is an incompatible database and fails `open`.
const SCHEMA_VERSION: u32 = 1;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS task (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 30),
    description TEXT,
    completed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_task_title ON task(title);
CREATE INDEX IF NOT EXISTS idx_task_completed ON task(completed);
";

/// Owner of the backing database file and its single connection.
#[derive(Debug)]
pub struct StorageEngine {
    conn: Connection,
}

impl StorageEngine {
    /// Open (or create) the database at `path`, creating parent
    /// directories and the schema as needed. Idempotent; never
    /// destroys existing data.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    TaskError::StorageInit(format!("create {}: {e}", parent.display()))
                })?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| TaskError::StorageInit(format!("open {}: {e}", path.display())))?;
        Self::initialize(conn)
    }

    /// In-memory engine for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| TaskError::StorageInit(format!("open in-memory: {e}")))?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(CREATE_TABLES)
            .map_err(|e| TaskError::StorageInit(format!("create schema: {e}")))?;

        let stored: Option<u32> = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| TaskError::StorageInit(format!("read schema version: {e}")))?;

        match stored {
            None => {
                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    [SCHEMA_VERSION],
                )
                .map_err(|e| TaskError::StorageInit(format!("record schema version: {e}")))?;
            }
            Some(version) if version > SCHEMA_VERSION => {
                return Err(TaskError::StorageInit(format!(
                    "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
                )));
            }
            Some(_) => {}
        }

        tracing::debug!("storage engine initialized");
        Ok(Self { conn })
    }

    /// Begin a scoped transactional session. The session rolls its
    /// transaction back on drop unless committed.
    pub fn session(&mut self) -> Result<Session<'_>> {
        let tx = self.conn.transaction()?;
        Ok(Session { tx: Some(tx) })
    }
}

/// One transactional unit of work against the store.
///
/// Dropping an unfinished session rolls the transaction back, so
/// every exit path (return, error, panic unwind) releases it without
/// leaving partial changes behind.
pub struct Session<'engine> {
    tx: Option<Transaction<'engine>>,
}

impl<'engine> Session<'engine> {
    /// Durably persist all pending changes. A failed commit leaves
    /// the transaction rolled back.
    pub fn commit(&mut self) -> Result<()> {
        self.tx.take().ok_or(TaskError::SessionFinished)?.commit()?;
        Ok(())
    }

    /// Discard all pending changes.
    pub fn rollback(&mut self) -> Result<()> {
        self.tx.take().ok_or(TaskError::SessionFinished)?.rollback()?;
        Ok(())
    }

    pub(crate) fn tx(&self) -> Result<&Transaction<'engine>> {
        self.tx.as_ref().ok_or(TaskError::SessionFinished)
    }
}
