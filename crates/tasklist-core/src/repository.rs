//! Validated CRUD operations over task records.
//!
//! Every function takes an open [`Session`] as its first argument;
//! session lifecycle belongs to the caller. Mutating calls commit the
//! session before returning, so one call is exactly one transaction:
//! on any failure the session is dropped uncommitted and rolls back.

use rusqlite::{params, OptionalExtension};

use crate::error::{Result, TaskError};
use crate::storage::Session;
use crate::task::{SortKey, Task, TaskId, TaskPatch, TITLE_MAX_CHARS};

/// Terminal outcome of a delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row was removed; the snapshot is the task as it stood.
    Deleted(Task),
    /// The confirmation callback declined; the row is untouched.
    Cancelled(Task),
}

fn validate_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(TaskError::Validation("title must not be empty".into()));
    }
    let chars = title.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(TaskError::Validation(format!(
            "title is {chars} characters long, maximum is {TITLE_MAX_CHARS}"
        )));
    }
    Ok(())
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
    })
}

fn fetch(session: &Session<'_>, id: TaskId) -> Result<Option<Task>> {
    let task = session
        .tx()?
        .query_row(
            "SELECT id, title, description, completed FROM task WHERE id = ?1",
            [id],
            row_to_task,
        )
        .optional()?;
    Ok(task)
}

/// Insert a new task with the given title and optional description.
/// Commits the session and returns the stored task, id included.
pub fn create(session: &mut Session<'_>, title: &str, description: Option<&str>) -> Result<Task> {
    tracing::debug!(title, "creating task");
    validate_title(title)?;
    session.tx()?.execute(
        "INSERT INTO task (title, description, completed) VALUES (?1, ?2, 0)",
        params![title, description],
    )?;
    let id = session.tx()?.last_insert_rowid();
    let task = fetch(session, id)?.ok_or(TaskError::NotFound(id))?;
    session.commit()?;
    tracing::debug!(id = task.id, "task created");
    Ok(task)
}

/// Look up a single task by id. Read-only; never commits.
pub fn get_by_id(session: &Session<'_>, id: TaskId) -> Result<Task> {
    tracing::debug!(id, "fetching task");
    fetch(session, id)?.ok_or(TaskError::NotFound(id))
}

/// All tasks ordered ascending by `sort`, with id as the stable
/// secondary key. `reversed` reverses the whole ordered sequence.
/// An empty store yields an empty vec, not an error.
pub fn list_all(session: &Session<'_>, sort: SortKey, reversed: bool) -> Result<Vec<Task>> {
    tracing::debug!(?sort, reversed, "listing tasks");
    let sql = format!(
        "SELECT id, title, description, completed FROM task ORDER BY {} ASC, id ASC",
        sort.column()
    );
    let tx = session.tx()?;
    let mut stmt = tx.prepare(&sql)?;
    let mut tasks = stmt
        .query_map([], row_to_task)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if reversed {
        tasks.reverse();
    }
    tracing::debug!(count = tasks.len(), "tasks listed");
    Ok(tasks)
}

/// Apply the set fields of `patch` to task `id`, leaving `None`
/// fields untouched. Commits and returns the refreshed task.
pub fn update(session: &mut Session<'_>, id: TaskId, patch: TaskPatch) -> Result<Task> {
    tracing::debug!(id, ?patch, "updating task");
    let current = fetch(session, id)?.ok_or(TaskError::NotFound(id))?;

    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    let title = patch.title.unwrap_or(current.title);
    let description = patch.description.or(current.description);
    let completed = patch.completed.unwrap_or(current.completed);

    session.tx()?.execute(
        "UPDATE task SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4",
        params![title, description, completed, id],
    )?;
    let task = fetch(session, id)?.ok_or(TaskError::NotFound(id))?;
    session.commit()?;
    tracing::debug!(id, "task updated");
    Ok(task)
}

/// Remove task `id`. When a confirmation callback is supplied it is
/// asked first; a declined confirmation leaves the row in place and
/// is reported as [`DeleteOutcome::Cancelled`], not an error. On
/// deletion the pre-deletion snapshot is returned for display.
pub fn delete(
    session: &mut Session<'_>,
    id: TaskId,
    confirm: Option<&mut dyn FnMut(&Task) -> bool>,
) -> Result<DeleteOutcome> {
    tracing::debug!(id, interactive = confirm.is_some(), "deleting task");
    let task = fetch(session, id)?.ok_or(TaskError::NotFound(id))?;

    if let Some(confirm) = confirm {
        if !confirm(&task) {
            tracing::info!(id, "deletion cancelled by user");
            session.rollback()?;
            return Ok(DeleteOutcome::Cancelled(task));
        }
    }

    session.tx()?.execute("DELETE FROM task WHERE id = ?1", [id])?;
    session.commit()?;
    tracing::debug!(id, "task deleted");
    Ok(DeleteOutcome::Deleted(task))
}

/// Mark task `id` completed. Idempotent: completing an already
/// completed task succeeds and reports `completed == true` again.
pub fn complete(session: &mut Session<'_>, id: TaskId) -> Result<Task> {
    update(session, id, TaskPatch::completed(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageEngine;

    fn engine() -> StorageEngine {
        StorageEngine::open_in_memory().unwrap()
    }

    fn seed(engine: &mut StorageEngine, title: &str, description: Option<&str>) -> Task {
        let mut session = engine.session().unwrap();
        create(&mut session, title, description).unwrap()
    }

    fn task_count(engine: &mut StorageEngine) -> i64 {
        let session = engine.session().unwrap();
        let count = session
            .tx()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM task", [], |row| row.get(0))
            .unwrap();
        count
    }

    #[test]
    fn create_then_get_round_trip() {
        let mut engine = engine();
        let created = seed(&mut engine, "Buy milk", Some("two liters"));
        assert!(created.id > 0);
        assert!(!created.completed);

        let session = engine.session().unwrap();
        let fetched = get_by_id(&session, created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Buy milk");
        assert_eq!(fetched.description.as_deref(), Some("two liters"));
    }

    #[test]
    fn create_without_description() {
        let mut engine = engine();
        let created = seed(&mut engine, "Walk the dog", None);
        assert_eq!(created.description, None);
    }

    #[test]
    fn create_assigns_distinct_increasing_ids() {
        let mut engine = engine();
        let first = seed(&mut engine, "one", None);
        let second = seed(&mut engine, "two", None);
        assert!(second.id > first.id);
    }

    #[test]
    fn create_rejects_empty_title_and_persists_nothing() {
        let mut engine = engine();
        {
            let mut session = engine.session().unwrap();
            let err = create(&mut session, "", None).unwrap_err();
            assert!(matches!(err, TaskError::Validation(_)));
        }
        assert_eq!(task_count(&mut engine), 0);
    }

    #[test]
    fn create_rejects_overlong_title_and_persists_nothing() {
        let mut engine = engine();
        let long = "x".repeat(TITLE_MAX_CHARS + 1);
        {
            let mut session = engine.session().unwrap();
            let err = create(&mut session, &long, None).unwrap_err();
            assert!(matches!(err, TaskError::Validation(_)));
        }
        assert_eq!(task_count(&mut engine), 0);
    }

    #[test]
    fn create_accepts_title_at_the_limit() {
        let mut engine = engine();
        let edge = "x".repeat(TITLE_MAX_CHARS);
        let created = seed(&mut engine, &edge, None);
        assert_eq!(created.title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let mut engine = engine();
        let accented = "é".repeat(TITLE_MAX_CHARS);
        let created = seed(&mut engine, &accented, None);
        assert_eq!(created.title, accented);
    }

    #[test]
    fn get_missing_fails_not_found() {
        let mut engine = engine();
        let session = engine.session().unwrap();
        let err = get_by_id(&session, 99).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(99)));
    }

    #[test]
    fn mutations_on_missing_id_fail_and_leave_store_unchanged() {
        let mut engine = engine();
        seed(&mut engine, "survivor", None);

        {
            let mut session = engine.session().unwrap();
            let err = update(&mut session, 99, TaskPatch::completed(true)).unwrap_err();
            assert!(matches!(err, TaskError::NotFound(99)));
        }
        {
            let mut session = engine.session().unwrap();
            let err = delete(&mut session, 99, None).unwrap_err();
            assert!(matches!(err, TaskError::NotFound(99)));
        }
        {
            let mut session = engine.session().unwrap();
            let err = complete(&mut session, 99).unwrap_err();
            assert!(matches!(err, TaskError::NotFound(99)));
        }
        assert_eq!(task_count(&mut engine), 1);
    }

    #[test]
    fn update_applies_only_provided_fields() {
        let mut engine = engine();
        let created = seed(&mut engine, "draft", Some("keep me"));

        let mut session = engine.session().unwrap();
        let patch = TaskPatch {
            title: Some("final".into()),
            ..TaskPatch::default()
        };
        let updated = update(&mut session, created.id, patch).unwrap();
        assert_eq!(updated.title, "final");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert!(!updated.completed);
    }

    #[test]
    fn update_accepts_empty_string_description() {
        let mut engine = engine();
        let created = seed(&mut engine, "task", Some("old text"));

        let mut session = engine.session().unwrap();
        let patch = TaskPatch {
            description: Some(String::new()),
            ..TaskPatch::default()
        };
        let updated = update(&mut session, created.id, patch).unwrap();
        assert_eq!(updated.description.as_deref(), Some(""));
    }

    #[test]
    fn update_rejects_invalid_title_without_touching_the_row() {
        let mut engine = engine();
        let created = seed(&mut engine, "keep", None);

        {
            let mut session = engine.session().unwrap();
            let patch = TaskPatch {
                title: Some(String::new()),
                completed: Some(true),
                ..TaskPatch::default()
            };
            let err = update(&mut session, created.id, patch).unwrap_err();
            assert!(matches!(err, TaskError::Validation(_)));
        }

        let session = engine.session().unwrap();
        let unchanged = get_by_id(&session, created.id).unwrap();
        assert_eq!(unchanged.title, "keep");
        assert!(!unchanged.completed);
    }

    #[test]
    fn delete_without_confirmation_removes_the_row() {
        let mut engine = engine();
        let created = seed(&mut engine, "doomed", None);

        let mut session = engine.session().unwrap();
        let outcome = delete(&mut session, created.id, None).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted(created));
        drop(session);
        assert_eq!(task_count(&mut engine), 0);
    }

    #[test]
    fn declined_confirmation_cancels_and_keeps_the_row() {
        let mut engine = engine();
        let created = seed(&mut engine, "spared", None);

        {
            let mut session = engine.session().unwrap();
            let mut decline = |_: &Task| false;
            let outcome = delete(&mut session, created.id, Some(&mut decline)).unwrap();
            assert_eq!(outcome, DeleteOutcome::Cancelled(created.clone()));
        }
        assert_eq!(task_count(&mut engine), 1);
    }

    #[test]
    fn accepted_confirmation_deletes_and_passes_the_snapshot() {
        let mut engine = engine();
        let created = seed(&mut engine, "condemned", Some("details"));

        {
            let mut session = engine.session().unwrap();
            let mut seen_title = String::new();
            let mut accept = |task: &Task| {
                seen_title = task.title.clone();
                true
            };
            let outcome = delete(&mut session, created.id, Some(&mut accept)).unwrap();
            assert_eq!(outcome, DeleteOutcome::Deleted(created));
            assert_eq!(seen_title, "condemned");
        }
        assert_eq!(task_count(&mut engine), 0);
    }

    #[test]
    fn list_on_empty_store_is_ok_and_empty() {
        let mut engine = engine();
        let session = engine.session().unwrap();
        let tasks = list_all(&session, SortKey::Id, false).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn list_orders_by_title() {
        let mut engine = engine();
        seed(&mut engine, "cherry", None);
        seed(&mut engine, "apple", None);
        seed(&mut engine, "banana", None);

        let session = engine.session().unwrap();
        let tasks = list_all(&session, SortKey::Title, false).unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["apple", "banana", "cherry"]);
    }

    #[test]
    fn reversed_list_is_the_exact_reverse() {
        let mut engine = engine();
        seed(&mut engine, "cherry", None);
        seed(&mut engine, "apple", None);
        seed(&mut engine, "banana", None);

        let session = engine.session().unwrap();
        let forward = list_all(&session, SortKey::Title, false).unwrap();
        let backward = list_all(&session, SortKey::Title, true).unwrap();
        let mut expected = forward;
        expected.reverse();
        assert_eq!(backward, expected);
    }

    #[test]
    fn completed_sort_breaks_ties_by_id() {
        let mut engine = engine();
        let a = seed(&mut engine, "a", None);
        let b = seed(&mut engine, "b", None);
        let c = seed(&mut engine, "c", None);
        {
            let mut session = engine.session().unwrap();
            complete(&mut session, b.id).unwrap();
        }

        let session = engine.session().unwrap();
        let tasks = list_all(&session, SortKey::Completed, false).unwrap();
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, [a.id, c.id, b.id]);
    }

    #[test]
    fn complete_is_idempotent() {
        let mut engine = engine();
        let created = seed(&mut engine, "repeatable", None);

        for _ in 0..2 {
            let mut session = engine.session().unwrap();
            let task = complete(&mut session, created.id).unwrap();
            assert!(task.completed);
        }
    }

    #[test]
    fn end_to_end_scenario() {
        let mut engine = engine();

        let created = seed(&mut engine, "Buy milk", None);
        assert_eq!(created.id, 1);
        assert!(!created.completed);

        {
            let mut session = engine.session().unwrap();
            let updated = update(&mut session, 1, TaskPatch::completed(true)).unwrap();
            assert_eq!(updated.title, "Buy milk");
            assert!(updated.completed);
        }

        {
            let session = engine.session().unwrap();
            let tasks = list_all(&session, SortKey::Id, false).unwrap();
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].id, 1);
        }

        {
            let mut session = engine.session().unwrap();
            let outcome = delete(&mut session, 1, None).unwrap();
            assert!(matches!(outcome, DeleteOutcome::Deleted(_)));
        }

        let session = engine.session().unwrap();
        let err = get_by_id(&session, 1).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(1)));
    }
}
