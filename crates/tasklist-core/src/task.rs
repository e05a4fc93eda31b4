//! Core task types.

use serde::{Deserialize, Serialize};

/// A unique task identifier, assigned by the store.
pub type TaskId = i64;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 30;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Fields to change in an update call.
///
/// `None` means "leave the stored value alone". A `Some` empty string
/// for the description is a real value, not an absence marker, so
/// callers can blank a description without clearing it by accident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Patch that only changes the completion flag.
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Self::default()
        }
    }
}

/// Sort key for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Id,
    Title,
    Completed,
}

impl SortKey {
    /// Column backing this key. Fixed names only; never built from
    /// user input.
    pub(crate) fn column(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Title => "title",
            SortKey::Completed => "completed",
        }
    }
}
