use chrono::Local;
use serde::{Deserialize, Serialize};

/// Display format for [`Note::created_at`].
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A short text note owned by a single user.
///
/// Ids are only unique within the owner's collection. They are assigned at
/// creation time by the store (see [`IdStrategy`](crate::store::IdStrategy)),
/// so a deleted note's id can show up again on a later note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: u32,
    pub title: String,
    /// Body text. May be empty.
    #[serde(default)]
    pub content: String,
    /// Local wall-clock creation time, already formatted for display.
    pub created_at: String,
    #[serde(default)]
    pub completed: bool,
}

impl Note {
    /// Build a fresh, not yet completed note stamped with the current local time.
    pub fn new(id: u32, input: NewNote) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            created_at: Local::now().format(CREATED_AT_FORMAT).to_string(),
            completed: false,
        }
    }

    /// Merge the provided fields into this note. Absent fields are left as they are.
    pub fn apply(&mut self, changes: &UpdateNoteInput) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
    }
}

/// Input for creating a note. The store assigns the id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Field changes merged into an existing note.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateNoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateNoteInput {
    pub fn completed() -> Self {
        Self {
            completed: Some(true),
            ..Self::default()
        }
    }
}
