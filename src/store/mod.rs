mod backing;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::*;

use backing::Backing;
pub use backing::Snapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("note store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize note store: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not determine data directory")]
    NoDataDir,
}

/// How the store picks the id of a newly created note.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `len(collection) + 1`. Ids of deleted notes can be handed out again,
    /// and can collide with a surviving note after a deletion.
    #[default]
    CollectionLength,
    /// `max(existing ids) + 1`. Never collides with a live note.
    Monotonic,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectionLength => "length",
            Self::Monotonic => "monotonic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "length" => Some(Self::CollectionLength),
            "monotonic" => Some(Self::Monotonic),
            _ => None,
        }
    }

    pub fn next_id(&self, notes: &[Note]) -> u32 {
        let base = match self {
            Self::CollectionLength => u32::try_from(notes.len()).unwrap_or(u32::MAX),
            Self::Monotonic => notes.iter().map(|n| n.id).max().unwrap_or(0),
        };
        base.saturating_add(1)
    }
}

/// Durable mapping from user id to that user's notes.
///
/// Every call reloads the full snapshot and every mutation rewrites it. Each
/// call holds the store lock for its whole read-modify-write, so calls never
/// interleave, for the same user or different ones. Clones share the lock.
#[derive(Clone)]
pub struct NoteStore {
    backing: Arc<Mutex<Backing>>,
    ids: IdStrategy,
}

impl NoteStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        tracing::debug!("Opening note store at {}", path.display());
        Ok(Self::with_backing(Backing::File(path)))
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Self {
        Self::with_backing(Backing::Memory(None))
    }

    fn with_backing(backing: Backing) -> Self {
        Self {
            backing: Arc::new(Mutex::new(backing)),
            ids: IdStrategy::default(),
        }
    }

    pub fn with_id_strategy(mut self, ids: IdStrategy) -> Self {
        self.ids = ids;
        self
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.ids
    }

    fn lock(&self) -> MutexGuard<'_, Backing> {
        self.backing.lock().expect("note store lock poisoned")
    }

    /// Run `f` on the user's collection inside one critical section and
    /// persist the whole snapshot afterwards.
    fn mutate<T>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut Vec<Note>) -> T,
    ) -> Result<T, StoreError> {
        let mut backing = self.lock();
        let mut snapshot = backing.read()?;
        let notes = snapshot.entry(user_key(user_id)).or_default();
        let result = f(notes);
        backing.write(&snapshot)?;
        Ok(result)
    }

    // ============================================================
    // Reads
    // ============================================================

    /// All notes of a user in creation order. Empty for users never seen.
    pub fn get_all(&self, user_id: UserId) -> Result<Vec<Note>, StoreError> {
        let mut snapshot = self.lock().read()?;
        Ok(snapshot.remove(&user_key(user_id)).unwrap_or_default())
    }

    pub fn users(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().read()?.into_keys().collect())
    }

    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        self.lock().read()
    }

    // ============================================================
    // Mutations
    // ============================================================

    /// Append a note the caller already numbered. Prefer [`NoteStore::create`],
    /// which numbers the note from the same read it appends to.
    pub fn append(&self, user_id: UserId, note: Note) -> Result<(), StoreError> {
        self.mutate(user_id, |notes| notes.push(note))
    }

    /// Number, timestamp and append a new note in one critical section.
    pub fn create(&self, user_id: UserId, input: NewNote) -> Result<Note, StoreError> {
        let ids = self.ids;
        let note = self.mutate(user_id, |notes| {
            let note = Note::new(ids.next_id(notes), input);
            notes.push(note.clone());
            note
        })?;
        tracing::debug!("Created note {} for user {}", note.id, user_id);
        Ok(note)
    }

    /// Merge `changes` into the first note with `note_id`. Returns whether a
    /// note matched; a miss is not an error.
    pub fn update(
        &self,
        user_id: UserId,
        note_id: u32,
        changes: &UpdateNoteInput,
    ) -> Result<bool, StoreError> {
        self.mutate(user_id, |notes| {
            match notes.iter_mut().find(|n| n.id == note_id) {
                Some(note) => {
                    note.apply(changes);
                    true
                }
                None => false,
            }
        })
    }

    /// Remove every note carrying `note_id` and return how many went away.
    pub fn delete(&self, user_id: UserId, note_id: u32) -> Result<usize, StoreError> {
        let removed = self.mutate(user_id, |notes| {
            let before = notes.len();
            notes.retain(|n| n.id != note_id);
            before - notes.len()
        })?;
        if removed > 1 {
            tracing::debug!(
                "Deleted {} notes sharing id {} for user {}",
                removed,
                note_id,
                user_id
            );
        }
        Ok(removed)
    }

    pub fn clear(&self, user_id: UserId) -> Result<(), StoreError> {
        self.mutate(user_id, Vec::clear)
    }
}

fn user_key(user_id: UserId) -> String {
    user_id.to_string()
}

fn default_path() -> Result<PathBuf, StoreError> {
    let dirs = directories::ProjectDirs::from("", "", "notebot").ok_or(StoreError::NoDataDir)?;
    Ok(dirs.data_dir().join("notes.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: u32) -> Note {
        Note {
            id,
            title: format!("Note {}", id),
            content: String::new(),
            created_at: "2024-01-01 09:00".to_string(),
            completed: false,
        }
    }

    #[test]
    fn collection_length_reuses_ids_after_deletion() {
        let notes = vec![note(1), note(2), note(4)];
        assert_eq!(IdStrategy::CollectionLength.next_id(&notes), 4);
    }

    #[test]
    fn monotonic_skips_past_highest_id() {
        let notes = vec![note(1), note(2), note(4)];
        assert_eq!(IdStrategy::Monotonic.next_id(&notes), 5);
        assert_eq!(IdStrategy::Monotonic.next_id(&[]), 1);
    }

    #[test]
    fn id_strategy_names_round_trip() {
        for ids in [IdStrategy::CollectionLength, IdStrategy::Monotonic] {
            assert_eq!(IdStrategy::from_str(ids.as_str()), Some(ids));
        }
        assert_eq!(IdStrategy::from_str("uuid"), None);
    }

    #[test]
    fn corrupt_memory_snapshot_reads_as_empty() {
        let store = NoteStore::open_memory();
        *store.lock() = Backing::Memory(Some("{not json".to_string()));

        assert!(store.get_all(1).unwrap().is_empty());
        // The bad text is dropped, so the next write starts clean.
        store.append(1, note(1)).unwrap();
        assert_eq!(store.get_all(1).unwrap(), vec![note(1)]);
    }
}
