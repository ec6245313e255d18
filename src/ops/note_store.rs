use crate::io::storage::{KeyValueStore, StorageError};
use crate::model::note::{Note, NoteDraft, ValidationError};

/// Storage key holding the whole note collection as a JSON array
pub const NOTES_KEY: &str = "notes.json";

/// Error type for note store mutations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not save notes: {0}")]
    Storage(#[from] StorageError),
    #[error("could not serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("a note with id {0} already exists")]
    DuplicateId(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Error type for resolving a user-typed id
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("note not found: {0}")]
    NotFound(String),
    #[error("id prefix '{prefix}' matches {count} notes")]
    Ambiguous { prefix: String, count: usize },
}

/// The canonical, newest-first note collection plus the storage it is
/// mirrored to.
///
/// Every mutation is applied in memory first and then the full collection
/// is written back. A failed write leaves the in-memory change in place
/// and returns the error; `sync` retries the write.
#[derive(Debug)]
pub struct NoteStore<S: KeyValueStore> {
    notes: Vec<Note>,
    storage: S,
    discarded: Option<String>,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Load the collection from storage. Missing, unreadable or corrupt
    /// data yields an empty collection; this never fails.
    pub fn load(storage: S) -> Self {
        let (notes, discarded) = read_notes(&storage);
        NoteStore {
            notes,
            storage,
            discarded,
        }
    }

    /// Raw stored text that failed to parse during the last load, if any.
    pub fn discarded(&self) -> Option<&str> {
        self.discarded.as_deref()
    }

    /// Re-read the collection from storage, replacing the in-memory copy.
    pub fn reload(&mut self) {
        let (notes, discarded) = read_notes(&self.storage);
        self.notes = notes;
        self.discarded = discarded;
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve_id(&self, prefix: &str) -> Result<&str, LookupError> {
        if let Some(note) = self.get(prefix) {
            return Ok(&note.id);
        }
        let mut matches = self.notes.iter().filter(|n| n.id.starts_with(prefix));
        match (matches.next(), matches.count()) {
            (Some(note), 0) if !prefix.is_empty() => Ok(&note.id),
            (Some(_), rest) if !prefix.is_empty() => Err(LookupError::Ambiguous {
                prefix: prefix.to_string(),
                count: rest + 1,
            }),
            _ => Err(LookupError::NotFound(prefix.to_string())),
        }
    }

    /// Insert `note` at the front and persist.
    pub fn add(&mut self, note: Note) -> Result<(), StoreError> {
        if self.get(&note.id).is_some() {
            return Err(StoreError::DuplicateId(note.id));
        }
        self.notes.insert(0, note);
        self.persist()
    }

    /// Validate a draft, give it a fresh id and add it. Returns the id.
    pub fn create(&mut self, draft: NoteDraft) -> Result<String, StoreError> {
        draft.validate()?;
        let id = generate_id();
        self.add(Note::from_draft(id.clone(), draft))?;
        Ok(id)
    }

    /// Delete the note with `id` and persist. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Result<Option<Note>, StoreError> {
        let removed = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .map(|idx| self.notes.remove(idx));
        self.persist()?;
        Ok(removed)
    }

    /// Replace the note with `id` in place and persist. The stored note
    /// keeps `id` whatever `new_note.id` says. Unknown ids are a no-op.
    pub fn edit(&mut self, id: &str, mut new_note: Note) -> Result<bool, StoreError> {
        let found = match self.notes.iter_mut().find(|n| n.id == id) {
            Some(slot) => {
                new_note.id = slot.id.clone();
                *slot = new_note;
                true
            }
            None => false,
        };
        self.persist()?;
        Ok(found)
    }

    /// Flip `finish` on the note with `id`. Returns the new value, or
    /// `None` if there is no such note.
    pub fn toggle_finish(&mut self, id: &str) -> Result<Option<bool>, StoreError> {
        let Some(current) = self.get(id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        updated.finish = !updated.finish;
        let finish = updated.finish;
        self.edit(id, updated)?;
        Ok(Some(finish))
    }

    /// Write the in-memory collection to storage again.
    pub fn sync(&mut self) -> Result<(), StoreError> {
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = serialize_notes(&self.notes)?;
        self.storage.set(NOTES_KEY, &json)?;
        self.discarded = None;
        Ok(())
    }
}

/// Serialize a collection the way it is stored.
pub fn serialize_notes(notes: &[Note]) -> Result<String, serde_json::Error> {
    serde_json::to_string(notes)
}

/// Parse a stored collection.
pub fn deserialize_notes(json: &str) -> Result<Vec<Note>, serde_json::Error> {
    serde_json::from_str(json)
}

fn read_notes<S: KeyValueStore>(storage: &S) -> (Vec<Note>, Option<String>) {
    match storage.get(NOTES_KEY) {
        Ok(Some(raw)) => match deserialize_notes(&raw) {
            Ok(notes) => (notes, None),
            Err(_) => (Vec::new(), Some(raw)),
        },
        Ok(None) | Err(_) => (Vec::new(), None),
    }
}

/// A fresh random note id (UUID v4, hyphenated).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
