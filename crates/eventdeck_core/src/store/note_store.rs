//! Note store: notes ordered newest first.

use crate::model::note::Note;
use crate::model::record::{normalize_title, RecordId};
use crate::storage::BlobStore;
use crate::store::record_store::{
    ListenerId, PersistenceError, RecordStore, StoreConfig, StoreError, StoreResult,
};
use chrono::{DateTime, Utc};

/// Blob key holding the notes collection.
pub const NOTES_STORAGE_KEY: &str = "notes_storage_v1";

impl StoreConfig {
    /// Notes defaults: fixed notes key, no seeding.
    pub fn notes() -> Self {
        Self::new(NOTES_STORAGE_KEY)
    }
}

pub struct NoteStore<B: BlobStore> {
    inner: RecordStore<Note, B>,
}

impl<B: BlobStore> NoteStore<B> {
    pub fn new(blob: B) -> Self {
        Self::with_key(blob, NOTES_STORAGE_KEY)
    }

    pub fn with_key(blob: B, key: impl Into<String>) -> Self {
        Self {
            inner: RecordStore::new(blob, key),
        }
    }

    /// Creates and loads a store per `config`. Notes are never seeded.
    pub fn open(blob: B, config: &StoreConfig) -> Self {
        let mut store = Self::with_key(blob, config.storage_key.clone());
        store.initialize();
        store
    }

    /// Loads persisted notes; unreadable data yields an empty store.
    pub fn initialize(&mut self) {
        self.inner.load();
    }

    /// Adds a note stamped with the current time.
    pub fn add(&mut self, title: &str, content: &str) -> StoreResult<Note> {
        self.add_at(title, content, Utc::now())
    }

    /// Adds a note stamped with `date`.
    ///
    /// # Errors
    /// - `InvalidInput` when `title` is blank after trimming.
    pub fn add_at(&mut self, title: &str, content: &str, date: DateTime<Utc>) -> StoreResult<Note> {
        let title = normalize_title(title)?;
        self.inner
            .insert(Note::new(title, content.trim().to_string(), date))
    }

    /// Replaces title and content, refreshing the date to now.
    pub fn update(&mut self, id: RecordId, title: &str, content: &str) -> StoreResult<Note> {
        self.update_at(id, title, content, Utc::now())
    }

    /// Replaces title and content and stamps `date`.
    ///
    /// # Errors
    /// - `InvalidInput` when `title` is blank after trimming.
    /// - `NotFound` when the id is unknown.
    pub fn update_at(
        &mut self,
        id: RecordId,
        title: &str,
        content: &str,
        date: DateTime<Utc>,
    ) -> StoreResult<Note> {
        let title = normalize_title(title)?;
        let mut note = self.inner.get(id).cloned().ok_or(StoreError::NotFound(id))?;
        note.title = title;
        note.content = content.trim().to_string();
        note.date = date;
        self.inner.replace(note.clone())?;
        Ok(note)
    }

    pub fn delete(&mut self, note: &Note) -> bool {
        self.inner.remove(note)
    }

    pub fn delete_by_id(&mut self, id: RecordId) -> bool {
        self.inner.remove_by_id(id)
    }

    /// Current notes, newest first.
    pub fn notes(&self) -> &[Note] {
        self.inner.records()
    }

    pub fn get(&self, id: RecordId) -> Option<&Note> {
        self.inner.get(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[Note]) + 'static) -> ListenerId {
        self.inner.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.inner.unsubscribe(id)
    }

    pub fn last_persistence_error(&self) -> Option<&PersistenceError> {
        self.inner.last_persistence_error()
    }
}
