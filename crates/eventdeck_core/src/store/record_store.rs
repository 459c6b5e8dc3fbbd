//! Generic titled-record store over a blob backend.
//!
//! # Responsibility
//! - Own the ordered in-memory collection of one record shape.
//! - Mirror the whole collection into one blob key after every mutation.
//! - Notify subscribers with the post-mutation collection.
//!
//! # Invariants
//! - The collection is sorted by `Record::order` (stable) after every
//!   mutation and after load.
//! - Record ids are unique within the collection.
//! - Persistence failures are logged and retained, never returned from a
//!   mutation and never rolled back: memory stays the source of truth.

use crate::model::record::{Record, RecordId, RecordValidationError};
use crate::storage::{BlobError, BlobStore};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Caller-facing store errors. Both are non-fatal: the store is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Input rejected before touching the collection (blank title).
    InvalidInput(RecordValidationError),
    /// No record with this id.
    NotFound(RecordId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// Load or save failure against the blob backend.
#[derive(Debug)]
pub enum PersistenceError {
    Blob(BlobError),
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode records: {err}"),
            Self::Decode(err) => write!(f, "failed to decode records: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Blob(err) => Some(err),
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

impl From<BlobError> for PersistenceError {
    fn from(value: BlobError) -> Self {
        Self::Blob(value)
    }
}

/// Store construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Blob key holding the whole collection.
    pub storage_key: String,
    /// Insert example records when the loaded collection is empty.
    pub seed_if_empty: bool,
}

impl StoreConfig {
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            seed_if_empty: false,
        }
    }

    pub fn seed_if_empty(mut self, seed: bool) -> Self {
        self.seed_if_empty = seed;
        self
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<R> = Box<dyn FnMut(&[R])>;

/// Ordered, persisted collection of `R` records.
pub struct RecordStore<R: Record, B: BlobStore> {
    blob: B,
    key: String,
    records: Vec<R>,
    listeners: Vec<(ListenerId, Listener<R>)>,
    next_listener: u64,
    last_persistence_error: Option<PersistenceError>,
}

impl<R: Record, B: BlobStore> RecordStore<R, B> {
    /// Creates an empty, unloaded store writing under `key`.
    pub fn new(blob: B, key: impl Into<String>) -> Self {
        Self {
            blob,
            key: key.into(),
            records: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            last_persistence_error: None,
        }
    }

    /// Replaces the collection with the persisted one.
    ///
    /// Absent key, read failure and decode failure all leave an empty
    /// collection; the latter two are logged and retained. Invalid records
    /// and repeated ids are dropped. Returns the number of records loaded.
    pub fn load(&mut self) -> usize {
        self.records = match self.read_records() {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=store_load module=store status=error kind={} key={} error={}",
                    R::KIND,
                    self.key,
                    err
                );
                self.last_persistence_error = Some(err);
                Vec::new()
            }
        };
        self.sort();
        info!(
            "event=store_load module=store status=ok kind={} key={} count={}",
            R::KIND,
            self.key,
            self.records.len()
        );
        self.records.len()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn blob(&self) -> &B {
        &self.blob
    }

    /// Most recent load/save failure, cleared by the next successful save.
    pub fn last_persistence_error(&self) -> Option<&PersistenceError> {
        self.last_persistence_error.as_ref()
    }

    /// Validates and inserts a record, then re-sorts and persists.
    pub(crate) fn insert(&mut self, record: R) -> StoreResult<R> {
        record.validate()?;
        debug_assert!(self.get(record.id()).is_none(), "record ids must be unique");

        self.records.push(record.clone());
        debug!(
            "event=store_insert module=store kind={} id={}",
            R::KIND,
            record.id()
        );
        self.commit();
        Ok(record)
    }

    /// Inserts several records with a single save, used for seeding.
    pub(crate) fn insert_all(&mut self, records: Vec<R>) -> StoreResult<()> {
        for record in &records {
            record.validate()?;
        }
        self.records.extend(records);
        self.commit();
        Ok(())
    }

    /// Replaces the stored record sharing `record.id()` in place.
    ///
    /// # Errors
    /// - `InvalidInput` when `record` fails validation.
    /// - `NotFound` when no record has this id; nothing is saved.
    ///
    /// Titles are stored as given; the typed stores normalize them first.
    pub(crate) fn replace(&mut self, record: R) -> StoreResult<()> {
        record.validate()?;
        let id = record.id();
        let slot = self
            .records
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or(StoreError::NotFound(id))?;
        *slot = record;
        debug!("event=store_replace module=store kind={} id={}", R::KIND, id);
        self.commit();
        Ok(())
    }

    /// Removes the first record equal to `record`. Returns whether one was
    /// removed; a miss saves nothing.
    pub fn remove(&mut self, record: &R) -> bool {
        match self.records.iter().position(|existing| existing == record) {
            Some(index) => self.remove_at(index),
            None => false,
        }
    }

    /// Removes the record with `id`. Returns whether one was removed.
    pub fn remove_by_id(&mut self, id: RecordId) -> bool {
        match self.records.iter().position(|existing| existing.id() == id) {
            Some(index) => self.remove_at(index),
            None => false,
        }
    }

    /// Registers a listener called with the collection after every
    /// successful mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&[R]) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drops a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn remove_at(&mut self, index: usize) -> bool {
        let removed = self.records.remove(index);
        debug!(
            "event=store_remove module=store kind={} id={}",
            R::KIND,
            removed.id()
        );
        self.commit();
        true
    }

    fn commit(&mut self) {
        self.sort();
        self.save();
        for (_, listener) in &mut self.listeners {
            listener(&self.records);
        }
    }

    fn sort(&mut self) {
        self.records.sort_by(R::order);
    }

    fn save(&mut self) {
        match self.write_records() {
            Ok(bytes) => {
                debug!(
                    "event=store_save module=store status=ok kind={} key={} count={} bytes={}",
                    R::KIND,
                    self.key,
                    self.records.len(),
                    bytes
                );
                self.last_persistence_error = None;
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error kind={} key={} error={}",
                    R::KIND,
                    self.key,
                    err
                );
                self.last_persistence_error = Some(err);
            }
        }
    }

    fn write_records(&mut self) -> Result<usize, PersistenceError> {
        let bytes = serde_json::to_vec(&self.records).map_err(PersistenceError::Encode)?;
        self.blob.set(&self.key, &bytes)?;
        Ok(bytes.len())
    }

    fn read_records(&self) -> Result<Vec<R>, PersistenceError> {
        let Some(bytes) = self.blob.get(&self.key)? else {
            return Ok(Vec::new());
        };
        let decoded: Vec<R> = serde_json::from_slice(&bytes).map_err(PersistenceError::Decode)?;

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(decoded.len());
        for record in decoded {
            if let Err(err) = record.validate() {
                warn!(
                    "event=store_load module=store status=skip kind={} id={} reason={}",
                    R::KIND,
                    record.id(),
                    err
                );
                continue;
            }
            if !seen.insert(record.id()) {
                warn!(
                    "event=store_load module=store status=skip kind={} id={} reason=duplicate_id",
                    R::KIND,
                    record.id()
                );
                continue;
            }
            kept.push(record);
        }
        Ok(kept)
    }
}
