//! Core domain logic for EventDeck.
//! This crate is the single source of truth for record invariants and the
//! persistence contract shared by the FFI and CLI front ends.

pub mod logging;
pub mod model;
pub mod search;
pub mod storage;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{Event, EventType, ParseEventTypeError};
pub use model::note::Note;
pub use model::record::{normalize_title, Record, RecordId, RecordValidationError};
pub use search::filter::{filter_events, EventFilter};
pub use storage::{
    BlobError, BlobResult, BlobStore, FileBlobStore, MemoryBlobStore, SqliteBlobStore,
    SQLITE_SCHEMA_VERSION,
};
pub use store::event_store::{EventStore, EVENTS_STORAGE_KEY};
pub use store::note_store::{NoteStore, NOTES_STORAGE_KEY};
pub use store::record_store::{
    ListenerId, PersistenceError, RecordStore, StoreConfig, StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
