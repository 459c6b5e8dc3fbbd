//! Record stores.
//!
//! # Responsibility
//! - Keep the authoritative ordered collections for events and notes.
//! - Keep the persisted blob in sync after every mutation.
//!
//! # Invariants
//! - Stores are single-threaded; mutations take `&mut self`.
//! - Every mutation persists the full collection (no deltas).

pub mod event_store;
pub mod note_store;
pub mod record_store;
