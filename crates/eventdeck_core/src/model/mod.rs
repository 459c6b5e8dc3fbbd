//! Record shapes managed by the stores.
//!
//! # Responsibility
//! - Define the persisted Event and Note records and their wire format.
//! - Define the `Record` contract the generic store is parameterized by.
//!
//! # Invariants
//! - Every record carries a stable, non-nil `RecordId`.
//! - Titles are stored trimmed and never blank.

pub mod event;
pub mod note;
pub mod record;
