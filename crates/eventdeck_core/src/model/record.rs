//! Shared record contract and title normalization.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of any stored record.
pub type RecordId = Uuid;

/// Validation failure for record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Title is empty or whitespace only.
    BlankTitle,
    /// Identifier is the nil UUID.
    NilId,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::NilId => write!(f, "record id must not be nil"),
        }
    }
}

impl Error for RecordValidationError {}

/// A titled record that a `RecordStore` can own, order and persist.
///
/// # Contract
/// - `id()` never changes over the record lifetime.
/// - `order()` is a total order; the store sorts with a stable sort, so
///   records comparing `Equal` keep their relative position.
pub trait Record: Clone + PartialEq + Serialize + DeserializeOwned {
    /// Short lowercase name used in log lines (`event`, `note`).
    const KIND: &'static str;

    fn id(&self) -> RecordId;

    fn title(&self) -> &str;

    /// Collection order for this record shape.
    fn order(a: &Self, b: &Self) -> Ordering;

    /// Checks the invariants every persisted record must hold.
    fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id().is_nil() {
            return Err(RecordValidationError::NilId);
        }
        if self.title().trim().is_empty() {
            return Err(RecordValidationError::BlankTitle);
        }
        Ok(())
    }
}

/// Trims surrounding whitespace and rejects titles that end up empty.
pub fn normalize_title(raw: &str) -> Result<String, RecordValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecordValidationError::BlankTitle);
    }
    Ok(trimmed.to_string())
}
