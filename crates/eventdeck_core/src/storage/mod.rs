//! Byte-oriented key-value persistence collaborators.
//!
//! # Responsibility
//! - Define the `BlobStore` contract the record stores persist through.
//! - Provide memory, file and SQLite backends.
//!
//! # Invariants
//! - Keys match `[A-Za-z0-9_.-]+`; anything else is `InvalidKey`.
//! - `get` of a never-written key is `Ok(None)`, not an error.
//! - `set` replaces the whole value (last write wins).

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;
mod schema;
mod sqlite;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;
pub use schema::SQLITE_SCHEMA_VERSION;
pub use sqlite::SqliteBlobStore;

static BLOB_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid blob key regex"));

pub type BlobResult<T> = Result<T, BlobError>;

#[derive(Debug)]
pub enum BlobError {
    InvalidKey(String),
    Io(std::io::Error),
    Sqlite(rusqlite::Error),
    /// The SQLite file was written by a build with a newer `kv_store` schema.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid blob key `{key}`"),
            Self::Io(err) => write!(f, "blob io failure: {err}"),
            Self::Sqlite(err) => write!(f, "blob sqlite failure: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "blob database schema v{found} is newer than supported v{supported}"
            ),
        }
    }
}

impl Error for BlobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::InvalidKey(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<std::io::Error> for BlobError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for BlobError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Key-value byte storage used for durability.
pub trait BlobStore {
    /// Reads the value under `key`, `None` when never written.
    fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>>;

    /// Replaces the value under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> BlobResult<()>;
}

impl<B: BlobStore + ?Sized> BlobStore for Box<B> {
    fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> BlobResult<()> {
        (**self).set(key, value)
    }
}

pub(crate) fn check_key(key: &str) -> BlobResult<()> {
    if BLOB_KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(BlobError::InvalidKey(key.to_string()))
    }
}
