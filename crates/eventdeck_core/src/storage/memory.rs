use super::{check_key, BlobResult, BlobStore};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// In-process blob store.
///
/// Clones share the same map, so a test (or a preview host) can keep a
/// handle and inspect what a store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    entries: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with one raw value.
    pub fn with_entry(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().insert(key.into(), value.into());
        store
    }

    /// Returns a copy of the raw bytes stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.borrow().get(key).cloned()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>> {
        check_key(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> BlobResult<()> {
        check_key(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
