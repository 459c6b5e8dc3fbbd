use super::{check_key, BlobResult, BlobStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory-backed blob store: one `<key>.json` file per key.
///
/// # Invariants
/// - The directory is created on first write, not on construction.
/// - Writes land in a sibling temp file and are renamed into place, so a
///   reader never observes a half-written value.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>> {
        check_key(key)?;
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> BlobResult<()> {
        check_key(key)?;
        std::fs::create_dir_all(&self.root)?;
        let target = self.path_for(key);
        let staging = self.root.join(format!("{key}.json.tmp"));
        std::fs::write(&staging, value)?;
        std::fs::rename(&staging, &target)?;
        Ok(())
    }
}
