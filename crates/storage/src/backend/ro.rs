//! Read-only storage backend decorator.
//!
//! Wraps another backend and turns every mutation into a logged no-op that
//! still reports success. Used for dry runs.

use std::path::Path;

use crate::{BackendHandle, FileInfo, StorageBackend, error::Result};

/// Read-only storage backend.
///
/// Reads go to the wrapped backend. Writes and appends are dropped with an
/// [`info event`](tracing::Event).
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list(&self, prefix: Option<&Path>) -> Result<Vec<FileInfo>> {
        self.inner.list(prefix)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        tracing::info!(path = %path.display(), bytes = data.len(), "Skipping write during read-only mode");
        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<()> {
        tracing::info!(path = %path.display(), bytes = data.len(), "Skipping append during read-only mode");
        Ok(())
    }
}
