//! In-memory storage backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::models::FileInfo;
use crate::path::validate as validate_path;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use time::OffsetDateTime;

type Files = HashMap<PathBuf, (OffsetDateTime, Vec<u8>)>;

/// In-memory storage backend for testing.
///
/// Files are stored in a `HashMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self`. Individual paths can be marked as denied to
/// simulate permission failures on writes.
///
/// # Examples
///
/// ```
/// use recall_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// let backend = MockBackend::with_files([("NoteTodaysPlan", b"{}")]);
/// assert!(backend.exists(Path::new("NoteTodaysPlan")).unwrap());
///
/// backend.write(Path::new("Groceries"), b"eggs").unwrap();
/// assert!(backend.exists(Path::new("Groceries")).unwrap());
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<Files>,
    denied: HashSet<PathBuf>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation: broken test setup should never
    /// produce a passing test.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let mut map = HashMap::new();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            map.insert(validated, (now, data.into()));
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
            denied: HashSet::new(),
        }
    }

    /// Make every write or append to `path` fail with
    /// [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub fn deny_writes(mut self, path: impl AsRef<Path>) -> Self {
        let Ok(validated) = validate_path(path.as_ref()) else {
            panic!("MockBackend::deny_writes: invalid path {}", path.as_ref().display());
        };
        self.denied.insert(validated);
        self
    }

    /// Number of files currently stored.
    pub fn len(&self) -> usize {
        self.files().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panicking test thread can poison the lock; the map itself is
    // still consistent because every mutation is a single insert.
    fn files(&self) -> RwLockReadGuard<'_, Files> {
        self.storage.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn files_mut(&self) -> RwLockWriteGuard<'_, Files> {
        self.storage.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn writable(&self, path: &Path) -> Result<PathBuf> {
        let path = validate_path(path)?;
        if self.denied.contains(&path) {
            exn::bail!(ErrorKind::PermissionDenied(path));
        }
        Ok(path)
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, prefix: Option<&Path>) -> Result<Vec<FileInfo>> {
        let prefix = prefix.map(validate_path).transpose()?;
        Ok(self
            .files()
            .iter()
            .filter(|(path, _)| prefix.as_ref().is_none_or(|pfx| path.starts_with(pfx)))
            .map(|(path, (modified, data))| FileInfo::new(path.clone(), data.len() as u64, *modified))
            .collect())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.files().contains_key(&path))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        let (_modified, data) = self.files().get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))?;
        Ok(data)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = self.writable(path)?;
        self.files_mut().insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = self.writable(path)?;
        let mut files = self.files_mut();
        let entry = files.entry(path).or_insert_with(|| (OffsetDateTime::now_utc(), Vec::new()));
        entry.0 = OffsetDateTime::now_utc();
        entry.1.extend_from_slice(data);
        Ok(())
    }
}
