use crate::error::{Error, ErrorKind, Result};
use crate::{CacheEntry, CacheKey};
use recall_document::{CachableDocument, Document};
use recall_storage::BackendHandle;
use recall_storage::error::Error as StorageError;
use tracing::instrument;

/// Stateless gateway between documents and cache files.
///
/// One document per file, directly under the backend root, named by its
/// [`CacheKey`]. Every call goes straight to the backend.
#[derive(Clone)]
pub struct DiskDocumentStore {
    backend: BackendHandle,
}
impl DiskDocumentStore {
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &BackendHandle {
        &self.backend
    }

    /// Keep the storage error as a child, and surface a missing file as
    /// [`NotFound`](ErrorKind::NotFound) for this key.
    fn storage_error(err: StorageError, key: &CacheKey) -> Error {
        if err.is_not_found() {
            err.raise(ErrorKind::NotFound(key.to_string()))
        } else {
            err.raise(ErrorKind::Io)
        }
    }

    /// Serialize a document and write it under the key derived from its
    /// identity, replacing any previous artifact. Returns the key.
    pub fn save<D: CachableDocument + ?Sized>(&self, document: &D) -> Result<CacheKey> {
        let key = CacheKey::for_document(document)?;
        self.write(&key, &document.to_document())?;
        Ok(key)
    }

    /// Write an already rendered document under an explicit key.
    #[instrument(skip(self, key, document), fields(backend = self.backend.name(), key = %key))]
    pub fn write(&self, key: &CacheKey, document: &Document) -> Result<()> {
        let entry = CacheEntry::encode(key.clone(), document)?;
        self.backend.write(key.as_path(), &entry.bytes).map_err(|err| Self::storage_error(err, key))?;
        tracing::debug!(bytes = entry.bytes.len(), "Saved document to disk");
        Ok(())
    }

    /// Read and deserialize one artifact.
    #[instrument(skip(self, key), fields(backend = self.backend.name(), key = %key))]
    pub fn read_one(&self, key: &CacheKey) -> Result<Document> {
        let bytes = self.backend.read(key.as_path()).map_err(|err| Self::storage_error(err, key))?;
        CacheEntry { key: key.clone(), bytes }.decode()
    }

    /// Keys of every artifact in the cache directory, sorted.
    ///
    /// Files that can't be cache artifacts (nested paths, names with
    /// punctuation such as `.DS_Store`) are ignored.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub fn list_all(&self) -> Result<Vec<CacheKey>> {
        let files = self.backend.list(None).map_err(|err| err.raise(ErrorKind::Io))?;
        let mut keys: Vec<CacheKey> = files
            .iter()
            .filter_map(|file| {
                let key = match file.is_top_level() {
                    true => file.file_name().and_then(CacheKey::parse),
                    false => None,
                };
                if key.is_none() {
                    tracing::debug!(path = %file.path.display(), "Ignoring non-artifact file in cache directory");
                }
                key
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    pub fn exists(&self, key: &CacheKey) -> Result<bool> {
        self.backend.exists(key.as_path()).map_err(|err| err.raise(ErrorKind::Io))
    }
}
