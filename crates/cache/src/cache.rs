use crate::error::{ErrorKind, Result};
use crate::{BulkReport, CacheIndex, CacheKey, DiskDocumentStore};
use exn::OptionExt;
use recall_document::{CachableDocument, Document, DocumentDatabase};
use recall_storage::BackendHandle;
use tracing::instrument;

/// In-memory document index backed by a cache directory.
///
/// Mutating operations take `&mut self`, so a cache shared between threads
/// has to sit behind a lock; reads and writes of the same key can never
/// interleave.
///
/// # Examples
///
/// ```
/// use recall_cache::LocalDocumentCache;
/// use recall_document::{Document, MemoryDatabase, Source};
/// use recall_storage::backend::LocalBackend;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let dir = tempfile::tempdir()?;
/// let backend = Arc::new(LocalBackend::new("cache", dir.path())?);
/// let database = MemoryDatabase::from(vec![Document::new("Note: Today's Plan!", "buy milk", Source::Manual)]);
///
/// let mut cache = LocalDocumentCache::new(backend.clone());
/// let report = cache.add_documents_to_memory(&database).save_documents_in_memory_to_disk();
/// assert!(report.is_complete());
///
/// let mut later = LocalDocumentCache::new(backend);
/// later.load_documents_from_disk_into_memory()?;
/// assert_eq!(later.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct LocalDocumentCache {
    store: DiskDocumentStore,
    index: CacheIndex,
}

impl LocalDocumentCache {
    /// Create an empty cache writing through `backend`.
    pub fn new(backend: BackendHandle) -> Self {
        Self::with_store(DiskDocumentStore::new(backend))
    }

    pub fn with_store(store: DiskDocumentStore) -> Self {
        Self { store, index: CacheIndex::new() }
    }

    pub fn store(&self) -> &DiskDocumentStore {
        &self.store
    }

    pub fn index(&self) -> &CacheIndex {
        &self.index
    }

    pub fn get(&self, key: &CacheKey) -> Option<&Document> {
        self.index.get(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn remember(&mut self, key: CacheKey, document: Document) {
        let id = document.id.clone();
        if let Some(previous) = self.index.insert(key.clone(), document)
            && previous.id != id
        {
            tracing::debug!(%key, previous = %previous.id, current = %id, "Cache key collision; previous document replaced");
        }
    }

    /// Read every artifact on disk into the index.
    ///
    /// An artifact that can't be read or decoded is skipped and counted in
    /// the report; the rest still load. Only a failure to list the cache
    /// directory is returned as an error.
    #[instrument(skip(self), fields(backend = self.store.backend().name()))]
    pub fn load_documents_from_disk_into_memory(&mut self) -> Result<BulkReport> {
        let keys = self.store.list_all()?;
        let mut report = BulkReport::default();
        for key in keys {
            match self.store.read_one(&key) {
                Ok(document) => {
                    self.remember(key, document);
                    report.success();
                },
                Err(err) => {
                    tracing::warn!(%key, error = ?err, "Skipping cache artifact that failed to load");
                    report.failure(key);
                },
            }
        }
        tracing::info!(loaded = report.succeeded, failed = report.failures(), "Loaded documents from disk");
        Ok(report)
    }

    /// Read one artifact straight from disk without touching the index.
    pub fn get_single_document_from_disk(&self, key: &CacheKey) -> Result<Document> {
        self.store.read_one(key)
    }

    /// Write every document in the index to disk, each independently.
    #[instrument(skip(self), fields(backend = self.store.backend().name()))]
    pub fn save_documents_in_memory_to_disk(&self) -> BulkReport {
        let mut report = BulkReport::default();
        for (key, document) in &self.index {
            match self.store.write(key, document) {
                Ok(()) => report.success(),
                Err(err) => {
                    tracing::warn!(%key, error = ?err, "Failed to save document to disk");
                    report.failure(key.clone());
                },
            }
        }
        tracing::info!(saved = report.succeeded, failed = report.failures(), "Saved documents to disk");
        report
    }

    /// Persist one document and record it in the index. Returns its key.
    ///
    /// The index is only updated once the write has succeeded.
    #[instrument(skip_all, fields(identity = %document.cache_identity()))]
    pub fn save_single_document_to_disk<D: CachableDocument + ?Sized>(&mut self, document: &D) -> Result<CacheKey> {
        let key = CacheKey::for_document(document)?;
        let document = document.to_document();
        self.store.write(&key, &document)?;
        self.remember(key.clone(), document);
        Ok(key)
    }

    /// Read one artifact from disk and insert it into the index, replacing
    /// whatever was there under the same key.
    pub fn load_single_document_from_disk_into_memory(&mut self, key: &CacheKey) -> Result<CacheKey> {
        let document = self.store.read_one(key)?;
        self.remember(key.clone(), document);
        Ok(key.clone())
    }

    /// Same as [`load_single_document_from_disk_into_memory`](Self::load_single_document_from_disk_into_memory),
    /// for a file name that hasn't been validated as a key yet.
    pub fn load_single_document_from_path(&mut self, file_name: &str) -> Result<CacheKey> {
        let key = CacheKey::parse(file_name).ok_or_raise(|| ErrorKind::NotFound(file_name.to_string()))?;
        self.load_single_document_from_disk_into_memory(&key)
    }

    /// Pull every document the database currently holds into the index.
    /// Nothing is written to disk.
    ///
    /// Documents whose identity can't form a key are skipped with a warning.
    /// Returns the cache again so calls can be chained:
    ///
    /// ```ignore
    /// cache.add_documents_to_memory(&notes).add_documents_to_memory(&transcripts).save_documents_in_memory_to_disk();
    /// ```
    pub fn add_documents_to_memory<D: DocumentDatabase + ?Sized>(&mut self, database: &D) -> &mut Self {
        let mut added = 0usize;
        for document in database.cachable_documents() {
            match CacheKey::for_document(document) {
                Ok(key) => {
                    self.remember(key, document.to_document());
                    added += 1;
                },
                Err(err) => tracing::warn!(identity = %document.cache_identity(), error = ?err, "Skipping document"),
            }
        }
        tracing::debug!(added, total = self.index.len(), "Added documents to memory");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive_key;
    use recall_document::{MemoryDatabase, Source};
    use recall_storage::backend::{MockBackend, StorageBackend};
    use std::path::Path;
    use std::sync::Arc;

    fn note(id: &str, content: &str) -> Document {
        Document::new(id, content, Source::Manual)
    }

    fn database() -> MemoryDatabase {
        MemoryDatabase::from(vec![note("Groceries", "eggs"), note("Note: Today's Plan!", "buy milk"), note("Todo", "call mum")])
    }

    #[test]
    fn test_add_documents_is_memory_only() {
        let backend = Arc::new(MockBackend::default());
        let mut cache = LocalDocumentCache::new(backend.clone());
        cache.add_documents_to_memory(&database());
        assert_eq!(cache.len(), 3);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_add_documents_chains_on_same_instance() {
        let backend = Arc::new(MockBackend::default());
        let mut cache = LocalDocumentCache::new(backend.clone());
        let speech = MemoryDatabase::from(vec![Document::new("Standup", "ship it", Source::Speech)]);
        let before: *const LocalDocumentCache = &cache;
        let chained: *const LocalDocumentCache = cache.add_documents_to_memory(&database()).add_documents_to_memory(&speech);
        assert!(std::ptr::eq(before, chained));

        let report = cache.save_documents_in_memory_to_disk();
        assert_eq!(report.succeeded, 4);
        assert!(report.is_complete());
        assert_eq!(backend.len(), 4);
        for id in ["Groceries", "Note: Today's Plan!", "Todo", "Standup"] {
            assert!(cache.store().exists(&derive_key(id).unwrap()).unwrap(), "{id} not persisted");
        }
    }

    #[test]
    fn test_add_documents_skips_unkeyable() {
        let backend = Arc::new(MockBackend::default());
        let mut cache = LocalDocumentCache::new(backend);
        cache.add_documents_to_memory(&MemoryDatabase::from(vec![note("!!!", "nothing to key on"), note("Fine", "ok")]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_save_single_updates_index() {
        let backend = Arc::new(MockBackend::default());
        let mut cache = LocalDocumentCache::new(backend);
        let key = cache.save_single_document_to_disk(&note("Groceries", "eggs")).unwrap();
        let key_again = cache.save_single_document_to_disk(&note("Groceries", "eggs, flour")).unwrap();
        assert_eq!(key, key_again);
        assert_eq!(cache.get(&key).unwrap().content, "eggs, flour");
        assert_eq!(cache.get_single_document_from_disk(&key).unwrap().content, "eggs, flour");
        assert_eq!(cache.store().list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_save_single_failure_leaves_index_untouched() {
        let backend = Arc::new(MockBackend::default().deny_writes("Locked"));
        let mut cache = LocalDocumentCache::new(backend);
        let err = cache.save_single_document_to_disk(&note("Locked", "secret")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_all_continues_past_failures() {
        let backend = Arc::new(MockBackend::default().deny_writes("Groceries"));
        let mut cache = LocalDocumentCache::new(backend.clone());
        let report = cache.add_documents_to_memory(&database()).save_documents_in_memory_to_disk();
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, vec![derive_key("Groceries").unwrap()]);
        assert!(backend.exists(Path::new("NoteTodaysPlan")).unwrap());
        assert!(backend.exists(Path::new("Todo")).unwrap());
    }

    #[test]
    fn test_peek_does_not_touch_index() {
        let backend = Arc::new(MockBackend::default());
        let mut writer = LocalDocumentCache::new(backend.clone());
        let key = writer.save_single_document_to_disk(&note("Groceries", "eggs")).unwrap();

        let reader = LocalDocumentCache::new(backend);
        assert_eq!(reader.get_single_document_from_disk(&key).unwrap().content, "eggs");
        assert!(reader.is_empty());
        let err = reader.get_single_document_from_disk(&derive_key("Nope").unwrap()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_load_single_overwrites_index_entry() {
        let backend = Arc::new(MockBackend::default());
        LocalDocumentCache::new(backend.clone()).save_single_document_to_disk(&note("Groceries", "on disk")).unwrap();

        let mut cache = LocalDocumentCache::new(backend);
        cache.add_documents_to_memory(&MemoryDatabase::from(vec![note("Groceries", "in memory")]));
        let key = cache.load_single_document_from_disk_into_memory(&derive_key("Groceries").unwrap()).unwrap();
        assert_eq!(cache.get(&key).unwrap().content, "on disk");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_load_single_missing_leaves_index_untouched() {
        let backend = Arc::new(MockBackend::default());
        let mut cache = LocalDocumentCache::new(backend);
        cache.add_documents_to_memory(&MemoryDatabase::from(vec![note("Groceries", "in memory")]));
        let missing = derive_key("Todo").unwrap();
        let err = cache.load_single_document_from_disk_into_memory(&missing).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(key) if key == "Todo"));
        assert!(!cache.index().contains(&missing));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&derive_key("Groceries").unwrap()).unwrap().content, "in memory");
    }

    #[test]
    fn test_load_single_from_path() {
        let backend = Arc::new(MockBackend::default());
        LocalDocumentCache::new(backend.clone()).save_single_document_to_disk(&note("Todo", "call mum")).unwrap();
        let mut cache = LocalDocumentCache::new(backend);
        cache.load_single_document_from_path("Todo").unwrap();
        assert_eq!(cache.len(), 1);
        let err = cache.load_single_document_from_path(".DS_Store").unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_load_all_skips_corrupt_artifact() {
        let backend = Arc::new(MockBackend::default());
        let mut writer = LocalDocumentCache::new(backend.clone());
        writer.add_documents_to_memory(&database()).save_documents_in_memory_to_disk();
        backend.write(Path::new("Todo"), b"{\"id\": \"Todo\", \"cont").unwrap();

        let mut cache = LocalDocumentCache::new(backend);
        let report = cache.load_documents_from_disk_into_memory().unwrap();
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.failed, vec![derive_key("Todo").unwrap()]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&derive_key("Todo").unwrap()).is_none());
    }

    #[test]
    fn test_load_all_is_idempotent() {
        let backend = Arc::new(MockBackend::default());
        LocalDocumentCache::new(backend.clone()).add_documents_to_memory(&database()).save_documents_in_memory_to_disk();
        let mut cache = LocalDocumentCache::new(backend);
        cache.load_documents_from_disk_into_memory().unwrap();
        let first = cache.index().clone();
        cache.load_documents_from_disk_into_memory().unwrap();
        assert_eq!(cache.index(), &first);
    }

    #[test]
    fn test_collision_last_save_wins() {
        let backend = Arc::new(MockBackend::default());
        let mut cache = LocalDocumentCache::new(backend);
        let first = cache.save_single_document_to_disk(&note("to-do", "first")).unwrap();
        let second = cache.save_single_document_to_disk(&note("todo", "second")).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        let on_disk = cache.get_single_document_from_disk(&first).unwrap();
        assert_eq!((on_disk.id.as_str(), on_disk.content.as_str()), ("todo", "second"));
    }

    #[test]
    fn test_reload_from_local_disk_in_later_run() {
        use recall_storage::backend::LocalBackend;
        let temp_dir = tempfile::tempdir().unwrap();
        let documents = database();
        {
            let backend = Arc::new(LocalBackend::new("cache", temp_dir.path()).unwrap());
            let report = LocalDocumentCache::new(backend).add_documents_to_memory(&documents).save_documents_in_memory_to_disk();
            assert_eq!(report.succeeded, 3);
        }
        std::fs::write(temp_dir.path().join("Groceries"), b"\x00\x01 garbage").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"not an artifact").unwrap();

        let backend = Arc::new(LocalBackend::new("cache", temp_dir.path()).unwrap());
        let mut cache = LocalDocumentCache::new(backend);
        let report = cache.load_documents_from_disk_into_memory().unwrap();
        assert_eq!((report.succeeded, report.failures()), (2, 1));
        let plan = cache.get(&derive_key("Note: Today's Plan!").unwrap()).unwrap();
        assert_eq!(plan, &documents.cachable_documents().nth(1).unwrap().to_document());
    }

    #[test]
    fn test_dry_run_saves_report_success_without_writing() {
        let backend = Arc::new(MockBackend::default());
        let read_only = Arc::new(recall_storage::backend::ReadOnlyBackend::new(backend.clone()));
        let mut cache = LocalDocumentCache::new(read_only);
        let report = cache.add_documents_to_memory(&database()).save_documents_in_memory_to_disk();
        assert!(report.is_complete());
        assert_eq!(report.succeeded, 3);
        assert!(backend.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_load_all_survives_unreadable_entries_in_cache_dir() {
        use recall_storage::backend::LocalBackend;
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(LocalBackend::new("cache", temp_dir.path()).unwrap());
        LocalDocumentCache::new(backend.clone()).add_documents_to_memory(&database()).save_documents_in_memory_to_disk();
        std::fs::create_dir(temp_dir.path().join("sub")).unwrap();
        std::os::unix::fs::symlink("loop", temp_dir.path().join("sub/loop")).unwrap();
        std::os::unix::fs::symlink("loop", temp_dir.path().join("loop")).unwrap();

        let mut cache = LocalDocumentCache::new(backend);
        let report = cache.load_documents_from_disk_into_memory().unwrap();
        assert_eq!((report.succeeded, report.failures()), (3, 0));
        assert!(cache.index().contains(&derive_key("Groceries").unwrap()));
    }
}
