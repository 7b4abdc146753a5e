//! Document sources.
//!
//! A [`DocumentDatabase`] is a read-only, pull-only enumeration of cachable
//! documents. There is no subscription model: callers ask for whatever the
//! database holds at that moment.

use crate::document::{CachableDocument, Document, Source};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use recall_storage::BackendHandle;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Enumerable source of cachable documents.
pub trait DocumentDatabase {
    fn cachable_documents(&self) -> Box<dyn Iterator<Item = &dyn CachableDocument> + '_>;
}

/// Documents held in memory, e.g. transcripts handed over by the speech
/// subsystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    documents: Vec<Document>,
}
impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: Document) -> &mut Self {
        self.documents.push(document);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
impl From<Vec<Document>> for MemoryDatabase {
    fn from(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}
impl FromIterator<Document> for MemoryDatabase {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self { documents: iter.into_iter().collect() }
    }
}
impl DocumentDatabase for MemoryDatabase {
    fn cachable_documents(&self) -> Box<dyn Iterator<Item = &dyn CachableDocument> + '_> {
        Box::new(self.documents.iter().map(|document| document as &dyn CachableDocument))
    }
}

/// Every file under a storage prefix, read as a UTF-8 text document.
///
/// The document id is the file's path relative to the backend root, and its
/// timestamp is the file's modification time. Files that can't be read or
/// aren't valid UTF-8 are skipped and remembered in [`skipped()`](Self::skipped).
#[derive(Debug, Clone, Default)]
pub struct DirectoryDatabase {
    documents: Vec<Document>,
    skipped: Vec<PathBuf>,
}
impl DirectoryDatabase {
    /// Snapshot the documents under `prefix` (or the whole backend).
    ///
    /// Only a failure to list the directory is an error.
    #[instrument(skip(backend), fields(backend = backend.name()))]
    pub fn load(backend: &BackendHandle, prefix: Option<&Path>) -> Result<Self> {
        let mut files = backend.list(prefix).or_raise(|| ErrorKind::Storage)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let mut database = Self::default();
        for file in files {
            match Self::read_document(backend, &file.path) {
                Ok(content) => {
                    let id = file.path.to_string_lossy().into_owned();
                    let document = Document::new(id, content, Source::File).with_created_at(file.modified);
                    database.documents.push(document);
                },
                Err(err) => {
                    tracing::warn!(path = %file.path.display(), error = ?err, "Skipping unreadable document");
                    database.skipped.push(file.path);
                },
            }
        }
        tracing::info!(documents = database.documents.len(), skipped = database.skipped.len(), "Loaded document directory");
        Ok(database)
    }

    fn read_document(backend: &BackendHandle, path: &Path) -> Result<String> {
        let bytes = backend.read(path).or_raise(|| ErrorKind::Storage)?;
        String::from_utf8(bytes).or_raise(|| ErrorKind::InvalidContent(path.to_path_buf()))
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Paths that were listed but could not be turned into documents.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }
}
impl DocumentDatabase for DirectoryDatabase {
    fn cachable_documents(&self) -> Box<dyn Iterator<Item = &dyn CachableDocument> + '_> {
        Box::new(self.documents.iter().map(|document| document as &dyn CachableDocument))
    }
}
