//! Storage backend trait and implementations.
//!
//! [`StorageBackend`] is the file-system collaborator the cache is written
//! against. Implementations are synchronous: every call returns once its
//! effect on the underlying storage is complete or has failed.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::models::FileInfo;
use std::path::Path;

/// Unified interface for storage backends.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use recall_storage::{backend::StorageBackend, error::Result};
///
/// fn size_of_note(backend: &dyn StorageBackend) -> Result<u64> {
///     let path = Path::new("NoteTodaysPlan");
///     if backend.exists(path)? {
///         Ok(backend.read(path)?.len() as u64)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (used for logging only).
    fn name(&self) -> &str;

    /// List all files matching an optional prefix, recursively.
    ///
    /// Order is unspecified. A prefix naming a directory that doesn't exist
    /// yields an empty list rather than an error.
    fn list(&self, prefix: Option<&Path>) -> Result<Vec<FileInfo>>;

    /// Check if a file exists.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents, creating the file or replacing what was there.
    ///
    /// Implementations create parent directories as needed.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Append to a file, creating it if it doesn't exist yet.
    ///
    /// Implementations create parent directories as needed.
    fn append(&self, path: &Path, data: &[u8]) -> Result<()>;
}
