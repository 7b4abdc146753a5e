//! Cache Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Storage failures are kept as children of the cache
//! error that caused them.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No artifact exists for this key.
    #[display("document not found in cache: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The artifact exists but can't be turned back into a document.
    #[display("corrupt cache artifact: {_0}")]
    CorruptArtifact(#[error(not(source))] String),
    /// The identity sanitizes to nothing, or to a name too long for a file.
    #[display("identity cannot form a cache key: {_0:?}")]
    InvalidKey(#[error(not(source))] String),
    /// Permissions, disk full, missing cache directory, ...
    #[display("cache I/O failure")]
    Io,
    /// The document couldn't be serialized.
    #[display("failed to serialize document")]
    Serialize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
