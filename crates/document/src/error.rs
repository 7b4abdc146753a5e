//! Document Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A document error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The underlying storage backend failed.
    #[display("storage error")]
    Storage,
    /// A document file isn't valid UTF-8 text.
    #[display("document is not valid UTF-8 text: {}", _0.display())]
    InvalidContent(#[error(not(source))] PathBuf),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError { field: &'static str, value: String },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}
