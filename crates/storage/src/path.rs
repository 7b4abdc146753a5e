//! Path validation.
//!
//! Every path handed to a backend is relative to that backend's root. This
//! module makes sure it stays that way.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a storage path.
///
/// Rejects anything that would resolve outside the backend root (leading
/// `..`, too many `..` segments, Windows prefixes), null bytes, and paths
/// that normalize to nothing. `.` segments, repeated separators and a
/// leading `/` are dropped.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use recall_storage::validate_path;
/// assert!(validate_path("NoteTodaysPlan").is_ok());
/// assert!(validate_path("transcripts/2024/Monday").is_ok());
/// assert!(validate_path("../outside").is_err());
/// assert_eq!(validate_path("./drafts//../NoteTodaysPlan").unwrap(), Path::new("NoteTodaysPlan"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) => {
                // Null bytes survive Path::components() on Unix but truncate
                // the path once it reaches a syscall.
                if segment.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                components.push(segment);
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(invalid());
    }
    Ok(components.into_iter().collect())
}
