use crate::error::{ErrorKind, Result};
use derive_more::Display;
use recall_document::CachableDocument;
use std::path::Path;

/// Longest file name common filesystems (ext4, APFS, NTFS) accept.
pub const MAX_KEY_LEN: usize = 255;

/// A filesystem-safe cache file name.
///
/// Only ever contains ASCII letters and digits, is never empty, and is at
/// most [`MAX_KEY_LEN`] bytes long.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a cachable document, derived from its identity.
    pub fn for_document<D: CachableDocument + ?Sized>(document: &D) -> Result<Self> {
        derive_key(&document.cache_identity())
    }

    /// Accept a string that is already a valid key (e.g. a file name read
    /// back from disk), without sanitizing it.
    pub fn parse(name: &str) -> Option<Self> {
        let valid = !name.is_empty() && name.len() <= MAX_KEY_LEN && name.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the artifact relative to the cache root.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}
impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the cache key for a document identity.
///
/// Every character outside `[A-Za-z0-9]` is stripped. Distinct identities
/// can collapse onto the same key (`"a-b"` and `"ab"`), in which case the
/// later save overwrites the earlier one.
///
/// Returns [`InvalidKey`](ErrorKind::InvalidKey) if nothing is left, or if
/// what is left is longer than [`MAX_KEY_LEN`].
///
/// ```
/// use recall_cache::derive_key;
/// assert_eq!(derive_key("Note: Today's Plan!").unwrap().as_str(), "NoteTodaysPlan");
/// ```
pub fn derive_key(identity: &str) -> Result<CacheKey> {
    let sanitized: String = identity.chars().filter(char::is_ascii_alphanumeric).collect();
    if sanitized.is_empty() || sanitized.len() > MAX_KEY_LEN {
        exn::bail!(ErrorKind::InvalidKey(identity.to_string()));
    }
    Ok(CacheKey(sanitized))
}
