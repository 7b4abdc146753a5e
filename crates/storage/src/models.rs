//! Storage models.

use std::path::PathBuf;
use time::OffsetDateTime;

/// File metadata returned by storage backends when listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        Self { path: path.into(), size, modified }
    }

    /// Final path component as UTF-8, if it has one.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    /// Whether the file sits directly in the storage root.
    pub fn is_top_level(&self) -> bool {
        self.path.components().count() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("NoteTodaysPlan", true)]
    #[case("nested/NoteTodaysPlan", false)]
    #[case("a/b/c", false)]
    fn test_is_top_level(#[case] path: &str, #[case] expected: bool) {
        let info = FileInfo::new(path, 0, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(info.is_top_level(), expected);
    }

    #[test]
    fn test_file_name() {
        let info = FileInfo::new("transcripts/Monday", 12, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(info.file_name(), Some("Monday"));
    }
}
