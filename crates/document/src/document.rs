use crate::error::{Error, ErrorKind};
use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::OffsetDateTime;

/// Where a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Read from a file in a document directory.
    File,
    /// Produced by the speech transcription subsystem.
    Speech,
    /// Typed in or otherwise created by hand.
    Manual,
}
impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::File => "file",
            Source::Speech => "speech",
            Source::Manual => "manual",
        }
    }
}
impl FromStr for Source {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "file" => Self::File,
            "speech" | "transcript" => Self::Speech,
            "manual" => Self::Manual,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "source",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub source: Source,
    pub created_at: OffsetDateTime,
}

/// A unit of cached textual content.
///
/// Documents are treated as immutable once persisted: changing the content
/// means building a new `Document` with the same `id` and saving it again,
/// which replaces the previous cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identity of the document. Cache keys are derived from this alone.
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
}
impl Document {
    /// Create a document stamped with the current time.
    pub fn new(id: impl Into<String>, content: impl Into<String>, source: Source) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: Metadata { source, created_at: OffsetDateTime::now_utc() },
        }
    }

    pub fn with_created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.metadata.created_at = created_at;
        self
    }

    /// BLAKE3 hash of the content, hex encoded.
    pub fn content_hash(&self) -> String {
        blake3::hash(self.content.as_bytes()).to_string()
    }
}

/// Something that can be stored in the document cache.
///
/// The identity must not depend on the content, otherwise every edit would
/// land in a new cache entry instead of replacing the old one.
pub trait CachableDocument {
    /// The identity fields used for cache key derivation.
    fn cache_identity(&self) -> Cow<'_, str>;

    /// Render into the serializable document form.
    fn to_document(&self) -> Document;
}

impl CachableDocument for Document {
    fn cache_identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }

    fn to_document(&self) -> Document {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("file", Source::File)]
    #[case("Speech", Source::Speech)]
    #[case("transcript", Source::Speech)]
    #[case(" manual ", Source::Manual)]
    fn test_source_parse(#[case] input: &str, #[case] expected: Source) {
        assert_eq!(input.parse::<Source>().unwrap(), expected);
    }

    #[test]
    fn test_source_parse_unknown() {
        let err = "telepathy".parse::<Source>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::ParseError { field: "source", .. }));
    }

    #[test]
    fn test_source_display_round_trips() {
        for source in [Source::File, Source::Speech, Source::Manual] {
            assert_eq!(source.to_string().parse::<Source>().unwrap(), source);
        }
    }

    #[test]
    fn test_content_hash_tracks_content_only() {
        let a = Document::new("Note: Today's Plan!", "buy milk", Source::Manual);
        let b = Document::new("Something else", "buy milk", Source::Speech);
        let c = Document::new("Note: Today's Plan!", "buy bread", Source::Manual);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert_eq!(a.content_hash().len(), 64);
    }

    #[test]
    fn test_identity_is_id() {
        let doc = Document::new("Note: Today's Plan!", "buy milk", Source::Manual);
        assert_eq!(doc.cache_identity(), "Note: Today's Plan!");
        assert_eq!(doc.to_document(), doc);
    }
}
