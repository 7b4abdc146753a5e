//! On-disk artifact format.

use crate::CacheKey;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use recall_document::{Document, Metadata, Source};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// The serialized shape of a document inside a cache file.
#[derive(Debug, Serialize, Deserialize)]
struct EntryRow {
    id: String,
    content: String,
    source: String,
    created_at: String,
    /// BLAKE3 of `content`, checked on decode.
    content_hash: String,
}
impl TryFrom<&Document> for EntryRow {
    type Error = crate::error::Error;
    fn try_from(document: &Document) -> Result<Self> {
        Ok(Self {
            id: document.id.clone(),
            content: document.content.clone(),
            source: document.metadata.source.as_str().to_string(),
            created_at: document.metadata.created_at.format(&Rfc3339).or_raise(|| ErrorKind::Serialize)?,
            content_hash: document.content_hash(),
        })
    }
}

/// One cache artifact: the file name and the bytes stored under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub bytes: Vec<u8>,
}
impl CacheEntry {
    /// Serialize a document for storage under `key`.
    pub fn encode(key: CacheKey, document: &Document) -> Result<Self> {
        let row = EntryRow::try_from(document)?;
        let bytes = serde_json::to_vec_pretty(&row).or_raise(|| ErrorKind::Serialize)?;
        Ok(Self { key, bytes })
    }

    /// Turn the stored bytes back into a document.
    ///
    /// Anything that doesn't round-trip (malformed JSON, unknown source,
    /// unparseable timestamp, content that no longer matches its hash) is
    /// [`CorruptArtifact`](ErrorKind::CorruptArtifact).
    pub fn decode(&self) -> Result<Document> {
        let corrupt = || ErrorKind::CorruptArtifact(self.key.to_string());
        let row: EntryRow = serde_json::from_slice(&self.bytes).or_raise(corrupt)?;
        let source = row.source.parse::<Source>().or_raise(corrupt)?;
        let created_at = OffsetDateTime::parse(&row.created_at, &Rfc3339).or_raise(corrupt)?;
        let document = Document {
            id: row.id,
            content: row.content,
            metadata: Metadata { source, created_at },
        };
        if document.content_hash() != row.content_hash {
            tracing::debug!(key = %self.key, "Stored content hash does not match content");
            exn::bail!(corrupt());
        }
        Ok(document)
    }
}
