//! Local disk-backed document cache.
//!
//! The cache sits between an in-memory set of documents and a directory on
//! disk. It is not the source of truth: documents come from a
//! [`DocumentDatabase`](recall_document::DocumentDatabase), and the disk copy
//! exists so a later run can reload them without asking the database again.
//!
//! # Architecture
//! - [`derive_key`] turns a document's identity into a [`CacheKey`], a
//!   filesystem-safe file name. The key never depends on content, so saving
//!   an edited document replaces its previous entry.
//! - [`DiskDocumentStore`] reads and writes one [`CacheEntry`] per document
//!   through a storage backend. It holds no state of its own.
//! - [`LocalDocumentCache`] keeps the in-memory [`CacheIndex`] and moves
//!   documents between it and the store, one at a time or in bulk. Bulk
//!   operations never abort on a single bad entry; they return a
//!   [`BulkReport`] instead.

mod cache;
mod entry;
pub mod error;
mod index;
mod key;
mod report;
mod store;

pub use crate::cache::LocalDocumentCache;
pub use crate::entry::CacheEntry;
pub use crate::index::CacheIndex;
pub use crate::key::{CacheKey, MAX_KEY_LEN, derive_key};
pub use crate::report::BulkReport;
pub use crate::store::DiskDocumentStore;
