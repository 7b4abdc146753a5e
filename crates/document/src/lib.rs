//! Documents and the sources that produce them.
//!
//! A [`Document`] is a unit of textual content (a note, a transcript, a file
//! pulled off disk) with a stable identity. Anything that wants to be cached
//! implements [`CachableDocument`]; anything that can hand out a batch of
//! cachable documents implements [`DocumentDatabase`].

pub mod database;
mod document;
pub mod error;

pub use crate::database::{DirectoryDatabase, DocumentDatabase, MemoryDatabase};
pub use crate::document::{CachableDocument, Document, Metadata, Source};
