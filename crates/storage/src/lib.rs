//! File-system primitives for the document cache.
//!
//! Everything above this crate talks to a [`StorageBackend`] and never to
//! `std::fs` directly: raw read, write, append, list and existence checks,
//! relative to a backend root. Backends perform no caching of their own.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
