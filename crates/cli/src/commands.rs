//! Subcommand Implementations

use crate::args::Command;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use recall_cache::{BulkReport, LocalDocumentCache, derive_key};
use recall_document::{DirectoryDatabase, Document};
use recall_storage::BackendHandle;
use recall_storage::backend::LocalBackend;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Whether every item a command touched was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Complete,
    Partial,
}
impl From<&BulkReport> for Status {
    fn from(report: &BulkReport) -> Self {
        match report.is_complete() {
            true => Self::Complete,
            false => Self::Partial,
        }
    }
}

pub fn run(command: &Command, cache: BackendHandle, out: &mut impl Write) -> Result<Status> {
    match command {
        Command::Import { dir } => import(dir, cache, out),
        Command::List => list(cache, out),
        Command::Show { key } => show(key, cache, out),
        Command::Load => load(cache, out),
        Command::Key { identity } => key(identity, out),
    }
}

fn import(dir: &Path, cache: BackendHandle, out: &mut impl Write) -> Result<Status> {
    let root = std::path::absolute(dir).or_raise(|| ErrorKind::Import)?;
    if !root.is_dir() {
        exn::bail!(ErrorKind::Import);
    }
    let source: BackendHandle = Arc::new(LocalBackend::new("documents", root).or_raise(|| ErrorKind::Import)?);
    let database = DirectoryDatabase::load(&source, None).or_raise(|| ErrorKind::Import)?;
    let report = LocalDocumentCache::new(cache).add_documents_to_memory(&database).save_documents_in_memory_to_disk();
    for path in database.skipped() {
        writeln!(out, "skipped {}", path.display()).or_raise(|| ErrorKind::Output)?;
    }
    write_report(out, "saved", &report)?;
    match database.skipped().is_empty() {
        true => Ok(Status::from(&report)),
        false => Ok(Status::Partial),
    }
}

fn list(cache: BackendHandle, out: &mut impl Write) -> Result<Status> {
    let cache = LocalDocumentCache::new(cache);
    for key in cache.store().list_all().or_raise(|| ErrorKind::Cache)? {
        writeln!(out, "{key}").or_raise(|| ErrorKind::Output)?;
    }
    Ok(Status::Complete)
}

/// Accepts either a key or an identity; sanitizing a valid key is a no-op.
fn show(input: &str, cache: BackendHandle, out: &mut impl Write) -> Result<Status> {
    let key = derive_key(input).or_raise(|| ErrorKind::Cache)?;
    let document = LocalDocumentCache::new(cache).get_single_document_from_disk(&key).or_raise(|| ErrorKind::Cache)?;
    write_document(out, &document).or_raise(|| ErrorKind::Output)?;
    Ok(Status::Complete)
}

fn load(cache: BackendHandle, out: &mut impl Write) -> Result<Status> {
    let mut cache = LocalDocumentCache::new(cache);
    let report = cache.load_documents_from_disk_into_memory().or_raise(|| ErrorKind::Cache)?;
    write_report(out, "loaded", &report)?;
    Ok(Status::from(&report))
}

fn key(identity: &str, out: &mut impl Write) -> Result<Status> {
    let key = derive_key(identity).or_raise(|| ErrorKind::Cache)?;
    writeln!(out, "{key}").or_raise(|| ErrorKind::Output)?;
    Ok(Status::Complete)
}

fn write_report(out: &mut impl Write, verb: &str, report: &BulkReport) -> Result<()> {
    writeln!(out, "{verb} {} of {} documents", report.succeeded, report.attempted()).or_raise(|| ErrorKind::Output)?;
    for key in &report.failed {
        writeln!(out, "failed {key}").or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

fn write_document(out: &mut impl Write, document: &Document) -> std::io::Result<()> {
    writeln!(out, "id:         {}", document.id)?;
    writeln!(out, "source:     {}", document.metadata.source)?;
    writeln!(out, "created at: {}", document.metadata.created_at)?;
    writeln!(out)?;
    writeln!(out, "{}", document.content)
}
