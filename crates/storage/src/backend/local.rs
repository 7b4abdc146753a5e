//! Local filesystem storage backend.

use crate::error::{ErrorKind, Result};
use crate::{FileInfo, StorageBackend, path::validate as validate_path};
use exn::ResultExt;
use std::fs::{self, DirEntry, File, Metadata, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// Stores files in a directory on the local filesystem. All paths are relative
/// to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use recall_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("cache", "/home/me/.cache/recall")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend rooted at `root`.
    ///
    /// The root must be absolute. It is created if it doesn't exist yet, and
    /// must be a directory if it does.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            fs::create_dir_all(&root).map_err(|e| ErrorKind::from_io(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Strips the root prefix back off an absolute path.
    fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{:?}` is not within root `{:?}`", absolute, self.root))
        })?;
        validate_path(relative)
    }

    fn file_info(path: &Path, metadata: Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(FileInfo::new(path, metadata.len(), modified))
    }

    /// Classify one directory entry. File symlinks are followed; directory
    /// symlinks are not, since they can point back above themselves.
    fn process_entry(&self, entry: DirEntry, prefix: Option<&Path>) -> Result<WalkEntry> {
        let path = entry.path();
        let relative = self.relative_path(&path)?;
        if let Some(pfx) = prefix
            && !relative.starts_with(pfx)
        {
            return Ok(WalkEntry::Skip);
        }
        let file_type = entry.file_type().map_err(|e| ErrorKind::from_io(e, &path))?;
        let metadata = fs::metadata(&path).map_err(|e| ErrorKind::from_io(e, &path))?;
        if metadata.is_dir() {
            return Ok(match file_type.is_symlink() {
                true => WalkEntry::Skip,
                false => WalkEntry::Descend(path),
            });
        }
        if metadata.is_file() {
            return Ok(WalkEntry::File(Self::file_info(&relative, metadata)?));
        }
        // Sockets, FIFOs and device files.
        Ok(WalkEntry::Skip)
    }

    /// Flush file contents and metadata before reporting success.
    fn finish(mut file: File, data: &[u8], path: &Path) -> Result<()> {
        file.write_all(data).map_err(|e| ErrorKind::from_io(e, path))?;
        file.sync_all().map_err(|e| ErrorKind::from_io(e, path))?;
        Ok(())
    }

    fn create_parent(&self, absolute: &Path, path: &Path) -> Result<()> {
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).map_err(|e| ErrorKind::from_io(e, path))?;
        }
        Ok(())
    }
}

impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    /// Only a failure to read the starting directory is an error. Anything
    /// unreadable further down is skipped with a warning.
    fn list(&self, prefix: Option<&Path>) -> Result<Vec<FileInfo>> {
        let prefix = prefix.map(validate_path).transpose()?;
        // Walk from the parent of the prefix so that a prefix naming a file,
        // or a directory that doesn't exist yet, still works.
        let start = prefix
            .as_ref()
            .map(|pfx| self.root.join(pfx).parent().unwrap_or(&self.root).to_path_buf())
            .unwrap_or_else(|| self.root.clone());
        let mut stack = vec![start.clone()];
        let mut files = Vec::new();
        while let Some(current) = stack.pop() {
            let entries = match fs::read_dir(&current) {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) if current == start => exn::bail!(ErrorKind::from_io(err, &current)),
                Err(err) => {
                    tracing::warn!(backend = %self.name, path = %current.display(), error = %err, "Skipping unreadable directory");
                    continue;
                },
            };
            for entry in entries {
                let walked = entry
                    .map_err(|e| exn::Exn::from(ErrorKind::from_io(e, &current)))
                    .and_then(|entry| self.process_entry(entry, prefix.as_deref()));
                match walked {
                    Ok(WalkEntry::File(info)) => files.push(info),
                    Ok(WalkEntry::Descend(dir)) => stack.push(dir),
                    Ok(WalkEntry::Skip) => {},
                    Err(err) => tracing::warn!(backend = %self.name, error = ?err, "Skipping unreadable directory entry"),
                }
            }
        }
        tracing::trace!(backend = %self.name, files = files.len(), "Listed directory");
        Ok(files)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(abs_path.try_exists().map_err(|e| ErrorKind::from_io(e, path))? && abs_path.is_file())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).map_err(|e| ErrorKind::from_io(e, path))?)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        self.create_parent(&abs_path, path)?;
        let file = File::create(&abs_path).map_err(|e| ErrorKind::from_io(e, path))?;
        Self::finish(file, data, path)
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        self.create_parent(&abs_path, path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&abs_path)
            .map_err(|e| ErrorKind::from_io(e, path))?;
        Self::finish(file, data, path)
    }
}
