//! File-system gateway.
//!
//! The orchestrator never touches the file system directly; it goes through
//! the [`FileSystemGateway`] trait so tests can substitute failing or
//! recording doubles. [`LocalFileSystemGateway`] is the production
//! implementation over a local, directly-mounted file system.

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::EngineError;
use crate::model::FileDescriptor;

/// File-system operations the orchestrator depends on.
pub trait FileSystemGateway {
    /// Recursively enumerate every file under `root` in a deterministic
    /// order. An absent root yields an empty list, not an error.
    ///
    /// # Errors
    /// Returns `EngineError::Enumeration` if the walk fails partway.
    fn enumerate_files(&self, root: &Path) -> Result<Vec<FileDescriptor>, EngineError>;

    /// Create `path` and any missing parents. Idempotent.
    ///
    /// # Errors
    /// Returns `EngineError::DirectoryCreation` on failure.
    fn ensure_directory(&self, path: &Path) -> Result<(), EngineError>;

    /// Copy `source` to `target`, creating the target's parent directories
    /// and overwriting an existing destination.
    ///
    /// # Returns
    /// Number of bytes copied.
    ///
    /// # Errors
    /// Returns `EngineError::Read` or `EngineError::Write` depending on
    /// which side failed.
    fn copy_file(&self, source: &Path, target: &Path) -> Result<u64, EngineError>;

    /// True when a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// Production gateway backed by the local file system.
#[derive(Debug, Default)]
pub struct LocalFileSystemGateway;

impl LocalFileSystemGateway {
    pub fn new() -> Self {
        LocalFileSystemGateway
    }
}

impl FileSystemGateway for LocalFileSystemGateway {
    fn enumerate_files(&self, root: &Path) -> Result<Vec<FileDescriptor>, EngineError> {
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| EngineError::Enumeration {
                path: root.to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry.metadata().map_err(|e| EngineError::Enumeration {
                path: entry.path().to_path_buf(),
                source: e.into(),
            })?;
            let modified = metadata.modified().map_err(|e| EngineError::Enumeration {
                path: entry.path().to_path_buf(),
                source: e,
            })?;

            files.push(FileDescriptor::new(
                entry.into_path(),
                metadata.len(),
                DateTime::<Local>::from(modified),
            ));
        }
        Ok(files)
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), EngineError> {
        fs::create_dir_all(path).map_err(|e| EngineError::DirectoryCreation {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn copy_file(&self, source: &Path, target: &Path) -> Result<u64, EngineError> {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| EngineError::DirectoryCreation {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut source_file = fs::File::open(source).map_err(|e| EngineError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

        let source_metadata = source_file.metadata().map_err(|e| EngineError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        let source_mtime = source_metadata.modified().ok();

        let mut target_file = fs::File::create(target).map_err(|e| EngineError::Write {
            path: target.to_path_buf(),
            source: e,
        })?;

        let bytes_copied = io::copy(&mut source_file, &mut target_file).map_err(|e| {
            if e.kind() == io::ErrorKind::PermissionDenied {
                EngineError::Write {
                    path: target.to_path_buf(),
                    source: e,
                }
            } else {
                EngineError::Read {
                    path: source.to_path_buf(),
                    source: e,
                }
            }
        })?;

        // Preserve the source modification time if available
        if let Some(mtime) = source_mtime {
            let _ = filetime::set_file_mtime(target, filetime::FileTime::from_system_time(mtime));
        }

        Ok(bytes_copied)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
