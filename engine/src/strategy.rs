//! File-selection strategies.
//!
//! A backup job declares its type; the matching strategy decides which of
//! the candidate files enumerated under the source root actually transfer.

use crate::model::{BackupJob, BackupType, FileDescriptor};

/// The closed set of selection strategies, one variant per [`BackupType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStrategy {
    /// Select every candidate file unconditionally
    Full,
    /// Select only files modified strictly after the job's last completed
    /// full backup; every file when no full backup has completed yet
    Differential,
}

impl BackupStrategy {
    /// Map a job's declared type to its strategy variant.
    pub fn for_type(backup_type: BackupType) -> Self {
        match backup_type {
            BackupType::Full => BackupStrategy::Full,
            BackupType::Differential => BackupStrategy::Differential,
        }
    }

    /// Produce the subset of `files` this strategy transfers for `job`.
    ///
    /// An empty candidate list yields an empty result; this layer has no
    /// error conditions.
    pub fn select_files(&self, job: &BackupJob, files: &[FileDescriptor]) -> Vec<FileDescriptor> {
        match self {
            BackupStrategy::Full => files.to_vec(),
            BackupStrategy::Differential => files
                .iter()
                .filter(|f| job.is_file_modified_since_last_full(f))
                .cloned()
                .collect(),
        }
    }
}
