//! Core data model for backup jobs.
//!
//! This module defines the main data structures for representing backup
//! operations:
//! - BackupJob: a named source→target mapping plus a selection strategy type
//! - FileDescriptor: a single candidate file under a job's source root
//! - BackupResult: the immutable outcome of one job execution
//! - BackupType, JobState: enums controlling selection and lifecycle

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::EngineError;

/// Maximum number of jobs a repository may hold.
pub const MAX_JOBS: usize = 5;

/// Represents a single user-defined backup job.
///
/// A BackupJob maps a source directory to a target directory and declares
/// which selection strategy applies when the job executes. Jobs must pass
/// [`BackupJob::validate`] before participating in any execution or
/// persistence operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupJob {
    /// Repository-assigned identifier; 0 means "not yet persisted"
    pub id: i64,

    /// Display name (non-empty)
    pub name: String,

    /// Root directory to back up
    pub source_path: PathBuf,

    /// Root directory receiving the copies; must differ from the source
    pub target_path: PathBuf,

    /// Selection strategy applied on execution
    pub backup_type: BackupType,

    /// When the last full backup finished without a fatal error
    pub last_full_backup: Option<DateTime<Local>>,

    /// When the job was created
    pub created_at: DateTime<Local>,
}

impl BackupJob {
    /// Create a new, unsaved job (id 0, no completed full backup yet).
    pub fn new<P: AsRef<Path>>(
        name: &str,
        source_path: P,
        target_path: P,
        backup_type: BackupType,
    ) -> Self {
        BackupJob {
            id: 0,
            name: name.to_string(),
            source_path: source_path.as_ref().to_path_buf(),
            target_path: target_path.as_ref().to_path_buf(),
            backup_type,
            last_full_backup: None,
            created_at: Local::now(),
        }
    }

    /// Check the job's structural invariants.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidJob` if the name, source path, or target
    /// path is empty or whitespace, or if the source equals the target
    /// exactly.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidJob {
                reason: "job name must not be empty".to_string(),
            });
        }
        if self.source_path.to_string_lossy().trim().is_empty() {
            return Err(EngineError::InvalidJob {
                reason: "source path must not be empty".to_string(),
            });
        }
        if self.target_path.to_string_lossy().trim().is_empty() {
            return Err(EngineError::InvalidJob {
                reason: "target path must not be empty".to_string(),
            });
        }
        if self.source_path == self.target_path {
            return Err(EngineError::InvalidJob {
                reason: "source and target paths must differ".to_string(),
            });
        }
        Ok(())
    }

    /// Produce a validated replacement for this job with new name, paths,
    /// and type. Identity, creation time, and the last-full timestamp are
    /// carried over unchanged.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidJob` if the replacement fails validation.
    pub fn with_changes<P: AsRef<Path>>(
        &self,
        name: &str,
        source_path: P,
        target_path: P,
        backup_type: BackupType,
    ) -> Result<Self, EngineError> {
        let updated = BackupJob {
            id: self.id,
            name: name.to_string(),
            source_path: source_path.as_ref().to_path_buf(),
            target_path: target_path.as_ref().to_path_buf(),
            backup_type,
            last_full_backup: self.last_full_backup,
            created_at: self.created_at,
        };
        updated.validate()?;
        Ok(updated)
    }

    /// Record the completion instant of a full backup.
    pub fn mark_full_backup_completed(&mut self, at: DateTime<Local>) {
        self.last_full_backup = Some(at);
    }

    /// True when the file was modified strictly after the last completed
    /// full backup. Always true for a job that never completed one.
    ///
    /// A file modified at exactly the last-full instant is excluded.
    pub fn is_file_modified_since_last_full(&self, file: &FileDescriptor) -> bool {
        match self.last_full_backup {
            Some(last_full) => file.last_modified > last_full,
            None => true,
        }
    }
}

/// The declared selection strategy of a backup job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupType {
    /// Copy every candidate file unconditionally
    Full,
    /// Copy only files modified after the last completed full backup
    Differential,
}

impl std::fmt::Display for BackupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupType::Full => write!(f, "Full"),
            BackupType::Differential => write!(f, "Differential"),
        }
    }
}

/// An immutable description of one candidate file under a job's source root.
///
/// Two descriptors are equal iff path, size, and modification time all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Absolute path of the file
    pub path: PathBuf,

    /// Size in bytes
    pub size: u64,

    /// Last modification time
    pub last_modified: DateTime<Local>,
}

impl FileDescriptor {
    pub fn new<P: AsRef<Path>>(path: P, size: u64, last_modified: DateTime<Local>) -> Self {
        FileDescriptor {
            path: path.as_ref().to_path_buf(),
            size,
            last_modified,
        }
    }
}

/// The immutable outcome of one job execution.
///
/// Instances are only obtainable through [`BackupResult::ok`] and
/// [`BackupResult::fail`]. A failed result always reports zero file/byte
/// counts, even when some files copied successfully before a later failure;
/// the error list still reflects the exact per-file errors.
#[derive(Debug, Clone)]
pub struct BackupResult {
    success: bool,
    files_processed: usize,
    bytes_transferred: u64,
    duration: Duration,
    errors: Vec<String>,
}

impl BackupResult {
    /// A successful execution with aggregate counts. The error list is empty.
    pub fn ok(files_processed: usize, bytes_transferred: u64, duration: Duration) -> Self {
        BackupResult {
            success: true,
            files_processed,
            bytes_transferred,
            duration,
            errors: Vec::new(),
        }
    }

    /// A failed execution carrying the recorded errors. Counts are zeroed.
    pub fn fail(errors: Vec<String>, duration: Duration) -> Self {
        BackupResult {
            success: false,
            files_processed: 0,
            bytes_transferred: 0,
            duration,
            errors,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn files_processed(&self) -> usize {
        self.files_processed
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// The lifecycle state of a job execution as seen by progress consumers.
///
/// Serialized using the uppercase wire form (`"ACTIVE"`, `"END"`, ...) that
/// state-snapshot consumers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// No execution in progress (initial state)
    Inactive,
    /// An execution is running
    Active,
    /// The last execution finished without per-file errors
    End,
    /// The last execution recorded at least one error
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_job() -> BackupJob {
        BackupJob::new("Docs", "/src", "/dst", BackupType::Full)
    }

    #[test]
    fn test_new_job_is_unsaved() {
        let job = sample_job();
        assert_eq!(job.id, 0);
        assert!(job.last_full_backup.is_none());
    }

    #[test]
    fn test_validate_accepts_well_formed_job() {
        assert!(sample_job().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut job = sample_job();
        job.name = "   ".to_string();
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_source() {
        let mut job = sample_job();
        job.source_path = PathBuf::from("");
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_target() {
        let mut job = sample_job();
        job.target_path = PathBuf::from("  ");
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_source_equal_to_target() {
        let job = BackupJob::new("Docs", "/same", "/same", BackupType::Full);
        let err = job.validate().unwrap_err();
        assert!(err.to_string().contains("differ"));
    }

    #[test]
    fn test_with_changes_revalidates() {
        let job = sample_job();
        assert!(job.with_changes("Docs", "/x", "/x", BackupType::Full).is_err());

        let updated = job
            .with_changes("Photos", "/pics", "/backup/pics", BackupType::Differential)
            .expect("Valid changes should be accepted");
        assert_eq!(updated.id, job.id);
        assert_eq!(updated.name, "Photos");
        assert_eq!(updated.backup_type, BackupType::Differential);
        assert_eq!(updated.created_at, job.created_at);
    }

    #[test]
    fn test_mark_full_backup_completed_sets_timestamp() {
        let mut job = sample_job();
        let at = Local::now();
        job.mark_full_backup_completed(at);
        assert_eq!(job.last_full_backup, Some(at));
    }

    #[test]
    fn test_modified_since_last_full_with_no_full_backup() {
        let job = sample_job();
        let file = FileDescriptor::new("/src/a.txt", 1, Local::now());
        assert!(job.is_file_modified_since_last_full(&file));
    }

    #[test]
    fn test_modified_since_last_full_is_strict() {
        let mut job = sample_job();
        let last_full = Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        job.mark_full_backup_completed(last_full);

        let at_boundary = FileDescriptor::new("/src/a.txt", 1, last_full);
        let after = FileDescriptor::new(
            "/src/b.txt",
            1,
            Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 1).unwrap(),
        );
        let before = FileDescriptor::new(
            "/src/c.txt",
            1,
            Local.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).unwrap(),
        );

        assert!(!job.is_file_modified_since_last_full(&at_boundary));
        assert!(job.is_file_modified_since_last_full(&after));
        assert!(!job.is_file_modified_since_last_full(&before));
    }

    #[test]
    fn test_file_descriptor_equality_over_all_fields() {
        let at = Local::now();
        let a = FileDescriptor::new("/src/a.txt", 10, at);
        let b = FileDescriptor::new("/src/a.txt", 10, at);
        let c = FileDescriptor::new("/src/a.txt", 11, at);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_result_ok_has_no_errors() {
        let result = BackupResult::ok(3, 1024, Duration::from_secs(1));
        assert!(result.success());
        assert_eq!(result.files_processed(), 3);
        assert_eq!(result.bytes_transferred(), 1024);
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_result_fail_zeroes_counts() {
        let result = BackupResult::fail(
            vec!["Failed to copy /src/a.txt: denied".to_string()],
            Duration::from_secs(2),
        );
        assert!(!result.success());
        assert_eq!(result.files_processed(), 0);
        assert_eq!(result.bytes_transferred(), 0);
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_job_state_wire_format() {
        assert_eq!(
            serde_json::to_string(&JobState::Active).unwrap(),
            "\"ACTIVE\""
        );
        assert_eq!(serde_json::to_string(&JobState::End).unwrap(), "\"END\"");
        let state: JobState = serde_json::from_str("\"INACTIVE\"").unwrap();
        assert_eq!(state, JobState::Inactive);
    }
}
