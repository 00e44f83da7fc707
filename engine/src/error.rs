//! Error types for the backup engine.
//!
//! The primary error type is `EngineError`. Domain validation and job-limit
//! errors surface to callers of the job-management operations; per-file copy
//! errors and fatal execution errors (enumeration, directory creation) are
//! captured by the orchestrator and folded into the `BackupResult` error
//! list, never thrown past its boundary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the engine's domain operations and collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A job failed domain validation
    #[error("Invalid job: {reason}")]
    InvalidJob { reason: String },

    /// Creating another job would exceed the configured limit
    #[error("Job limit exceeded. Maximum allowed: {max}")]
    JobLimitExceeded { max: usize },

    /// No job with the requested id exists in the repository
    #[error("Job with ID {id} not found.")]
    JobNotFound { id: i64 },

    /// A path could not be resolved to absolute form
    #[error("Invalid path: {path} ({reason})")]
    InvalidPath { path: PathBuf, reason: String },

    /// Recursive enumeration of the source tree failed
    #[error("Failed to enumerate directory: {path}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Creating a directory failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading a source file failed
    #[error("Failed to read file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a destination file failed
    #[error("Failed to write file: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A persistence collaborator could not reach its backing file
    #[error("Failed to persist {path}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A persisted document could not be encoded or decoded
    #[error("Serialization failed")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = EngineError::InvalidJob {
            reason: "job name must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid job: job name must not be empty");

        let err = EngineError::JobLimitExceeded { max: 5 };
        assert_eq!(err.to_string(), "Job limit exceeded. Maximum allowed: 5");

        let err = EngineError::JobNotFound { id: 42 };
        assert_eq!(err.to_string(), "Job with ID 42 not found.");
    }

    #[test]
    fn test_io_source_is_preserved() {
        use std::error::Error;

        let err = EngineError::Enumeration {
            path: PathBuf::from("/src"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }
}
