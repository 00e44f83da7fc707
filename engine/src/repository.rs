//! Job persistence.
//!
//! The execution and management services resolve jobs through the
//! [`JobRepository`] trait. [`FileJobRepository`] keeps the whole job list
//! in one JSON document, loaded at construction and rewritten on every
//! mutation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::model::BackupJob;

/// CRUD over stored backup jobs, keyed by integer id.
pub trait JobRepository {
    /// Store a new job. A job with id 0 receives a fresh id (highest
    /// existing id plus one, or 1 for an empty repository).
    fn save(&mut self, job: &mut BackupJob) -> Result<(), EngineError>;

    /// Replace the stored job with the same id.
    ///
    /// # Errors
    /// Returns `EngineError::JobNotFound` when no such job exists.
    fn update(&mut self, job: &BackupJob) -> Result<(), EngineError>;

    /// Remove a job by id.
    ///
    /// # Errors
    /// Returns `EngineError::JobNotFound` when no such job exists.
    fn delete(&mut self, id: i64) -> Result<(), EngineError>;

    fn get_by_id(&self, id: i64) -> Option<BackupJob>;

    fn get_all(&self) -> Vec<BackupJob>;

    fn count(&self) -> usize;
}

/// JSON-file-backed repository.
pub struct FileJobRepository {
    file_path: PathBuf,
    jobs: Vec<BackupJob>,
}

impl FileJobRepository {
    /// Open the repository at `file_path`, loading any existing jobs. A
    /// missing or empty file yields an empty repository.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open<P: AsRef<Path>>(file_path: P) -> Result<Self, EngineError> {
        let file_path = file_path.as_ref().to_path_buf();
        let jobs = Self::load(&file_path)?;
        Ok(FileJobRepository { file_path, jobs })
    }

    fn load(file_path: &Path) -> Result<Vec<BackupJob>, EngineError> {
        if !file_path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(file_path).map_err(|e| EngineError::Persistence {
            path: file_path.to_path_buf(),
            source: e,
        })?;
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    fn persist(&self) -> Result<(), EngineError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| EngineError::Persistence {
                    path: self.file_path.clone(),
                    source: e,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.jobs)?;
        fs::write(&self.file_path, json).map_err(|e| EngineError::Persistence {
            path: self.file_path.clone(),
            source: e,
        })
    }

    fn next_id(&self) -> i64 {
        self.jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1
    }
}

impl JobRepository for FileJobRepository {
    fn save(&mut self, job: &mut BackupJob) -> Result<(), EngineError> {
        if job.id == 0 {
            job.id = self.next_id();
        }
        self.jobs.push(job.clone());
        self.persist()
    }

    fn update(&mut self, job: &BackupJob) -> Result<(), EngineError> {
        let index = self
            .jobs
            .iter()
            .position(|j| j.id == job.id)
            .ok_or(EngineError::JobNotFound { id: job.id })?;
        self.jobs[index] = job.clone();
        self.persist()
    }

    fn delete(&mut self, id: i64) -> Result<(), EngineError> {
        let before = self.jobs.len();
        self.jobs.retain(|j| j.id != id);
        if self.jobs.len() == before {
            return Err(EngineError::JobNotFound { id });
        }
        self.persist()
    }

    fn get_by_id(&self, id: i64) -> Option<BackupJob> {
        self.jobs.iter().find(|j| j.id == id).cloned()
    }

    fn get_all(&self) -> Vec<BackupJob> {
        self.jobs.clone()
    }

    fn count(&self) -> usize {
        self.jobs.len()
    }
}
