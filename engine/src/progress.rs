//! Progress tracking for job executions.
//!
//! The orchestrator owns one [`ProgressTracker`] per execution and drives it
//! through a fixed lifecycle: `initialize` (Inactive→Active), a stream of
//! `file_processed` calls, and a single final `set_state` to End or Error.
//! [`StateSnapshot`] is the immutable point-in-time view handed to
//! state-changed event consumers.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::{FileDescriptor, JobState};

/// A point-in-time view of a job execution's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Name of the job being executed
    pub name: String,

    /// When the snapshot was taken
    pub timestamp: DateTime<Local>,

    /// Lifecycle state at snapshot time
    pub state: JobState,

    /// Total number of files selected for transfer
    pub total_files: usize,

    /// Total size in bytes of the selected files
    pub total_size: u64,

    /// Integer percentage of processed files (floor; 0 when nothing selected)
    pub progress: u8,

    /// Files not yet processed
    pub files_remaining: usize,

    /// Bytes not yet processed
    pub size_remaining: u64,

    /// Source path of the file currently transferring (empty when idle)
    pub current_source_file: String,

    /// Target path of the file currently transferring (empty when idle)
    pub current_target_file: String,
}

/// Stateful accumulator turning "file processed" events into snapshots.
///
/// Holds no cross-job state; the orchestrator resets it at the start of
/// every run.
#[derive(Debug)]
pub struct ProgressTracker {
    state: JobState,
    total_files: usize,
    processed_files: usize,
    total_bytes: u64,
    processed_bytes: u64,
    current_file: Option<(PathBuf, PathBuf)>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        ProgressTracker {
            state: JobState::Inactive,
            total_files: 0,
            processed_files: 0,
            total_bytes: 0,
            processed_bytes: 0,
            current_file: None,
        }
    }

    /// Begin tracking a new selection: resets the counters, records the
    /// totals, and moves the lifecycle state to Active.
    pub fn initialize(&mut self, files: &[FileDescriptor]) {
        self.total_files = files.len();
        self.total_bytes = files.iter().map(|f| f.size).sum();
        self.processed_files = 0;
        self.processed_bytes = 0;
        self.current_file = None;
        self.state = JobState::Active;
    }

    /// Count one file as processed (copied or failed). Does not change the
    /// lifecycle state.
    pub fn file_processed(&mut self, file: &FileDescriptor) {
        self.processed_files += 1;
        self.processed_bytes += file.size;
    }

    /// Record the source/target pair currently being transferred.
    pub fn set_current_file(&mut self, source: &Path, target: &Path) {
        self.current_file = Some((source.to_path_buf(), target.to_path_buf()));
    }

    /// Clear the displayed path pair.
    pub fn clear_current_file(&mut self) {
        self.current_file = None;
    }

    /// Force the lifecycle state. The orchestrator calls this exactly once
    /// per execution to reach End or Error.
    pub fn set_state(&mut self, state: JobState) {
        self.state = state;
    }

    /// Integer progress percentage, `floor(processed / total * 100)`.
    ///
    /// Defined as 0 when no files are selected; this guards the division,
    /// it does not imply completion.
    pub fn progress(&self) -> u8 {
        if self.total_files == 0 {
            return 0;
        }
        (self.processed_files * 100 / self.total_files) as u8
    }

    /// Build an immutable snapshot of the current progress.
    pub fn build_snapshot(&self, job_name: &str) -> StateSnapshot {
        let (current_source, current_target) = match &self.current_file {
            Some((source, target)) => (
                source.to_string_lossy().into_owned(),
                target.to_string_lossy().into_owned(),
            ),
            None => (String::new(), String::new()),
        };

        StateSnapshot {
            name: job_name.to_string(),
            timestamp: Local::now(),
            state: self.state,
            total_files: self.total_files,
            total_size: self.total_bytes,
            progress: self.progress(),
            files_remaining: self.total_files - self.processed_files,
            size_remaining: self.total_bytes - self.processed_bytes,
            current_source_file: current_source,
            current_target_file: current_target,
        }
    }

    /// Return to the initial Inactive state with zeroed counters.
    pub fn reset(&mut self) {
        *self = ProgressTracker::new();
    }
}
