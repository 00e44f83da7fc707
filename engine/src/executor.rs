//! Execution orchestrator.
//!
//! [`BackupExecutor`] coordinates one job execution end to end: it prepares
//! the target root, enumerates candidates, lets the strategy pick the subset
//! to transfer, copies each file while isolating per-file failures, feeds the
//! progress tracker, and publishes transfer-completed and state-changed
//! events. The public contract never fails outright; every execution yields a
//! [`BackupResult`].

use chrono::Local;
use std::path::{self, Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::events::{BackupEvent, EventBus, TransferLog};
use crate::gateway::FileSystemGateway;
use crate::model::{BackupJob, BackupResult, FileDescriptor, JobState};
use crate::path::PathAdapter;
use crate::progress::ProgressTracker;
use crate::strategy::BackupStrategy;

/// Coordinates a single job execution over its collaborators.
///
/// The executor exclusively owns one [`ProgressTracker`] and resets it at
/// the start of every run; no cross-job state survives between executions.
pub struct BackupExecutor<'a> {
    file_system: &'a dyn FileSystemGateway,
    path_adapter: &'a dyn PathAdapter,
    event_bus: &'a EventBus,
    tracker: ProgressTracker,
}

impl<'a> BackupExecutor<'a> {
    pub fn new(
        file_system: &'a dyn FileSystemGateway,
        path_adapter: &'a dyn PathAdapter,
        event_bus: &'a EventBus,
    ) -> Self {
        BackupExecutor {
            file_system,
            path_adapter,
            event_bus,
            tracker: ProgressTracker::new(),
        }
    }

    /// Execute `job` with `strategy` and return the aggregate outcome.
    ///
    /// Per-file copy failures are recorded and the batch continues; fatal
    /// errors (validation, enumeration, directory creation) abort the
    /// remaining steps but still yield a result. A full-strategy run that
    /// finished without a fatal error marks the job's last-full-backup
    /// timestamp, regardless of per-file errors.
    pub fn execute(&mut self, job: &mut BackupJob, strategy: &BackupStrategy) -> BackupResult {
        let started = Instant::now();
        let mut errors: Vec<String> = Vec::new();
        let mut files_processed: usize = 0;
        let mut bytes_transferred: u64 = 0;

        self.tracker.reset();
        info!(job = %job.name, ?strategy, "starting backup execution");

        let fatal = self
            .run(
                job,
                strategy,
                &mut errors,
                &mut files_processed,
                &mut bytes_transferred,
            )
            .err();
        if let Some(err) = &fatal {
            warn!(job = %job.name, %err, "backup execution aborted");
            errors.push(format!("Backup execution failed: {err}"));
        }

        // Bracketing state event: End on a clean run, Error as soon as any
        // per-file or fatal error was recorded.
        let final_state = if errors.is_empty() {
            JobState::End
        } else {
            JobState::Error
        };
        self.tracker.set_state(final_state);
        self.tracker.clear_current_file();
        self.event_bus
            .publish(&BackupEvent::StateChanged(self.tracker.build_snapshot(&job.name)));

        // Per-file errors are non-fatal and do not block the timestamp.
        if fatal.is_none() && *strategy == BackupStrategy::Full {
            job.mark_full_backup_completed(Local::now());
        }

        let duration = started.elapsed();
        info!(
            job = %job.name,
            files = files_processed,
            bytes = bytes_transferred,
            errors = errors.len(),
            "backup execution finished"
        );

        if errors.is_empty() {
            BackupResult::ok(files_processed, bytes_transferred, duration)
        } else {
            BackupResult::fail(errors, duration)
        }
    }

    fn run(
        &mut self,
        job: &BackupJob,
        strategy: &BackupStrategy,
        errors: &mut Vec<String>,
        files_processed: &mut usize,
        bytes_transferred: &mut u64,
    ) -> Result<(), EngineError> {
        let source_root = absolute_path(&job.source_path)?;
        let target_root = absolute_path(&job.target_path)?;

        self.file_system.ensure_directory(&target_root)?;
        let candidates = self.file_system.enumerate_files(&source_root)?;

        job.validate()?;
        let selected = strategy.select_files(job, &candidates);
        debug!(
            job = %job.name,
            candidates = candidates.len(),
            selected = selected.len(),
            "selection complete"
        );

        self.tracker.initialize(&selected);

        for file in &selected {
            let target_path = relocate(&file.path, &source_root, &target_root);
            self.tracker.set_current_file(&file.path, &target_path);

            let copy_started = Instant::now();
            match self.file_system.copy_file(&file.path, &target_path) {
                Ok(bytes) => {
                    *files_processed += 1;
                    *bytes_transferred += bytes;
                    self.tracker.file_processed(file);
                    self.publish_transfer(
                        job,
                        file,
                        &target_path,
                        copy_started.elapsed().as_millis() as i64,
                    );
                }
                Err(err) => {
                    warn!(job = %job.name, path = %file.path.display(), %err, "file copy failed");
                    errors.push(format!("Failed to copy {}: {}", file.path.display(), err));
                    // -1 elapsed signals the failure to log consumers; the
                    // file still counts as processed so remaining decreases.
                    self.publish_transfer(job, file, &target_path, -1);
                    self.tracker.file_processed(file);
                }
            }

            self.event_bus
                .publish(&BackupEvent::StateChanged(self.tracker.build_snapshot(&job.name)));
        }

        Ok(())
    }

    fn publish_transfer(
        &self,
        job: &BackupJob,
        file: &FileDescriptor,
        target_path: &Path,
        elapsed_ms: i64,
    ) {
        let log = TransferLog {
            timestamp: Local::now(),
            backup_job_name: job.name.clone(),
            source_file_path: self.path_adapter.to_unc(&file.path),
            target_file_path: self.path_adapter.to_unc(target_path),
            file_size: file.size,
            transfer_time_ms: elapsed_ms,
        };
        self.event_bus.publish(&BackupEvent::TransferCompleted(log));
    }
}

fn absolute_path(path: &Path) -> Result<PathBuf, EngineError> {
    path::absolute(path).map_err(|e| EngineError::InvalidPath {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Relocate `file` from under `source_root` to the same relative position
/// under `target_root`, preserving subdirectory structure exactly.
fn relocate(file: &Path, source_root: &Path, target_root: &Path) -> PathBuf {
    match file.strip_prefix(source_root) {
        Ok(relative) => target_root.join(relative),
        Err(_) => target_root.join(file.file_name().unwrap_or(file.as_os_str())),
    }
}
