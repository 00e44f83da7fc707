//! Application services.
//!
//! Job management (create, list, modify, delete) and batch execution. The
//! execution service maps requested job ids to orchestrator invocations and
//! collects one result per id; a missing id becomes a per-job failure, never
//! an abort of the whole batch.

use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::error::EngineError;
use crate::executor::BackupExecutor;
use crate::model::{BackupJob, BackupResult, BackupType, MAX_JOBS};
use crate::repository::JobRepository;
use crate::strategy::BackupStrategy;

/// One batch entry: the requested id and the outcome of its execution.
#[derive(Debug)]
pub struct JobExecutionResult {
    pub job_id: i64,
    pub result: BackupResult,
}

/// Execute the requested jobs sequentially, in request order.
///
/// A job id with no stored job yields a failed result for that entry and
/// processing continues with the remaining ids. Executed jobs are written
/// back through the repository so a refreshed last-full-backup timestamp
/// persists.
pub fn execute_jobs(
    repository: &mut dyn JobRepository,
    executor: &mut BackupExecutor,
    ids: &[i64],
) -> Vec<JobExecutionResult> {
    let mut results = Vec::with_capacity(ids.len());

    for &id in ids {
        let Some(mut job) = repository.get_by_id(id) else {
            results.push(JobExecutionResult {
                job_id: id,
                result: BackupResult::fail(
                    vec![format!("Job with ID {id} not found.")],
                    Duration::ZERO,
                ),
            });
            continue;
        };

        let strategy = BackupStrategy::for_type(job.backup_type);
        let result = executor.execute(&mut job, &strategy);

        if let Err(err) = repository.update(&job) {
            warn!(job = %job.name, %err, "failed to persist job after execution");
        }

        results.push(JobExecutionResult { job_id: id, result });
    }

    results
}

/// Execute every job currently on file.
pub fn execute_all_jobs(
    repository: &mut dyn JobRepository,
    executor: &mut BackupExecutor,
) -> Vec<JobExecutionResult> {
    let ids: Vec<i64> = repository.get_all().iter().map(|j| j.id).collect();
    execute_jobs(repository, executor, &ids)
}

/// Create, validate, and store a new job.
///
/// # Errors
/// Returns `EngineError::JobLimitExceeded` when the repository already holds
/// the maximum number of jobs, or `EngineError::InvalidJob` when validation
/// fails.
pub fn create_job<P: AsRef<Path>>(
    repository: &mut dyn JobRepository,
    name: &str,
    source_path: P,
    target_path: P,
    backup_type: BackupType,
) -> Result<BackupJob, EngineError> {
    if repository.count() >= MAX_JOBS {
        return Err(EngineError::JobLimitExceeded { max: MAX_JOBS });
    }

    let mut job = BackupJob::new(name, source_path, target_path, backup_type);
    job.validate()?;
    repository.save(&mut job)?;
    Ok(job)
}

/// All jobs currently on file.
pub fn list_jobs(repository: &dyn JobRepository) -> Vec<BackupJob> {
    repository.get_all()
}

/// Replace a job's name, paths, and type, re-validating the result.
///
/// # Errors
/// Returns `EngineError::JobNotFound` for an unknown id or
/// `EngineError::InvalidJob` when the replacement fails validation.
pub fn modify_job<P: AsRef<Path>>(
    repository: &mut dyn JobRepository,
    id: i64,
    name: &str,
    source_path: P,
    target_path: P,
    backup_type: BackupType,
) -> Result<BackupJob, EngineError> {
    let job = repository
        .get_by_id(id)
        .ok_or(EngineError::JobNotFound { id })?;
    let updated = job.with_changes(name, source_path, target_path, backup_type)?;
    repository.update(&updated)?;
    Ok(updated)
}

/// Delete a job by id.
pub fn delete_job(repository: &mut dyn JobRepository, id: i64) -> Result<(), EngineError> {
    repository.delete(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::gateway::LocalFileSystemGateway;
    use crate::path::UncPathAdapter;
    use crate::repository::FileJobRepository;
    use std::fs;

    fn repository(temp_dir: &tempfile::TempDir) -> FileJobRepository {
        FileJobRepository::open(temp_dir.path().join("jobs.json"))
            .expect("Failed to open repository")
    }

    fn source_with_file(temp_dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let src = temp_dir.path().join(name);
        fs::create_dir_all(&src).expect("Failed to create source");
        fs::write(src.join("data.txt"), b"payload").expect("Failed to write file");
        src
    }

    #[test]
    fn test_create_job_assigns_id_and_persists() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);

        let job = create_job(&mut repo, "Docs", "/src", "/dst", BackupType::Full)
            .expect("Failed to create job");

        assert_eq!(job.id, 1);
        assert_eq!(repo.count(), 1);
    }

    #[test]
    fn test_create_job_rejects_invalid_definition() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);

        let result = create_job(&mut repo, "", "/src", "/dst", BackupType::Full);
        assert!(matches!(result, Err(EngineError::InvalidJob { .. })));
        assert_eq!(repo.count(), 0);
    }

    #[test]
    fn test_create_job_enforces_limit() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);

        for i in 0..MAX_JOBS {
            create_job(
                &mut repo,
                &format!("Job{i}"),
                "/src",
                "/dst",
                BackupType::Full,
            )
            .expect("Creation under the limit should succeed");
        }

        let result = create_job(&mut repo, "One too many", "/src", "/dst", BackupType::Full);
        assert!(matches!(
            result,
            Err(EngineError::JobLimitExceeded { max: MAX_JOBS })
        ));
    }

    #[test]
    fn test_modify_job_revalidates_and_updates() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);
        let job = create_job(&mut repo, "Docs", "/src", "/dst", BackupType::Full)
            .expect("Failed to create job");

        let updated = modify_job(
            &mut repo,
            job.id,
            "Docs2",
            "/src",
            "/dst2",
            BackupType::Differential,
        )
        .expect("Failed to modify job");
        assert_eq!(updated.name, "Docs2");
        assert_eq!(
            repo.get_by_id(job.id).unwrap().backup_type,
            BackupType::Differential
        );

        let invalid = modify_job(&mut repo, job.id, "Docs2", "/x", "/x", BackupType::Full);
        assert!(matches!(invalid, Err(EngineError::InvalidJob { .. })));
    }

    #[test]
    fn test_modify_unknown_job_fails() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);

        let result = modify_job(&mut repo, 99, "Docs", "/src", "/dst", BackupType::Full);
        assert!(matches!(result, Err(EngineError::JobNotFound { id: 99 })));
    }

    #[test]
    fn test_execute_jobs_isolates_missing_ids() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);

        let src = source_with_file(&temp_dir, "src");
        let dst = temp_dir.path().join("dst");
        let job = create_job(&mut repo, "Docs", &src, &dst, BackupType::Full)
            .expect("Failed to create job");

        let gateway = LocalFileSystemGateway::new();
        let paths = UncPathAdapter::with_machine_name("HOST");
        let bus = EventBus::new();
        let mut executor = BackupExecutor::new(&gateway, &paths, &bus);

        let results = execute_jobs(&mut repo, &mut executor, &[job.id, 42]);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].job_id, job.id);
        assert!(results[0].result.success());

        assert_eq!(results[1].job_id, 42);
        assert!(!results[1].result.success());
        assert_eq!(
            results[1].result.errors(),
            &["Job with ID 42 not found.".to_string()]
        );
        assert_eq!(results[1].result.duration(), Duration::ZERO);
    }

    #[test]
    fn test_execute_jobs_results_match_request_order() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);

        let src = source_with_file(&temp_dir, "src");
        let first = create_job(&mut repo, "First", &src, &temp_dir.path().join("d1"), BackupType::Full)
            .expect("Failed to create job");
        let second = create_job(&mut repo, "Second", &src, &temp_dir.path().join("d2"), BackupType::Full)
            .expect("Failed to create job");

        let gateway = LocalFileSystemGateway::new();
        let paths = UncPathAdapter::with_machine_name("HOST");
        let bus = EventBus::new();
        let mut executor = BackupExecutor::new(&gateway, &paths, &bus);

        let results = execute_jobs(&mut repo, &mut executor, &[second.id, first.id]);
        assert_eq!(results[0].job_id, second.id);
        assert_eq!(results[1].job_id, first.id);
    }

    #[test]
    fn test_execution_persists_refreshed_timestamp() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);

        let src = source_with_file(&temp_dir, "src");
        let job = create_job(&mut repo, "Docs", &src, &temp_dir.path().join("dst"), BackupType::Full)
            .expect("Failed to create job");
        assert!(repo.get_by_id(job.id).unwrap().last_full_backup.is_none());

        let gateway = LocalFileSystemGateway::new();
        let paths = UncPathAdapter::with_machine_name("HOST");
        let bus = EventBus::new();
        let mut executor = BackupExecutor::new(&gateway, &paths, &bus);

        execute_jobs(&mut repo, &mut executor, &[job.id]);

        let stored = repo.get_by_id(job.id).expect("Job should still exist");
        assert!(stored.last_full_backup.is_some());
    }

    #[test]
    fn test_execute_all_jobs_covers_every_stored_job() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);

        let src = source_with_file(&temp_dir, "src");
        create_job(&mut repo, "First", &src, &temp_dir.path().join("d1"), BackupType::Full)
            .expect("Failed to create job");
        create_job(&mut repo, "Second", &src, &temp_dir.path().join("d2"), BackupType::Differential)
            .expect("Failed to create job");

        let gateway = LocalFileSystemGateway::new();
        let paths = UncPathAdapter::with_machine_name("HOST");
        let bus = EventBus::new();
        let mut executor = BackupExecutor::new(&gateway, &paths, &bus);

        let results = execute_all_jobs(&mut repo, &mut executor);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.result.success()));
    }

    #[test]
    fn test_delete_job_removes_it() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut repo = repository(&temp_dir);
        let job = create_job(&mut repo, "Docs", "/src", "/dst", BackupType::Full)
            .expect("Failed to create job");

        delete_job(&mut repo, job.id).expect("Failed to delete");
        assert!(list_jobs(&repo).is_empty());
    }
}
