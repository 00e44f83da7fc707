//! # Backup Engine - Job-Based Backup Library
//!
//! A headless engine for defining and executing directory backup jobs.
//! Designed as the foundation for multiple front-ends (CLI, automation).
//!
//! ## Overview
//!
//! The engine manages named backup jobs (a source→target directory mapping
//! plus a strategy) and executes them by copying files. It features:
//! - Full and differential (modified-since-last-full) selection strategies
//! - Per-file error isolation: one failed copy never aborts the batch
//! - Live progress snapshots via a stateful tracker
//! - A synchronous event channel decoupling execution from transfer logging
//!   and state persistence
//! - JSON-file persistence for job definitions and progress state, with
//!   daily-rotated transfer logs
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{
//!     BackupExecutor, BackupType, EventBus, LocalFileSystemGateway, UncPathAdapter,
//!     repository::FileJobRepository,
//!     service::{create_job, execute_jobs},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut repository = FileJobRepository::open("backup_jobs.json")?;
//! let job = create_job(&mut repository, "Docs", "/data/docs", "/backup/docs", BackupType::Full)?;
//!
//! let gateway = LocalFileSystemGateway::new();
//! let paths = UncPathAdapter::new();
//! let bus = EventBus::new();
//! let mut executor = BackupExecutor::new(&gateway, &paths, &bus);
//!
//! for entry in execute_jobs(&mut repository, &mut executor, &[job.id]) {
//!     println!("job {}: success = {}", entry.job_id, entry.result.success());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (BackupJob, FileDescriptor, BackupResult)
//! - **error**: Error types and handling
//! - **strategy**: Full and differential file selection
//! - **progress**: Progress tracker and state snapshots
//! - **events**: Synchronous in-process event channel
//! - **handlers**: Reference event consumers (transfer log, state manager)
//! - **gateway**: File-system operations behind a testable trait
//! - **path**: UNC path formatting for log records
//! - **repository**: Job persistence
//! - **state**: State snapshot persistence
//! - **translog**: Daily-rotated transfer log sinks
//! - **config**: Application configuration
//! - **executor**: Execution orchestration
//! - **service**: Job management and batch execution

pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod gateway;
pub mod handlers;
pub mod model;
pub mod path;
pub mod progress;
pub mod repository;
pub mod service;
pub mod state;
pub mod strategy;
pub mod translog;

// Re-export main types and functions
pub use config::AppConfig;
pub use error::EngineError;
pub use events::{BackupEvent, EventBus, EventHandler, EventKind, TransferLog};
pub use executor::BackupExecutor;
pub use gateway::{FileSystemGateway, LocalFileSystemGateway};
pub use handlers::{StateChangedHandler, TransferCompletedHandler};
pub use model::{BackupJob, BackupResult, BackupType, FileDescriptor, JobState, MAX_JOBS};
pub use path::{PathAdapter, UncPathAdapter};
pub use progress::{ProgressTracker, StateSnapshot};
pub use repository::{FileJobRepository, JobRepository};
pub use service::JobExecutionResult;
pub use state::{JsonStateManager, StateManager};
pub use strategy::BackupStrategy;
pub use translog::{LogFormat, TransferLogger};
