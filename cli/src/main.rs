//! backup - Command-line front-end for the backup engine.
//!
//! Manages named backup jobs and executes them, printing one line per batch
//! entry. Transfer logging and state persistence are wired to the engine's
//! event channel at startup.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use engine::{
    config::AppConfig,
    events::{EventBus, EventKind},
    gateway::LocalFileSystemGateway,
    handlers::{StateChangedHandler, TransferCompletedHandler},
    model::BackupType,
    path::UncPathAdapter,
    repository::FileJobRepository,
    service::{self, JobExecutionResult},
    state::{JsonStateManager, StateManager},
    translog::transfer_logger_for,
    BackupExecutor,
};

/// backup - manage and execute directory backup jobs
#[derive(Parser, Debug)]
#[command(name = "backup")]
#[command(version = "0.1.0")]
#[command(about = "Manage and execute directory backup jobs")]
struct Args {
    /// Path to the application configuration file
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new backup job
    Create {
        /// Job name
        name: String,

        /// Source directory
        #[arg(long, value_name = "PATH")]
        source: PathBuf,

        /// Target directory
        #[arg(long, value_name = "PATH")]
        target: PathBuf,

        /// Backup type: full or differential
        #[arg(long, value_name = "TYPE", default_value = "full")]
        backup_type: String,
    },

    /// List all configured jobs
    List,

    /// Replace a job's name, paths, and type
    Modify {
        /// Id of the job to modify
        id: i64,

        /// New job name
        name: String,

        /// New source directory
        #[arg(long, value_name = "PATH")]
        source: PathBuf,

        /// New target directory
        #[arg(long, value_name = "PATH")]
        target: PathBuf,

        /// Backup type: full or differential
        #[arg(long, value_name = "TYPE", default_value = "full")]
        backup_type: String,
    },

    /// Delete a job by id
    Delete {
        /// Id of the job to delete
        id: i64,
    },

    /// Execute jobs by id, or every job with --all
    Run {
        /// Ids of the jobs to execute
        ids: Vec<i64>,

        /// Execute every job on file
        #[arg(long)]
        all: bool,
    },

    /// Show the latest recorded state snapshot per job
    Status,
}

fn main() {
    init_tracing();

    let args = Args::parse();
    let exit_code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Main CLI logic - separated for testability.
fn run(args: &Args) -> Result<i32> {
    let config = AppConfig::load(&args.config).context("Failed to load configuration")?;
    tracing::debug!(config = %args.config.display(), "configuration loaded");

    let mut repository =
        FileJobRepository::open(&config.jobs_file).context("Failed to open job repository")?;

    match &args.command {
        Command::Create {
            name,
            source,
            target,
            backup_type,
        } => {
            let backup_type = parse_backup_type(backup_type)?;
            let job = service::create_job(&mut repository, name, source, target, backup_type)?;
            println!("Created job {} ({})", job.id, job.name);
            Ok(0)
        }

        Command::List => {
            let jobs = service::list_jobs(&repository);
            if jobs.is_empty() {
                println!("No jobs configured.");
                return Ok(0);
            }
            for job in jobs {
                println!(
                    "[{}] {} | {} -> {} | {} | last full: {}",
                    job.id,
                    job.name,
                    job.source_path.display(),
                    job.target_path.display(),
                    job.backup_type,
                    job.last_full_backup
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "never".to_string()),
                );
            }
            Ok(0)
        }

        Command::Modify {
            id,
            name,
            source,
            target,
            backup_type,
        } => {
            let backup_type = parse_backup_type(backup_type)?;
            let job = service::modify_job(&mut repository, *id, name, source, target, backup_type)?;
            println!("Modified job {} ({})", job.id, job.name);
            Ok(0)
        }

        Command::Delete { id } => {
            service::delete_job(&mut repository, *id)?;
            println!("Deleted job {id}");
            Ok(0)
        }

        Command::Run { ids, all } => run_jobs(&config, &mut repository, ids, *all),

        Command::Status => {
            let manager =
                JsonStateManager::open(&config.state_file).context("Failed to open state file")?;
            let states = manager.get_all_states();
            if states.is_empty() {
                println!("No state recorded yet.");
                return Ok(0);
            }
            for snapshot in states {
                println!(
                    "{} | {:?} | {}% | {}/{} files remaining",
                    snapshot.name,
                    snapshot.state,
                    snapshot.progress,
                    snapshot.files_remaining,
                    snapshot.total_files,
                );
            }
            Ok(0)
        }
    }
}

/// Execute the requested batch and report one line per entry.
fn run_jobs(
    config: &AppConfig,
    repository: &mut FileJobRepository,
    ids: &[i64],
    all: bool,
) -> Result<i32> {
    if !all && ids.is_empty() {
        bail!("No job ids given; pass one or more ids, or --all");
    }

    let state_manager =
        JsonStateManager::open(&config.state_file).context("Failed to open state file")?;
    let transfer_logger = transfer_logger_for(config.log_format, &config.log_directory);

    // Consumers are registered once, before any execution starts.
    let mut bus = EventBus::new();
    bus.subscribe(
        EventKind::TransferCompleted,
        Box::new(TransferCompletedHandler::new(transfer_logger)),
    );
    bus.subscribe(
        EventKind::StateChanged,
        Box::new(StateChangedHandler::new(Box::new(state_manager))),
    );

    let gateway = LocalFileSystemGateway::new();
    let paths = UncPathAdapter::new();
    let mut executor = BackupExecutor::new(&gateway, &paths, &bus);

    let results = if all {
        service::execute_all_jobs(&mut *repository, &mut executor)
    } else {
        service::execute_jobs(&mut *repository, &mut executor, ids)
    };

    Ok(report(&results))
}

/// Print the batch outcome; returns the process exit code.
fn report(results: &[JobExecutionResult]) -> i32 {
    let mut failures = 0;
    for entry in results {
        let result = &entry.result;
        if result.success() {
            println!(
                "Job {}: OK - {} files, {} in {:?}",
                entry.job_id,
                result.files_processed(),
                format_bytes(result.bytes_transferred()),
                result.duration(),
            );
        } else {
            failures += 1;
            println!("Job {}: FAILED - {}", entry.job_id, result.errors().join("; "));
        }
    }

    if failures > 0 {
        1
    } else {
        0
    }
}

fn parse_backup_type(value: &str) -> Result<BackupType> {
    match value.to_lowercase().as_str() {
        "full" => Ok(BackupType::Full),
        "differential" => Ok(BackupType::Differential),
        _ => bail!("Invalid backup type '{value}'. Must be 'full' or 'differential'"),
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}
