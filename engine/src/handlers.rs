//! Reference event consumers.
//!
//! These handlers bridge the event channel to the persistence collaborators:
//! one appends a transfer-log record per completed copy attempt, the other
//! keeps the latest state snapshot per job name. Both are registered once at
//! process start. Consumer failures are logged and swallowed; the channel
//! has no error path back to the publisher.

use std::sync::Mutex;
use tracing::warn;

use crate::events::{BackupEvent, EventHandler};
use crate::state::StateManager;
use crate::translog::TransferLogger;

/// Forwards transfer-completed events to a [`TransferLogger`].
pub struct TransferCompletedHandler {
    logger: Box<dyn TransferLogger>,
}

impl TransferCompletedHandler {
    pub fn new(logger: Box<dyn TransferLogger>) -> Self {
        TransferCompletedHandler { logger }
    }
}

impl EventHandler for TransferCompletedHandler {
    fn handle(&self, event: &BackupEvent) {
        if let BackupEvent::TransferCompleted(log) = event {
            if let Err(err) = self.logger.log_transfer(log) {
                warn!(job = %log.backup_job_name, %err, "failed to write transfer log");
            }
        }
    }
}

/// Forwards state-changed snapshots to a [`StateManager`].
pub struct StateChangedHandler {
    manager: Mutex<Box<dyn StateManager>>,
}

impl StateChangedHandler {
    pub fn new(manager: Box<dyn StateManager>) -> Self {
        StateChangedHandler {
            manager: Mutex::new(manager),
        }
    }
}

impl EventHandler for StateChangedHandler {
    fn handle(&self, event: &BackupEvent) {
        if let BackupEvent::StateChanged(snapshot) = event {
            let Ok(mut manager) = self.manager.lock() else {
                warn!(job = %snapshot.name, "state manager lock poisoned; snapshot dropped");
                return;
            };
            if let Err(err) = manager.update_state(snapshot.clone()) {
                warn!(job = %snapshot.name, %err, "failed to persist state snapshot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, EventKind, TransferLog};
    use crate::model::JobState;
    use crate::progress::StateSnapshot;
    use crate::state::JsonStateManager;
    use crate::translog::JsonTransferLogger;
    use chrono::Local;

    #[test]
    fn test_transfer_handler_writes_log_records() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut bus = EventBus::new();
        bus.subscribe(
            EventKind::TransferCompleted,
            Box::new(TransferCompletedHandler::new(Box::new(
                JsonTransferLogger::new(temp_dir.path()),
            ))),
        );

        bus.publish(&BackupEvent::TransferCompleted(TransferLog {
            timestamp: Local::now(),
            backup_job_name: "Docs".to_string(),
            source_file_path: "\\\\HOST\\src\\a.txt".to_string(),
            target_file_path: "\\\\HOST\\dst\\a.txt".to_string(),
            file_size: 100,
            transfer_time_ms: 2,
        }));

        let daily = temp_dir
            .path()
            .join(format!("{}.json", Local::now().format("%Y-%m-%d")));
        assert!(daily.exists());
    }

    #[test]
    fn test_state_handler_upserts_snapshots() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state_file = temp_dir.path().join("state.json");

        let manager = JsonStateManager::open(&state_file).expect("Failed to open state manager");
        let mut bus = EventBus::new();
        bus.subscribe(
            EventKind::StateChanged,
            Box::new(StateChangedHandler::new(Box::new(manager))),
        );

        let snapshot = StateSnapshot {
            name: "Docs".to_string(),
            timestamp: Local::now(),
            state: JobState::End,
            total_files: 1,
            total_size: 100,
            progress: 100,
            files_remaining: 0,
            size_remaining: 0,
            current_source_file: String::new(),
            current_target_file: String::new(),
        };
        bus.publish(&BackupEvent::StateChanged(snapshot.clone()));
        bus.publish(&BackupEvent::StateChanged(snapshot));

        let reopened = JsonStateManager::open(&state_file).expect("Failed to reopen");
        assert_eq!(reopened.get_all_states().len(), 1);
    }
}
