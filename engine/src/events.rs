//! Synchronous in-process event channel.
//!
//! The orchestrator publishes two kinds of events — transfer-completed and
//! state-changed — and this registry dispatches each one synchronously, on
//! the caller's thread, to every handler subscribed for that exact kind, in
//! subscription order. The channel exists solely to decouple the orchestrator
//! from the transfer-logging and state-persistence consumers; it carries no
//! queuing, retry, or further ordering guarantees.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::progress::StateSnapshot;

/// One record per file copy attempt, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferLog {
    /// When the attempt finished
    pub timestamp: DateTime<Local>,

    /// Name of the job the file belongs to
    pub backup_job_name: String,

    /// UNC-formatted source path
    pub source_file_path: String,

    /// UNC-formatted target path
    pub target_file_path: String,

    /// Size of the file in bytes
    pub file_size: u64,

    /// Elapsed copy time in milliseconds; -1 signals a failed copy
    pub transfer_time_ms: i64,
}

/// Discriminant tag used to key handler registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TransferCompleted,
    StateChanged,
}

/// An event published by the orchestrator during a job execution.
#[derive(Debug, Clone)]
pub enum BackupEvent {
    TransferCompleted(TransferLog),
    StateChanged(StateSnapshot),
}

impl BackupEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BackupEvent::TransferCompleted(_) => EventKind::TransferCompleted,
            BackupEvent::StateChanged(_) => EventKind::StateChanged,
        }
    }
}

/// Receives events of the kind it was subscribed for.
///
/// Handlers are invoked synchronously during publication; implementations
/// that mutate state use interior mutability.
pub trait EventHandler {
    fn handle(&self, event: &BackupEvent);
}

/// Registry mapping an event kind to its ordered list of handlers.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Box<dyn EventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for one event kind. Multiple handlers per kind are
    /// allowed and run in registration order.
    pub fn subscribe(&mut self, kind: EventKind, handler: Box<dyn EventHandler>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Invoke every handler registered for the event's kind, synchronously,
    /// before returning. A kind with no subscribers is a silent no-op.
    pub fn publish(&self, event: &BackupEvent) {
        let Some(handlers) = self.handlers.get(&event.kind()) else {
            return;
        };
        for handler in handlers {
            handler.handle(event);
        }
    }
}
