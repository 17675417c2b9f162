//! Append-only activity log.
//!
//! `append` is the only mutator and is serialized behind a lock so
//! concurrent dispatch completions cannot interleave entries. Storage
//! order is insertion order; presentation order is newest-first.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::monitor::SafetyState;

/// One immutable log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp_ms: u64,
    pub state: SafetyState,
    pub message: String,
}

impl LogEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp_ms as i64).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Shared append-only log. Entries are never edited after append.
pub struct ActivityLog {
    clock: Arc<dyn Clock>,
    entries: Mutex<Vec<LogEntry>>,
}

impl ActivityLog {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn append(&self, state: SafetyState, message: impl Into<String>) {
        let entry = LogEntry {
            id: Uuid::new_v4(),
            timestamp_ms: self.clock.now_ms(),
            state,
            message: message.into(),
        };
        self.lock().push(entry);
    }

    /// Newest-first copy for presentation.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        let mut entries = self.lock().clone();
        entries.reverse();
        entries
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|err| err.into_inner())
    }
}
