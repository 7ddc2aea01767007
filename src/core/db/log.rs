/// Query Logging Module
///
/// Every statement the database layer runs, and every failure it sees, is
/// reported to a [`QueryLog`] as a `(tag, payload)` pair. The layer decides
/// what gets recorded and when; the log decides what to do with it.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Tag recorded before a read query runs
pub const TAG_QUERY: &str = "DB::QUERY";
/// Tag recorded when a read query (or ping) fails
pub const TAG_QUERY_EXCEPTION: &str = "DB::QUERY::EXCEPTION";
/// Tag recorded before a mutating statement runs
pub const TAG_EXEC: &str = "DB::EXEC";
/// Tag recorded when a mutating statement fails
pub const TAG_EXEC_EXCEPTION: &str = "DB::EXEC::EXCEPTION";
/// Tag recorded before a ping
pub const TAG_PING: &str = "DB::PING";

/// Receiver for query log records
pub trait QueryLog: Send + Sync {
    /// Records one event. `payload` is the SQL text or the error message.
    fn record(&self, tag: &str, payload: Option<&str>);
}

/// Forwards records to `tracing`; failures are emitted at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl QueryLog for TracingLog {
    fn record(&self, tag: &str, payload: Option<&str>) {
        let payload = payload.unwrap_or("");
        if tag.ends_with("::EXCEPTION") {
            warn!(target: "clitools::db", tag, "{}", payload);
        } else {
            debug!(target: "clitools::db", tag, "{}", payload);
        }
    }
}

/// A single captured log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub tag: String,
    pub payload: Option<String>,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Some(payload) => write!(f, "{}: {}", self.tag, payload),
            None => write!(f, "{}", self.tag),
        }
    }
}

/// Keeps records in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Records carrying the given tag
    pub fn with_tag(&self, tag: &str) -> Vec<LogRecord> {
        self.records().into_iter().filter(|r| r.tag == tag).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // Pushes and clears never leave the vector half-written, so poison is ignored
    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueryLog for MemoryLog {
    fn record(&self, tag: &str, payload: Option<&str>) {
        self.lock().push(LogRecord {
            tag: tag.to_string(),
            payload: payload.map(String::from),
        });
    }
}
