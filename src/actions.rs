//! Action log collaborator
//!
//! The engine reports pass boundaries and every significant action through an
//! explicitly passed `ActionLog` handle instead of a process-wide log target.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

/// Severity of a recorded action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// Sink for engine actions
pub trait ActionLog: Send + Sync {
    fn record(&self, level: LogLevel, message: &str);
}

/// Forwards actions to `tracing` under the `foldsync::actions` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ActionLog for TracingLog {
    fn record(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => info!(target: "foldsync::actions", "{}", message),
            LogLevel::Warning => warn!(target: "foldsync::actions", "{}", message),
            LogLevel::Error => error!(target: "foldsync::actions", "{}", message),
        }
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(LogLevel, String)> {
        self.records.lock().clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.records.lock().iter().filter(|(l, _)| *l == level).count()
    }

    /// Whether any record at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl ActionLog for MemoryLog {
    fn record(&self, level: LogLevel, message: &str) {
        self.records.lock().push((level, message.to_string()));
    }
}
