//! CLI output: error mapping and exit status surface.

use crate::error::ApiError;

/// Outcome of a command that did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every action succeeded
    Clean,
    /// At least one pass recorded entry-level errors
    EntryErrors,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::EntryErrors => 2,
        }
    }
}

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    format!("error: {}", e)
}
