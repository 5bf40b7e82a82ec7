//! Per-pass outcome: action counts and isolated entry errors

use crate::error::{EntryError, SyncError};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PassResult {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dirs_created: usize,
    pub files_created: usize,
    pub files_updated: usize,
    pub files_deleted: usize,
    pub dirs_deleted: usize,
    pub errors: Vec<EntryError>,
    /// The pass stopped early because its cancel token fired
    pub cancelled: bool,
}

impl PassResult {
    pub fn begin() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dirs_created: 0,
            files_created: 0,
            files_updated: 0,
            files_deleted: 0,
            dirs_deleted: 0,
            errors: Vec::new(),
            cancelled: false,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn record_error(&mut self, relative_path: impl Into<String>, error: SyncError) {
        self.errors.push(EntryError::new(relative_path, error));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.dirs_created
            + self.files_created
            + self.files_updated
            + self.files_deleted
            + self.dirs_deleted
    }

    /// One-line summary used for log records
    pub fn summary(&self) -> String {
        format!(
            "{} dirs created, {} files created, {} files updated, {} files deleted, {} dirs deleted, {} errors",
            self.dirs_created,
            self.files_created,
            self.files_updated,
            self.files_deleted,
            self.dirs_deleted,
            self.errors.len()
        )
    }
}
