//! Error types for the foldsync mirroring engine.

use crate::tree::hasher::Digest;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::path::PathBuf;
use thiserror::Error;

/// Engine errors raised while scanning, planning, or applying a pass
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Source root contains nothing to mirror: {}", .0.display())]
    EmptySource(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Integrity check failed for {}: expected {expected}, got {actual}", .path.display())]
    Integrity {
        path: PathBuf,
        expected: Digest,
        actual: Digest,
    },

    #[error("Failed to delete {}: {source}", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Whether this error aborts the whole pass rather than a single entry
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::RootNotFound(_) | SyncError::NotADirectory(_) | SyncError::EmptySource(_)
        )
    }

    /// Stable category name used in structured output
    pub fn category(&self) -> &'static str {
        match self {
            SyncError::RootNotFound(_) => "root_not_found",
            SyncError::NotADirectory(_) => "not_a_directory",
            SyncError::EmptySource(_) => "empty_source",
            SyncError::Read { .. } => "read",
            SyncError::Write { .. } => "write",
            SyncError::Integrity { .. } => "integrity",
            SyncError::Delete { .. } => "delete",
        }
    }
}

/// A failure isolated to one entry of a pass
#[derive(Debug)]
pub struct EntryError {
    pub relative_path: String,
    pub error: SyncError,
}

impl EntryError {
    pub fn new(relative_path: impl Into<String>, error: SyncError) -> Self {
        Self {
            relative_path: relative_path.into(),
            error,
        }
    }
}

impl std::fmt::Display for EntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.relative_path, self.error)
    }
}

impl Serialize for EntryError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EntryError", 3)?;
        state.serialize_field("relative_path", &self.relative_path)?;
        state.serialize_field("category", self.error.category())?;
        state.serialize_field("message", &self.error.to_string())?;
        state.end()
    }
}

/// Outer-surface errors (configuration, CLI, output)
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Output(err.to_string())
    }
}

impl From<toml::ser::Error> for ApiError {
    fn from(err: toml::ser::Error) -> Self {
        ApiError::Output(err.to_string())
    }
}
