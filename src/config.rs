//! Configuration System
//!
//! Layered configuration for mirroring runs: built-in defaults, the global
//! config file, an explicit config file, and `FOLDSYNC_` environment
//! variables. CLI flags are applied on top by the binary.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::sync::{PlanOptions, ScheduleConfig};
use crate::tree::path::resolve_root;
use crate::tree::walker::WalkerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Tree to mirror from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// Tree to mirror into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica: Option<PathBuf>,

    /// Pass scheduling and planning settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pass scheduling and planning settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds to sleep between passes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Number of passes; unset runs until interrupted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,

    /// Stop the scheduler at the first fatal pass
    #[serde(default)]
    pub stop_on_fatal: bool,

    /// Skip hashing files whose size matches and whose replica is not older
    #[serde(default)]
    pub prefilter: bool,

    /// Path component names excluded from both trees
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_interval_secs() -> u64 {
    300
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            iterations: None,
            stop_on_fatal: false,
            prefilter: false,
            ignore: Vec::new(),
        }
    }
}

impl SyncConfig {
    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            interval: Duration::from_secs(self.interval_secs),
            iterations: self.iterations,
            stop_on_fatal: self.stop_on_fatal,
        }
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            prefilter: self.prefilter,
        }
    }

    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            ignore_patterns: self.ignore.clone(),
        }
    }
}

impl MirrorConfig {
    /// Source and replica roots, or an error naming the missing one
    pub fn roots(&self) -> Result<(PathBuf, PathBuf), ApiError> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| ApiError::ConfigError("Source root is not configured".to_string()))?;
        let replica = self
            .replica
            .clone()
            .ok_or_else(|| ApiError::ConfigError("Replica root is not configured".to_string()))?;
        Ok((source, replica))
    }

    /// Validate the configuration before a run
    ///
    /// Roots must be set and disjoint: the same directory, or one nested in
    /// the other, would make a pass mirror its own output.
    pub fn validate(&self) -> Result<(), ApiError> {
        let (source, replica) = self.roots()?;
        let source = resolve_root(&source);
        let replica = resolve_root(&replica);

        if source == replica {
            return Err(ApiError::ConfigError(format!(
                "Source and replica are the same directory: {}",
                source.display()
            )));
        }
        if replica.starts_with(&source) || source.starts_with(&replica) {
            return Err(ApiError::ConfigError(format!(
                "Source {} and replica {} must not be nested",
                source.display(),
                replica.display()
            )));
        }

        if self.sync.interval_secs == 0 && self.sync.iterations.is_none() {
            return Err(ApiError::ConfigError(
                "interval_secs must be greater than zero for unbounded runs".to_string(),
            ));
        }

        if self.sync.ignore.iter().any(|p| p.is_empty() || p.contains(['/', '\\'])) {
            return Err(ApiError::ConfigError(
                "ignore entries must be single path component names".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ApiError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
