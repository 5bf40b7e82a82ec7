//! Pass controller: scan source, scan replica, plan, execute

use crate::actions::{ActionLog, LogLevel};
use crate::error::SyncError;
use crate::sync::cancel::CancelToken;
use crate::sync::executor::Executor;
use crate::sync::plan::{plan, PlanOptions, SyncPlan};
use crate::sync::result::PassResult;
use crate::tree::walker::{Snapshot, Walker, WalkerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runs one full synchronization cycle between a source and a replica root
///
/// Assumes it is the only writer to the replica tree.
pub struct PassController {
    source_root: PathBuf,
    replica_root: PathBuf,
    walker_config: WalkerConfig,
    options: PlanOptions,
    log: Arc<dyn ActionLog>,
    cancel: CancelToken,
}

impl PassController {
    pub fn new(source_root: PathBuf, replica_root: PathBuf, log: Arc<dyn ActionLog>) -> Self {
        Self {
            source_root,
            replica_root,
            walker_config: WalkerConfig::default(),
            options: PlanOptions::default(),
            log,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_walker_config(mut self, walker_config: WalkerConfig) -> Self {
        self.walker_config = walker_config;
        self
    }

    pub fn with_plan_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn replica_root(&self) -> &Path {
        &self.replica_root
    }

    pub fn log(&self) -> &Arc<dyn ActionLog> {
        &self.log
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Compute the plan for the current state of both trees without applying it
    ///
    /// Entries that could not be read during either scan are reported
    /// ahead of the planner's own errors.
    pub fn plan_only(&self) -> Result<SyncPlan, SyncError> {
        let (mut source, mut replica) = self.scan_both()?;
        let mut sync_plan = plan(&source, &replica, self.options);

        let mut errors = source.take_errors();
        errors.extend(replica.take_errors());
        errors.append(&mut sync_plan.errors);
        sync_plan.errors = errors;
        Ok(sync_plan)
    }

    /// Run one pass
    ///
    /// Fatal when the source root is missing, not a directory, or empty.
    /// A missing replica root is scanned as empty and created by the executor.
    pub fn run_pass(&self) -> Result<PassResult, SyncError> {
        self.log.record(
            LogLevel::Info,
            &format!(
                "Pass started: {} -> {}",
                self.source_root.display(),
                self.replica_root.display()
            ),
        );

        let sync_plan = match self.plan_only() {
            Ok(sync_plan) => sync_plan,
            Err(error) => {
                self.log
                    .record(LogLevel::Error, &format!("Pass aborted: {}", error));
                return Err(error);
            }
        };

        let result = Executor::new(Arc::clone(&self.log))
            .with_cancel_token(self.cancel.clone())
            .execute(sync_plan, &self.source_root, &self.replica_root);

        let level = if result.has_errors() || result.cancelled {
            LogLevel::Warning
        } else {
            LogLevel::Info
        };
        self.log
            .record(level, &format!("Pass finished: {}", result.summary()));
        Ok(result)
    }

    fn scan_both(&self) -> Result<(Snapshot, Snapshot), SyncError> {
        let source =
            Walker::with_config(self.source_root.clone(), self.walker_config.clone()).scan()?;
        if source.is_empty() {
            return Err(SyncError::EmptySource(self.source_root.clone()));
        }

        let replica =
            match Walker::with_config(self.replica_root.clone(), self.walker_config.clone()).scan() {
                Ok(snapshot) => snapshot,
                Err(SyncError::RootNotFound(_)) => Snapshot::empty(self.replica_root.clone()),
                Err(error) => return Err(error),
            };

        Ok((source, replica))
    }
}
