//! Fixed-interval scheduler driving sequential passes

use crate::actions::LogLevel;
use crate::error::SyncError;
use crate::sync::pass::PassController;
use crate::sync::result::PassResult;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Sleep between the end of one pass and the start of the next
    pub interval: Duration,
    /// Number of passes to run; `None` runs until cancelled
    pub iterations: Option<u64>,
    /// Stop at the first fatal pass instead of waiting for the next iteration
    pub stop_on_fatal: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            iterations: None,
            stop_on_fatal: false,
        }
    }
}

/// Totals across every pass a scheduler ran
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub passes: u64,
    pub failed_passes: u64,
    pub entry_errors: usize,
    pub cancelled: bool,
}

/// Runs passes one after another; passes never overlap
pub struct Scheduler {
    controller: PassController,
    config: ScheduleConfig,
}

impl Scheduler {
    pub fn new(controller: PassController, config: ScheduleConfig) -> Self {
        Self { controller, config }
    }

    pub fn controller(&self) -> &PassController {
        &self.controller
    }

    pub fn run(&self) -> Result<ScheduleSummary, SyncError> {
        self.run_with(|_, _| {})
    }

    /// Run the schedule, handing every pass outcome to `on_pass`
    ///
    /// Returns the fatal error of the stopping pass when `stop_on_fatal` is set.
    pub fn run_with<F>(&self, mut on_pass: F) -> Result<ScheduleSummary, SyncError>
    where
        F: FnMut(u64, &Result<PassResult, SyncError>),
    {
        let log = self.controller.log();
        let cancel = self.controller.cancel_token();
        let mut summary = ScheduleSummary::default();

        while self
            .config
            .iterations
            .map_or(true, |limit| summary.passes < limit)
        {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let iteration = summary.passes + 1;
            match self.config.iterations {
                Some(limit) => log.record(
                    LogLevel::Info,
                    &format!("Starting pass {} of {}", iteration, limit),
                ),
                None => log.record(LogLevel::Info, &format!("Starting pass {}", iteration)),
            }

            let outcome = self.controller.run_pass();
            summary.passes = iteration;
            match &outcome {
                Ok(result) => {
                    summary.entry_errors += result.errors.len();
                    summary.cancelled |= result.cancelled;
                }
                Err(_) => summary.failed_passes += 1,
            }
            on_pass(iteration, &outcome);

            if let Err(error) = outcome {
                if self.config.stop_on_fatal {
                    log.record(
                        LogLevel::Error,
                        &format!("Stopping after fatal pass {}: {}", iteration, error),
                    );
                    return Err(error);
                }
                log.record(
                    LogLevel::Warning,
                    &format!("Pass {} failed, continuing with next iteration", iteration),
                );
            }

            if summary.cancelled {
                break;
            }
            let last = self
                .config
                .iterations
                .map_or(false, |limit| summary.passes >= limit);
            if last {
                break;
            }

            debug!(interval = ?self.config.interval, "Sleeping until next pass");
            if cancel.wait_timeout(self.config.interval) {
                summary.cancelled = true;
                break;
            }
        }

        if summary.cancelled {
            log.record(LogLevel::Warning, "Scheduler cancelled");
        }
        log.record(
            LogLevel::Info,
            &format!(
                "Scheduler finished: {} passes, {} failed, {} entry errors",
                summary.passes, summary.failed_passes, summary.entry_errors
            ),
        );
        Ok(summary)
    }
}
