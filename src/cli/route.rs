//! CLI route: single route table and run context. Dispatches to the sync engine and presentation.

use crate::actions::{ActionLog, TracingLog};
use crate::cli::help::command_name;
use crate::cli::output::ExitStatus;
use crate::cli::parse::{Commands, RootArgs};
use crate::cli::presentation::{
    format_config, format_pass_outcome, format_pass_result, format_plan, format_schedule_summary,
};
use crate::config::{ConfigLoader, MirrorConfig};
use crate::error::ApiError;
use crate::sync::{CancelToken, PassController, Scheduler};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: loaded configuration, the action log
/// handle and the cancel token shared with the signal handler.
pub struct RunContext {
    config: MirrorConfig,
    log: Arc<dyn ActionLog>,
    cancel: CancelToken,
}

impl RunContext {
    /// Create run context from an optional config path. Uses ConfigLoader only.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_optional(config_path.as_deref())?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: MirrorConfig) -> Self {
        Self {
            config,
            log: Arc::new(TracingLog),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_action_log(mut self, log: Arc<dyn ActionLog>) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Execute a command, writing its output to `out`
    pub fn execute(&self, command: &Commands, out: &mut dyn Write) -> Result<ExitStatus, ApiError> {
        debug!(command = command_name(command), "Executing command");
        match command {
            Commands::Run {
                roots,
                interval,
                iterations,
                stop_on_fatal,
                format,
            } => {
                let mut config = self.effective_config(roots);
                if let Some(interval) = interval {
                    config.sync.interval_secs = *interval;
                }
                if iterations.is_some() {
                    config.sync.iterations = *iterations;
                }
                config.sync.stop_on_fatal |= *stop_on_fatal;
                config.validate()?;

                let scheduler = Scheduler::new(self.controller(&config)?, config.sync.schedule());
                info!(
                    interval_secs = config.sync.interval_secs,
                    iterations = ?config.sync.iterations,
                    "Starting scheduler"
                );

                let mut write_error = None;
                let scheduled = scheduler.run_with(|iteration, outcome| {
                    if write_error.is_some() {
                        return;
                    }
                    let written = format_pass_outcome(iteration, outcome, format)
                        .and_then(|text| writeln!(out, "{}", text).map_err(ApiError::from));
                    if let Err(e) = written {
                        write_error = Some(e);
                    }
                });
                if let Some(e) = write_error {
                    return Err(e);
                }
                let summary = scheduled?;
                writeln!(out, "{}", format_schedule_summary(&summary, format)?)?;

                Ok(if summary.entry_errors > 0 || summary.failed_passes > 0 {
                    ExitStatus::EntryErrors
                } else {
                    ExitStatus::Clean
                })
            }
            Commands::Once { roots, format } => {
                let config = self.effective_config(roots);
                config.validate()?;

                let result = self.controller(&config)?.run_pass()?;
                writeln!(out, "{}", format_pass_result(&result, format)?)?;
                Ok(if result.has_errors() {
                    ExitStatus::EntryErrors
                } else {
                    ExitStatus::Clean
                })
            }
            Commands::Plan { roots, format } => {
                let config = self.effective_config(roots);
                config.validate()?;

                let plan = self.controller(&config)?.plan_only()?;
                writeln!(out, "{}", format_plan(&plan, format)?)?;
                Ok(if plan.errors.is_empty() {
                    ExitStatus::Clean
                } else {
                    ExitStatus::EntryErrors
                })
            }
            Commands::Config => {
                writeln!(out, "{}", format_config(&self.config)?)?;
                Ok(ExitStatus::Clean)
            }
        }
    }

    /// Loaded configuration with command-line root flags applied on top
    fn effective_config(&self, roots: &RootArgs) -> MirrorConfig {
        let mut config = self.config.clone();
        if let Some(source) = &roots.source {
            config.source = Some(source.clone());
        }
        if let Some(replica) = &roots.replica {
            config.replica = Some(replica.clone());
        }
        config.sync.prefilter |= roots.prefilter;
        config.sync.ignore.extend(roots.ignore.iter().cloned());
        config
    }

    fn controller(&self, config: &MirrorConfig) -> Result<PassController, ApiError> {
        let (source, replica) = config.roots()?;
        Ok(PassController::new(source, replica, Arc::clone(&self.log))
            .with_walker_config(config.sync.walker_config())
            .with_plan_options(config.sync.plan_options())
            .with_cancel_token(self.cancel.clone()))
    }
}
