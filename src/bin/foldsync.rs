//! foldsync CLI Binary
//!
//! Command-line interface for periodic one-way folder mirroring.

use clap::Parser;
use foldsync::cli::{map_error, Cli, RunContext};
use foldsync::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let context = match RunContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    // Build logging config from the loaded config file and CLI args
    let logging_config = build_logging_config(&cli, &context.config().logging);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if !logging_config.color {
        owo_colors::set_override(false);
    }

    info!("foldsync starting");

    let cancel = context.cancel_token();
    let command = cli.command.clone();
    let mut worker = tokio::task::spawn_blocking(move || {
        // Unlocked handle: stdout may also be the log destination
        let mut out = std::io::stdout();
        context.execute(&command, &mut out)
    });

    let joined = tokio::select! {
        joined = &mut worker => joined,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for interrupt: {}", e);
            } else {
                warn!("Interrupt received, finishing current action");
            }
            cancel.cancel();
            worker.await
        }
    };

    match joined {
        Ok(Ok(status)) => {
            info!(exit_code = status.code(), "Command completed");
            process::exit(status.code());
        }
        Ok(Err(e)) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
        Err(e) => {
            error!("Command worker panicked: {}", e);
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Build logging configuration from the config file section and CLI args
fn build_logging_config(cli: &Cli, base: &LoggingConfig) -> LoggingConfig {
    let mut config = base.clone();

    if cli.verbose {
        config.level = "debug".to_string();
    }

    // CLI arguments have the highest priority
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
        config.output = "file".to_string();
    }

    config
}
