//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name string for log records (e.g. "run", "plan").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run { .. } => "run",
        Commands::Once { .. } => "once",
        Commands::Plan { .. } => "plan",
        Commands::Config => "config",
    }
}
