//! CLI domain: parse, route, help, output, and presentation only.
//! No engine logic; the route table dispatches to the sync engine.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::{map_error, ExitStatus};
pub use parse::{Cli, Commands, RootArgs};
pub use presentation::{
    format_config, format_pass_outcome, format_pass_result, format_plan, format_schedule_summary,
};
pub use route::RunContext;
