//! Presentation: pass, plan, schedule and config formatters (text or json).

use crate::config::MirrorConfig;
use crate::error::{ApiError, SyncError};
use crate::sync::{CopyKind, PassResult, ScheduleSummary, SyncPlan};
use crate::tree::walker::EntryKind;
use comfy_table::Table;
use owo_colors::{OwoColorize, Stream};

pub fn format_pass_result(result: &PassResult, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(result)?);
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Action", "Count"]);
    table.add_row(vec!["Directories created".to_string(), result.dirs_created.to_string()]);
    table.add_row(vec!["Files created".to_string(), result.files_created.to_string()]);
    table.add_row(vec!["Files updated".to_string(), result.files_updated.to_string()]);
    table.add_row(vec!["Files deleted".to_string(), result.files_deleted.to_string()]);
    table.add_row(vec!["Directories deleted".to_string(), result.dirs_deleted.to_string()]);

    // Colors only when stdout is a terminal and not overridden off
    let status = if result.cancelled {
        warning("Pass cancelled")
    } else if result.has_errors() {
        warning(&format!("Pass completed with {} errors", result.errors.len()))
    } else if result.total_changes() == 0 {
        success("Replica already up to date")
    } else {
        success("Pass completed")
    };

    let mut s = format!("{}\n{}", status, table);
    if result.has_errors() {
        s.push_str(&format!("\n\nErrors ({}):", result.errors.len()));
        for e in &result.errors {
            s.push_str(&format!("\n  - {}", e));
        }
    }
    Ok(s)
}

/// Format one scheduled pass, fatal or not
pub fn format_pass_outcome(
    iteration: u64,
    outcome: &Result<PassResult, SyncError>,
    format: &str,
) -> Result<String, ApiError> {
    match (outcome, format) {
        (Ok(result), "json") => Ok(serde_json::to_string(&serde_json::json!({
            "pass": iteration,
            "result": result,
        }))?),
        (Err(error), "json") => Ok(serde_json::to_string(&serde_json::json!({
            "pass": iteration,
            "fatal": { "category": error.category(), "message": error.to_string() },
        }))?),
        (Ok(result), _) => Ok(format!(
            "Pass {}\n{}",
            iteration,
            format_pass_result(result, format)?
        )),
        (Err(error), _) => Ok(format!(
            "Pass {}\n{} {}",
            iteration,
            "Pass failed:".if_supports_color(Stream::Stdout, |t| t.red()),
            error
        )),
    }
}

pub fn format_plan(plan: &SyncPlan, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(plan)?);
    }
    if plan.is_empty() && plan.errors.is_empty() {
        return Ok("Replica already up to date; nothing to do.".to_string());
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Action", "Path"]);
    for dir in &plan.create_dirs {
        table.add_row(vec!["create dir", dir.as_str()]);
    }
    for copy in &plan.copy_files {
        let action = match copy.kind {
            CopyKind::Create => "create file",
            CopyKind::Update => "update file",
        };
        table.add_row(vec![action, copy.relative_path.as_str()]);
    }
    for file in &plan.delete_files {
        table.add_row(vec!["delete file", file.as_str()]);
    }
    for entry in &plan.delete_unmapped {
        let action = match entry.kind {
            EntryKind::File => "delete file",
            EntryKind::Directory => "delete dir",
        };
        table.add_row(vec![action, entry.display_path.as_str()]);
    }
    for dir in &plan.delete_dirs {
        table.add_row(vec!["delete dir", dir.as_str()]);
    }

    let mut s = format!("Planned actions ({}):\n{}", plan.action_count(), table);
    if !plan.errors.is_empty() {
        s.push_str(&format!("\n\nUnplannable entries ({}):", plan.errors.len()));
        for e in &plan.errors {
            s.push_str(&format!("\n  - {}", e));
        }
    }
    Ok(s)
}

pub fn format_schedule_summary(summary: &ScheduleSummary, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return Ok(serde_json::to_string(summary)?);
    }
    let mut s = format!(
        "Scheduler finished: {} passes, {} failed, {} entry errors",
        summary.passes, summary.failed_passes, summary.entry_errors
    );
    if summary.cancelled {
        s.push_str(" (cancelled)");
    }
    Ok(s)
}

fn warning(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.yellow()).to_string()
}

fn success(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.green()).to_string()
}

pub fn format_config(config: &MirrorConfig) -> Result<String, ApiError> {
    config.to_toml()
}
