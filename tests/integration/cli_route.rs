//! CLI route tests: commands dispatched through RunContext with captured output

use crate::integration::test_utils::{assert_mirrored, write_tree, Roots};
use clap::Parser;
use foldsync::actions::MemoryLog;
use foldsync::cli::{Cli, ExitStatus, RunContext};
use foldsync::config::MirrorConfig;
use foldsync::error::ApiError;
use std::sync::Arc;

fn run(context: &RunContext, args: &[&str]) -> (Result<ExitStatus, ApiError>, String) {
    let mut argv = vec!["foldsync"];
    argv.extend_from_slice(args);
    let cli = Cli::parse_from(argv);
    let mut out = Vec::new();
    let status = context.execute(&cli.command, &mut out);
    (status, String::from_utf8(out).unwrap())
}

fn context() -> RunContext {
    RunContext::from_config(MirrorConfig::default()).with_action_log(Arc::new(MemoryLog::new()))
}

#[test]
fn test_once_mirrors_and_reports_json() {
    let roots = Roots::new();
    write_tree(&roots.source, &[("a.txt", Some("hi")), ("sub", None)]);

    let (status, output) = run(
        &context(),
        &[
            "once",
            "--source",
            roots.source.to_str().unwrap(),
            "--replica",
            roots.replica.to_str().unwrap(),
            "--format",
            "json",
        ],
    );

    assert_eq!(status.unwrap(), ExitStatus::Clean);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["files_created"], 1);
    assert_eq!(value["dirs_created"], 1);
    assert_mirrored(&roots.source, &roots.replica);
}

#[test]
fn test_plan_does_not_touch_replica() {
    let roots = Roots::new();
    write_tree(&roots.source, &[("a.txt", Some("hi"))]);
    write_tree(&roots.replica, &[("old.txt", Some("x"))]);

    let (status, output) = run(
        &context(),
        &[
            "plan",
            "--source",
            roots.source.to_str().unwrap(),
            "--replica",
            roots.replica.to_str().unwrap(),
        ],
    );

    assert_eq!(status.unwrap(), ExitStatus::Clean);
    assert!(output.contains("create file"));
    assert!(output.contains("delete file"));
    assert!(roots.replica.join("old.txt").exists());
    assert!(!roots.replica.join("a.txt").exists());
}

#[test]
fn test_run_with_bounded_iterations() {
    let roots = Roots::new();
    write_tree(&roots.source, &[("a.txt", Some("hi"))]);

    let (status, output) = run(
        &context(),
        &[
            "run",
            "--source",
            roots.source.to_str().unwrap(),
            "--replica",
            roots.replica.to_str().unwrap(),
            "--interval",
            "0",
            "--iterations",
            "2",
        ],
    );

    assert_eq!(status.unwrap(), ExitStatus::Clean);
    assert!(output.contains("Pass 1"));
    assert!(output.contains("Pass 2"));
    assert!(output.contains("Scheduler finished: 2 passes, 0 failed, 0 entry errors"));
    assert_mirrored(&roots.source, &roots.replica);
}

#[test]
fn test_run_reports_failed_passes_with_entry_error_status() {
    let roots = Roots::new();

    let (status, output) = run(
        &context(),
        &[
            "run",
            "--source",
            roots.source.to_str().unwrap(),
            "--replica",
            roots.replica.to_str().unwrap(),
            "--interval",
            "0",
            "--iterations",
            "1",
        ],
    );

    assert_eq!(status.unwrap(), ExitStatus::EntryErrors);
    assert!(output.contains("Pass failed"));
}

#[test]
fn test_run_stop_on_fatal_is_an_error() {
    let roots = Roots::new();

    let (status, _) = run(
        &context(),
        &[
            "run",
            "--source",
            roots.source.to_str().unwrap(),
            "--replica",
            roots.replica.to_str().unwrap(),
            "--interval",
            "0",
            "--iterations",
            "3",
            "--stop-on-fatal",
        ],
    );

    assert!(matches!(status.unwrap_err(), ApiError::Sync(_)));
}

#[test]
fn test_once_without_roots_is_a_config_error() {
    let (status, output) = run(&context(), &["once"]);
    assert!(matches!(status.unwrap_err(), ApiError::ConfigError(_)));
    assert!(output.is_empty());
}

#[test]
fn test_once_rejects_nested_roots() {
    let roots = Roots::new();
    let (status, _) = run(
        &context(),
        &[
            "once",
            "--source",
            roots.source.to_str().unwrap(),
            "--replica",
            roots.source.join("mirror").to_str().unwrap(),
        ],
    );
    assert!(matches!(status.unwrap_err(), ApiError::ConfigError(_)));
}

#[test]
fn test_config_command_prints_toml() {
    let roots = Roots::new();
    let config = MirrorConfig {
        source: Some(roots.source.clone()),
        replica: Some(roots.base.join("replica")),
        ..MirrorConfig::default()
    };
    let context = RunContext::from_config(config.clone());

    let (status, output) = run(&context, &["config"]);

    assert_eq!(status.unwrap(), ExitStatus::Clean);
    let parsed: MirrorConfig = toml::from_str(&output).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_ignore_flag_applies_to_both_trees() {
    let roots = Roots::new();
    write_tree(&roots.source, &[("a.txt", Some("a")), ("tmp/scratch", Some("s"))]);
    write_tree(&roots.replica, &[("tmp/keep", Some("k"))]);

    let (status, _) = run(
        &context(),
        &[
            "once",
            "--source",
            roots.source.to_str().unwrap(),
            "--replica",
            roots.replica.to_str().unwrap(),
            "--ignore",
            "tmp,.cache",
        ],
    );

    assert_eq!(status.unwrap(), ExitStatus::Clean);
    assert!(roots.replica.join("a.txt").exists());
    assert!(roots.replica.join("tmp/keep").exists());
    assert!(!roots.replica.join("tmp/scratch").exists());
}
