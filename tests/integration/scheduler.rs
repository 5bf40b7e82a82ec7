//! Scheduler behavior across several passes on a changing source tree

use crate::integration::test_utils::{assert_mirrored, write_tree, Roots};
use foldsync::actions::{LogLevel, MemoryLog};
use foldsync::sync::{ScheduleConfig, Scheduler};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_scheduler_picks_up_changes_between_passes() {
    let roots = Roots::new();
    write_tree(&roots.source, &[("a.txt", Some("one"))]);

    let log = Arc::new(MemoryLog::new());
    let scheduler = Scheduler::new(
        roots.controller(log.clone()),
        ScheduleConfig {
            interval: Duration::from_millis(5),
            iterations: Some(3),
            stop_on_fatal: false,
        },
    );

    let source = roots.source.clone();
    let mut changes = Vec::new();
    let summary = scheduler
        .run_with(|iteration, outcome| {
            let result = outcome.as_ref().unwrap();
            changes.push(result.total_changes());
            if iteration == 1 {
                fs::write(source.join("b.txt"), "two").unwrap();
            }
        })
        .unwrap();

    assert_eq!(summary.passes, 3);
    assert_eq!(summary.failed_passes, 0);
    assert!(!summary.cancelled);
    assert_eq!(changes, vec![1, 1, 0]);
    assert_mirrored(&roots.source, &roots.replica);
    assert!(log.contains(LogLevel::Info, "Starting pass 3 of 3"));
    assert!(log.contains(LogLevel::Info, "Scheduler finished: 3 passes"));
}

#[test]
fn test_scheduler_recovers_after_fatal_pass() {
    let roots = Roots::new();

    let log = Arc::new(MemoryLog::new());
    let scheduler = Scheduler::new(
        roots.controller(log.clone()),
        ScheduleConfig {
            interval: Duration::from_millis(5),
            iterations: Some(2),
            stop_on_fatal: false,
        },
    );

    // First pass sees an empty source; the second sees a populated one
    let source = roots.source.clone();
    let summary = scheduler
        .run_with(|iteration, outcome| {
            if iteration == 1 {
                assert!(outcome.is_err());
                fs::write(source.join("late.txt"), "late").unwrap();
            } else {
                assert_eq!(outcome.as_ref().unwrap().files_created, 1);
            }
        })
        .unwrap();

    assert_eq!(summary.passes, 2);
    assert_eq!(summary.failed_passes, 1);
    assert!(log.contains(LogLevel::Warning, "Pass 1 failed"));
    assert_mirrored(&roots.source, &roots.replica);
}

#[test]
fn test_cancel_from_another_thread_stops_unbounded_run() {
    let roots = Roots::new();
    write_tree(&roots.source, &[("a.txt", Some("a"))]);

    let scheduler = Scheduler::new(
        roots.controller(Arc::new(MemoryLog::new())),
        ScheduleConfig {
            interval: Duration::from_secs(60),
            iterations: None,
            stop_on_fatal: false,
        },
    );
    let cancel = scheduler.controller().cancel_token().clone();

    let handle = std::thread::spawn(move || scheduler.run().unwrap());
    std::thread::sleep(Duration::from_millis(100));
    cancel.cancel();
    let summary = handle.join().unwrap();

    assert!(summary.cancelled);
    assert!(summary.passes >= 1);
}
