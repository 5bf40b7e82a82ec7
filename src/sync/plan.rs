//! Diff planning between a source snapshot and a replica snapshot

use crate::error::{EntryError, SyncError};
use crate::tree::hasher::digest_file;
use crate::tree::path;
use crate::tree::walker::{Entry, EntryKind, FileEntry, Snapshot, UnmappedEntry};
use serde::Serialize;
use std::cmp::Reverse;
use tracing::{debug, warn};

/// Whether a copy creates a new replica file or overwrites a stale one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyKind {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyAction {
    pub relative_path: String,
    pub kind: CopyKind,
}

/// Planner options
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Treat files with equal size and an up-to-date replica mtime as unchanged
    /// without hashing them
    pub prefilter: bool,
}

/// Actions that make a replica match its source
///
/// `create_dirs` is ordered parent-before-child; `delete_dirs` is ordered
/// deepest-first so every directory is empty of stale descendants by the
/// time it is removed.
#[derive(Debug, Default, Serialize)]
pub struct SyncPlan {
    pub create_dirs: Vec<String>,
    pub copy_files: Vec<CopyAction>,
    pub delete_files: Vec<String>,
    pub delete_dirs: Vec<String>,
    /// Replica entries without a UTF-8 name; removed before `delete_dirs`
    pub delete_unmapped: Vec<UnmappedEntry>,
    /// Entries that could not be scanned or planned
    pub errors: Vec<EntryError>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.action_count() == 0
    }

    pub fn action_count(&self) -> usize {
        self.create_dirs.len()
            + self.copy_files.len()
            + self.delete_files.len()
            + self.delete_dirs.len()
            + self.delete_unmapped.len()
    }

    pub fn count_copies(&self, kind: CopyKind) -> usize {
        self.copy_files.iter().filter(|c| c.kind == kind).count()
    }
}

enum Comparison {
    Same,
    Changed,
    SourceUnreadable(SyncError),
}

/// Compute the plan that turns `replica` into a mirror of `source`
///
/// A path that is a directory on one side and a file on the other is
/// planned as an independent delete and create. Replica entries inside a
/// source subtree that could not be read are left alone.
pub fn plan(source: &Snapshot, replica: &Snapshot, options: PlanOptions) -> SyncPlan {
    let mut plan = SyncPlan::default();

    for entry in source.entries() {
        match entry {
            Entry::Directory { relative_path } => {
                if !replica.contains(relative_path, EntryKind::Directory) {
                    plan.create_dirs.push(relative_path.clone());
                }
            }
            Entry::File(file) => match replica.get_file(&file.relative_path) {
                None => plan.copy_files.push(CopyAction {
                    relative_path: file.relative_path.clone(),
                    kind: CopyKind::Create,
                }),
                Some(existing) => match compare_files(file, existing, options) {
                    Comparison::Same => {}
                    Comparison::Changed => plan.copy_files.push(CopyAction {
                        relative_path: file.relative_path.clone(),
                        kind: CopyKind::Update,
                    }),
                    Comparison::SourceUnreadable(error) => {
                        plan.errors.push(EntryError::new(file.relative_path.clone(), error));
                    }
                },
            },
        }
    }

    for entry in replica.entries() {
        let relative_path = entry.relative_path();
        if source.contains(relative_path, entry.kind()) {
            continue;
        }
        if source.is_incomplete(relative_path) {
            debug!(relative_path, "Source subtree unread, keeping replica entry");
            continue;
        }
        match entry.kind() {
            EntryKind::File => plan.delete_files.push(relative_path.to_string()),
            EntryKind::Directory => plan.delete_dirs.push(relative_path.to_string()),
        }
    }

    plan.delete_unmapped = replica
        .unmapped()
        .iter()
        .filter(|entry| !source.is_incomplete(&entry.display_path))
        .cloned()
        .collect();

    plan.create_dirs
        .sort_by(|a, b| path::depth(a).cmp(&path::depth(b)).then_with(|| a.cmp(b)));
    plan.delete_dirs
        .sort_by(|a, b| Reverse(path::depth(a)).cmp(&Reverse(path::depth(b))).then_with(|| a.cmp(b)));

    debug!(
        create_dirs = plan.create_dirs.len(),
        copy_files = plan.copy_files.len(),
        delete_files = plan.delete_files.len(),
        delete_dirs = plan.delete_dirs.len(),
        delete_unmapped = plan.delete_unmapped.len(),
        errors = plan.errors.len(),
        "Computed sync plan"
    );
    plan
}

fn compare_files(source: &FileEntry, replica: &FileEntry, options: PlanOptions) -> Comparison {
    if options.prefilter {
        if source.size != replica.size {
            return Comparison::Changed;
        }
        if let (Some(source_mtime), Some(replica_mtime)) = (source.modified, replica.modified) {
            if replica_mtime >= source_mtime {
                return Comparison::Same;
            }
        }
    }

    let source_digest = match digest_file(&source.absolute_path) {
        Ok(digest) => digest,
        Err(error) => return Comparison::SourceUnreadable(error),
    };
    match digest_file(&replica.absolute_path) {
        Ok(replica_digest) if replica_digest == source_digest => Comparison::Same,
        Ok(_) => Comparison::Changed,
        Err(error) => {
            warn!(
                relative_path = %replica.relative_path,
                error = %error,
                "Replica file unreadable, scheduling overwrite"
            );
            Comparison::Changed
        }
    }
}
