//! Applies a sync plan to the replica tree
//!
//! Order within a pass: ensure the replica root, create directories
//! parent-first, copy and verify files, delete stale files, remove entries
//! without a UTF-8 name, delete stale directories deepest-first. Every
//! action is isolated: a failure is recorded in the pass result and the
//! remaining actions are still attempted.

use crate::actions::{ActionLog, LogLevel};
use crate::error::SyncError;
use crate::sync::cancel::CancelToken;
use crate::sync::plan::{CopyAction, CopyKind, SyncPlan};
use crate::sync::result::PassResult;
use crate::tree::hasher::{digest_file, Digest, BLOCK_SIZE};
use crate::tree::path;
use crate::tree::walker::{EntryKind, UnmappedEntry};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct Executor {
    log: Arc<dyn ActionLog>,
    cancel: CancelToken,
}

impl Executor {
    pub fn new(log: Arc<dyn ActionLog>) -> Self {
        Self {
            log,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Apply `plan` and report what happened
    pub fn execute(&self, plan: SyncPlan, source_root: &Path, replica_root: &Path) -> PassResult {
        let mut result = PassResult::begin();
        let SyncPlan {
            create_dirs,
            copy_files,
            delete_files,
            delete_dirs,
            delete_unmapped,
            errors,
        } = plan;

        for planning_error in errors {
            self.fail(&mut result, planning_error.relative_path, planning_error.error);
        }

        match fs::create_dir_all(replica_root) {
            Ok(()) => {
                let mut applier = Applier {
                    executor: self,
                    source_root,
                    replica_root,
                    cleared: Vec::new(),
                    result: &mut result,
                };
                applier.apply(
                    &create_dirs,
                    &copy_files,
                    &delete_files,
                    &delete_unmapped,
                    &delete_dirs,
                );
            }
            Err(source) => self.fail(
                &mut result,
                ".",
                SyncError::Write {
                    path: replica_root.to_path_buf(),
                    source,
                },
            ),
        }

        result.finish();
        result
    }

    fn fail(&self, result: &mut PassResult, relative_path: impl Into<String>, error: SyncError) {
        let relative_path = relative_path.into();
        self.log
            .record(LogLevel::Error, &format!("{}: {}", relative_path, error));
        result.record_error(relative_path, error);
    }
}

/// State for one application of a plan
struct Applier<'a> {
    executor: &'a Executor,
    source_root: &'a Path,
    replica_root: &'a Path,
    /// Replica paths removed to make room for an entry of the other kind
    cleared: Vec<String>,
    result: &'a mut PassResult,
}

impl Applier<'_> {
    fn apply(
        &mut self,
        create_dirs: &[String],
        copy_files: &[CopyAction],
        delete_files: &[String],
        delete_unmapped: &[UnmappedEntry],
        delete_dirs: &[String],
    ) {
        for relative_path in create_dirs {
            if self.interrupted() {
                return;
            }
            self.create_dir(relative_path);
        }
        for action in copy_files {
            if self.interrupted() {
                return;
            }
            self.copy_file(action);
        }
        for relative_path in delete_files {
            if self.interrupted() {
                return;
            }
            self.delete_file(relative_path);
        }
        for entry in delete_unmapped {
            if self.interrupted() {
                return;
            }
            self.delete_unmapped(entry);
        }
        for relative_path in delete_dirs {
            if self.interrupted() {
                return;
            }
            self.delete_dir(relative_path);
        }
    }

    fn interrupted(&mut self) -> bool {
        if !self.executor.cancel.is_cancelled() {
            return false;
        }
        if !self.result.cancelled {
            self.result.cancelled = true;
            self.record(LogLevel::Warning, "Pass cancelled, remaining actions skipped".to_string());
        }
        true
    }

    fn create_dir(&mut self, relative_path: &str) {
        let target = path::to_native(self.replica_root, relative_path);
        match fs::symlink_metadata(&target) {
            Ok(metadata) if metadata.is_dir() => {
                debug!(relative_path, "Directory already present");
                return;
            }
            Ok(_) => {
                if let Err(source) = fs::remove_file(&target) {
                    self.fail(relative_path, SyncError::Delete { path: target, source });
                    return;
                }
                self.cleared.push(relative_path.to_string());
            }
            Err(_) => {}
        }

        match fs::create_dir(&target) {
            Ok(()) => {
                self.result.dirs_created += 1;
                self.record(LogLevel::Info, format!("Created directory {}", relative_path));
            }
            Err(source) => self.fail(relative_path, SyncError::Write { path: target, source }),
        }
    }

    fn copy_file(&mut self, action: &CopyAction) {
        let relative_path = action.relative_path.as_str();
        let source = path::to_native(self.source_root, relative_path);
        let target = path::to_native(self.replica_root, relative_path);

        if let Ok(metadata) = fs::symlink_metadata(&target) {
            let cleared = if metadata.is_dir() {
                fs::remove_dir_all(&target)
            } else if metadata.file_type().is_symlink() {
                fs::remove_file(&target)
            } else {
                Ok(())
            };
            if let Err(source) = cleared {
                self.fail(relative_path, SyncError::Delete { path: target, source });
                return;
            }
            if metadata.is_dir() {
                self.cleared.push(relative_path.to_string());
            }
        }

        match copy_verified(&source, &target) {
            Ok(digest) => {
                let verb = match action.kind {
                    CopyKind::Create => {
                        self.result.files_created += 1;
                        "Created"
                    }
                    CopyKind::Update => {
                        self.result.files_updated += 1;
                        "Updated"
                    }
                };
                debug!(relative_path, digest = %digest, "Copy verified");
                self.record(LogLevel::Info, format!("{} file {}", verb, relative_path));
            }
            Err(error) => self.fail(relative_path, error),
        }
    }

    fn delete_file(&mut self, relative_path: &str) {
        if self.is_cleared(relative_path) {
            self.result.files_deleted += 1;
            self.record(LogLevel::Info, format!("Deleted file {}", relative_path));
            return;
        }

        let target = path::to_native(self.replica_root, relative_path);
        match fs::remove_file(&target) {
            Ok(()) => {
                self.result.files_deleted += 1;
                self.record(LogLevel::Info, format!("Deleted file {}", relative_path));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(relative_path, "File already removed");
            }
            Err(source) => self.fail(relative_path, SyncError::Delete { path: target, source }),
        }
    }

    fn delete_dir(&mut self, relative_path: &str) {
        if self.is_cleared(relative_path) {
            self.result.dirs_deleted += 1;
            self.record(LogLevel::Info, format!("Deleted directory {}", relative_path));
            return;
        }

        let target = path::to_native(self.replica_root, relative_path);
        match fs::remove_dir(&target) {
            Ok(()) => {
                self.result.dirs_deleted += 1;
                self.record(LogLevel::Info, format!("Deleted directory {}", relative_path));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(relative_path, "Directory already removed");
            }
            Err(source) => self.fail(relative_path, SyncError::Delete { path: target, source }),
        }
    }

    /// Remove an entry that has no relative path key, whole subtree included
    fn delete_unmapped(&mut self, entry: &UnmappedEntry) {
        let display_path = entry.display_path.as_str();
        let (removed, noun) = if self.is_cleared(display_path) {
            (Ok(()), "entry")
        } else {
            match entry.kind {
                EntryKind::Directory => (fs::remove_dir_all(&entry.absolute_path), "directory"),
                EntryKind::File => (fs::remove_file(&entry.absolute_path), "file"),
            }
        };

        match removed {
            Ok(()) => {
                match entry.kind {
                    EntryKind::Directory => self.result.dirs_deleted += 1,
                    EntryKind::File => self.result.files_deleted += 1,
                }
                self.record(LogLevel::Info, format!("Deleted {} {}", noun, display_path));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(display_path, "Entry already removed");
            }
            Err(source) => self.fail(
                display_path,
                SyncError::Delete {
                    path: entry.absolute_path.clone(),
                    source,
                },
            ),
        }
    }

    fn is_cleared(&self, relative_path: &str) -> bool {
        self.cleared
            .iter()
            .any(|cleared| path::is_within(cleared, relative_path))
    }

    fn record(&self, level: LogLevel, message: String) {
        self.executor.log.record(level, &message);
    }

    fn fail(&mut self, relative_path: &str, error: SyncError) {
        self.executor.fail(self.result, relative_path, error);
    }
}

/// Stream `source` into `target` and verify the written bytes
///
/// The source digest is folded while copying; the replica digest is then
/// recomputed from disk. Returns the verified digest.
pub fn copy_verified(source: &Path, target: &Path) -> Result<Digest, SyncError> {
    let read_error = |e| SyncError::Read {
        path: source.to_path_buf(),
        source: e,
    };
    let write_error = |e| SyncError::Write {
        path: target.to_path_buf(),
        source: e,
    };

    let mut reader = File::open(source).map_err(read_error)?;
    let mut writer = File::create(target).map_err(write_error)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        };
        hasher.update(&buffer[..bytes_read]);
        writer.write_all(&buffer[..bytes_read]).map_err(write_error)?;
    }
    writer.flush().map_err(write_error)?;
    drop(writer);

    verify_written(target, Digest::from(hasher.finalize()))
}

/// Re-read `target` from disk and compare it against the digest of the
/// bytes that were written
fn verify_written(target: &Path, expected: Digest) -> Result<Digest, SyncError> {
    let actual = digest_file(target)?;
    if expected != actual {
        return Err(SyncError::Integrity {
            path: target.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(actual)
}
