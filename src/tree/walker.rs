//! Filesystem walker producing per-pass snapshots of a root

use crate::error::{EntryError, SyncError};
use crate::tree::path;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A regular file found under a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub relative_path: String,
    /// Location on disk, valid only for the pass that scanned it
    pub absolute_path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Filesystem entry relative to a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileEntry),
    Directory { relative_path: String },
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::File(_) => EntryKind::File,
            Entry::Directory { .. } => EntryKind::Directory,
        }
    }

    pub fn relative_path(&self) -> &str {
        match self {
            Entry::File(file) => &file.relative_path,
            Entry::Directory { relative_path } => relative_path,
        }
    }
}

/// An entry whose name is not valid UTF-8
///
/// It has no relative path key, so it can never match a source entry. A
/// directory of this kind is reported once and not descended into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedEntry {
    /// Lossy rendering used in reports
    pub display_path: String,
    #[serde(skip)]
    pub absolute_path: PathBuf,
    pub kind: EntryKind,
}

/// Every file and directory beneath one root at one instant
///
/// Entries are sorted by relative path. Lookups are keyed by
/// `(relative_path, kind)`, which is unique within a snapshot. Entries that
/// could not be read are reported in `errors`, and the subtrees they head are
/// listed as incomplete.
#[derive(Debug)]
pub struct Snapshot {
    root: PathBuf,
    entries: Vec<Entry>,
    index: HashMap<(String, EntryKind), usize>,
    unmapped: Vec<UnmappedEntry>,
    incomplete: Vec<String>,
    errors: Vec<EntryError>,
}

impl Snapshot {
    /// Snapshot of a root that holds nothing (or does not exist yet)
    pub fn empty(root: PathBuf) -> Self {
        Self {
            root,
            entries: Vec::new(),
            index: HashMap::new(),
            unmapped: Vec::new(),
            incomplete: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn from_entries(root: PathBuf, mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| {
            a.relative_path()
                .cmp(b.relative_path())
                .then(a.kind().cmp(&b.kind()))
        });
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| ((entry.relative_path().to_string(), entry.kind()), i))
            .collect();
        Self {
            entries,
            index,
            ..Self::empty(root)
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::File(file) => Some(file),
            Entry::Directory { .. } => None,
        })
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Directory { relative_path } => Some(relative_path.as_str()),
            Entry::File(_) => None,
        })
    }

    pub fn get(&self, relative_path: &str, kind: EntryKind) -> Option<&Entry> {
        self.index
            .get(&(relative_path.to_string(), kind))
            .map(|&i| &self.entries[i])
    }

    pub fn get_file(&self, relative_path: &str) -> Option<&FileEntry> {
        match self.get(relative_path, EntryKind::File) {
            Some(Entry::File(file)) => Some(file),
            _ => None,
        }
    }

    pub fn contains(&self, relative_path: &str, kind: EntryKind) -> bool {
        self.index.contains_key(&(relative_path.to_string(), kind))
    }

    pub fn unmapped(&self) -> &[UnmappedEntry] {
        &self.unmapped
    }

    /// Paths whose contents could not be fully read
    pub fn incomplete(&self) -> &[String] {
        &self.incomplete
    }

    /// Whether `relative_path` lies in a subtree the scan could not read
    pub fn is_incomplete(&self, relative_path: &str) -> bool {
        self.incomplete
            .iter()
            .any(|unread| path::is_within(unread, relative_path))
    }

    pub fn errors(&self) -> &[EntryError] {
        &self.errors
    }

    /// Move the scan errors out, leaving the snapshot itself intact
    pub fn take_errors(&mut self) -> Vec<EntryError> {
        std::mem::take(&mut self.errors)
    }
}

/// Scanner configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Path component names excluded from the walk (e.g. ".git")
    pub ignore_patterns: Vec<String>,
}

/// Tree scanner for one root
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the root and build a snapshot of everything beneath it
    ///
    /// Fails with `RootNotFound` when the root is missing, and with `Read`
    /// only when the root itself cannot be listed. An unreadable entry below
    /// the root is recorded in the snapshot and the walk continues.
    /// Symbolic links are neither followed nor reported.
    pub fn scan(&self) -> Result<Snapshot, SyncError> {
        match std::fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(SyncError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::RootNotFound(self.root.clone()))
            }
            Err(e) => {
                return Err(SyncError::Read {
                    path: self.root.clone(),
                    source: e,
                })
            }
        }

        let mut entries = Vec::new();
        let mut unmapped = Vec::new();
        let mut unread = Vec::new();
        let mut walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.should_ignore(entry));

        while let Some(next) = walker.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(error) => {
                    let failed_path = error
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    if error.depth() == 0 {
                        return Err(SyncError::Read {
                            path: failed_path,
                            source: error.into(),
                        });
                    }
                    unread.push((failed_path, std::io::Error::from(error)));
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let file_type = entry.file_type();
            let Some(relative_path) = path::relative_path(&self.root, entry.path()) else {
                let display_path = path::display_relative(&self.root, entry.path());
                warn!(path = %display_path, "Entry name is not valid UTF-8");
                let kind = if file_type.is_dir() {
                    walker.skip_current_dir();
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                unmapped.push(UnmappedEntry {
                    display_path,
                    absolute_path: entry.path().to_path_buf(),
                    kind,
                });
                continue;
            };

            if file_type.is_dir() {
                entries.push(Entry::Directory { relative_path });
            } else if file_type.is_file() {
                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(error) => {
                        unread.push((entry.path().to_path_buf(), error.into()));
                        continue;
                    }
                };
                entries.push(Entry::File(FileEntry {
                    relative_path,
                    absolute_path: entry.path().to_path_buf(),
                    size: metadata.len(),
                    modified: metadata.modified().ok(),
                }));
            } else {
                debug!(relative_path = %relative_path, "Skipping non-regular entry");
            }
        }

        let mut snapshot = Snapshot::from_entries(self.root.clone(), entries);
        snapshot.unmapped = unmapped;
        for (failed_path, source) in unread {
            let relative_path = path::display_relative(&self.root, &failed_path);
            warn!(relative_path = %relative_path, error = %source, "Entry could not be read");
            snapshot.incomplete.push(relative_path.clone());
            snapshot.errors.push(EntryError::new(
                relative_path,
                SyncError::Read {
                    path: failed_path,
                    source,
                },
            ));
        }

        debug!(
            root = %self.root.display(),
            entries = snapshot.len(),
            unread = snapshot.errors.len(),
            "Scanned root"
        );
        Ok(snapshot)
    }

    /// Check if an entry's name matches an ignore pattern
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.as_str() == name)
    }
}
