//! Relative path normalization and root resolution utilities

use std::path::{Component, Path, PathBuf};

/// Compute the normalized relative path of `path` beneath `root`
///
/// Returns `None` when `path` is not under `root`, is the root itself,
/// or contains a segment that is not valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let stripped = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in stripped.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Number of separators in a normalized relative path
pub fn depth(relative_path: &str) -> usize {
    relative_path.matches('/').count()
}

/// Join a normalized relative path onto a root using native separators
pub fn to_native(root: &Path, relative_path: &str) -> PathBuf {
    relative_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Whether `candidate` equals `ancestor` or lies beneath it
pub fn is_within(ancestor: &str, candidate: &str) -> bool {
    candidate == ancestor
        || (candidate.len() > ancestor.len()
            && candidate.starts_with(ancestor)
            && candidate.as_bytes()[ancestor.len()] == b'/')
}

/// Relative path of `path` beneath `root` for reports, replacing invalid
/// UTF-8 with U+FFFD
pub fn display_relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(stripped) => stripped
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

/// Resolve a root to an absolute, canonical form without requiring it to exist
///
/// The deepest existing ancestor is canonicalized with `dunce` and the
/// missing tail is appended unchanged.
pub fn resolve_root(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = dunce::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}
