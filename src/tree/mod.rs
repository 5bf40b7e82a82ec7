//! Filesystem trees
//!
//! Scanning a root into a snapshot of relative entries, normalizing the
//! paths that identify them, and digesting file content.

pub mod hasher;
pub mod path;
pub mod walker;
