//! foldsync: Periodic One-Way Folder Mirroring
//!
//! Keeps a replica directory an exact copy of a source directory. Each pass
//! scans both trees, plans the differences by content digest, and applies
//! them to the replica with read-back verification of every copied file.

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod sync;
pub mod tree;
