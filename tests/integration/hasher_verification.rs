//! Hasher Implementation Verification Tests
//!
//! Tests to verify that our hasher implementation correctly uses BLAKE3
//! and that copies are verified against it.

use foldsync::sync::executor::copy_verified;
use foldsync::tree::hasher;
use std::fs;
use tempfile::TempDir;

/// Test that content digests match BLAKE3 directly
#[test]
fn test_digest_matches_blake3() {
    let content = b"test content";

    let ours = hasher::digest_bytes(content);
    let direct = blake3::hash(content);

    assert_eq!(ours.as_bytes(), direct.as_bytes());
    assert_eq!(ours.to_hex(), direct.to_hex().to_string());
}

/// Test that streaming a file larger than one block matches one-shot hashing
#[test]
fn test_file_digest_spans_blocks() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("large.bin");
    let content: Vec<u8> = (0..hasher::BLOCK_SIZE * 3 + 17)
        .map(|i| (i % 251) as u8)
        .collect();
    fs::write(&path, &content).unwrap();

    assert_eq!(
        hasher::digest_file(&path).unwrap(),
        hasher::digest_bytes(&content)
    );
}

#[test]
fn test_verified_copy_returns_source_digest() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("source.bin");
    let target = temp_dir.path().join("target.bin");
    let content = vec![7u8; hasher::BLOCK_SIZE + 1];
    fs::write(&source, &content).unwrap();

    let digest = copy_verified(&source, &target).unwrap();

    assert_eq!(digest, hasher::digest_bytes(&content));
    assert_eq!(fs::read(&target).unwrap(), content);
    assert!(hasher::files_match(&source, &target).unwrap());
}

#[test]
fn test_empty_files_match() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a");
    let b = temp_dir.path().join("b");
    fs::write(&a, "").unwrap();
    fs::write(&b, "").unwrap();

    assert!(hasher::files_match(&a, &b).unwrap());
    assert_eq!(hasher::digest_file(&a).unwrap(), hasher::digest_bytes(b""));
}
