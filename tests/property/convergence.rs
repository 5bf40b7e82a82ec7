//! Property-based tests: one pass converges, a second pass changes nothing

use foldsync::actions::MemoryLog;
use foldsync::sync::PassController;
use foldsync::tree::hasher;
use foldsync::tree::walker::{Entry, Walker};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

type Tree = BTreeMap<String, Option<String>>;

/// Arbitrary small trees over a tiny name alphabet so that source and
/// replica overlap, including paths that are files on one side and
/// directories on the other.
fn tree_strategy() -> impl Strategy<Value = Tree> {
    let name = prop::sample::select(vec!["a", "b", "c"]);
    let path = prop::collection::vec(name, 1..4).prop_map(|parts| parts.join("/"));
    let content = prop::option::of(prop::sample::select(vec!["", "x", "xy", "yx", "hello"]))
        .prop_map(|c| c.map(str::to_string));
    prop::collection::vec((path, content), 0..12).prop_map(|nodes| {
        let mut tree = Tree::new();
        let mut sorted = nodes;
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        for (path, content) in sorted {
            let blocked = tree.contains_key(&path)
                || ancestors(&path).any(|ancestor| matches!(tree.get(ancestor), Some(Some(_))));
            if !blocked {
                tree.insert(path, content);
            }
        }
        tree
    })
}

fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(i, _)| &path[..i])
}

fn materialize(root: &Path, tree: &Tree) {
    fs::create_dir_all(root).unwrap();
    for (relative_path, content) in tree {
        let target = root.join(relative_path);
        match content {
            Some(content) => {
                fs::create_dir_all(target.parent().unwrap()).unwrap();
                fs::write(&target, content).unwrap();
            }
            None => fs::create_dir_all(&target).unwrap(),
        }
    }
}

fn state(root: &Path) -> BTreeMap<String, Option<String>> {
    Walker::new(root.to_path_buf())
        .scan()
        .unwrap()
        .entries()
        .iter()
        .map(|entry| match entry {
            Entry::File(file) => (
                file.relative_path.clone(),
                Some(hasher::digest_file(&file.absolute_path).unwrap().to_hex()),
            ),
            Entry::Directory { relative_path } => (relative_path.clone(), None),
        })
        .collect()
}

/// Test that a single pass makes the replica an exact mirror of the source
#[test]
fn test_one_pass_converges_property() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(
            &(tree_strategy(), tree_strategy()),
            |(source_tree, replica_tree)| {
                let temp_dir = TempDir::new().unwrap();
                let source = temp_dir.path().join("source");
                let replica = temp_dir.path().join("replica");

                // An empty source is fatal; keep one file so every case runs a pass
                let mut source_tree = source_tree;
                source_tree.insert("anchor.txt".to_string(), Some("anchor".to_string()));
                materialize(&source, &source_tree);
                materialize(&replica, &replica_tree);

                let controller =
                    PassController::new(source.clone(), replica.clone(), Arc::new(MemoryLog::new()));
                let first = controller.run_pass().unwrap();
                prop_assert!(!first.has_errors(), "errors: {:?}", first.errors);
                prop_assert_eq!(state(&source), state(&replica));

                let second = controller.run_pass().unwrap();
                prop_assert_eq!(second.total_changes(), 0);
                prop_assert!(controller.plan_only().unwrap().is_empty());

                Ok(())
            },
        )
        .unwrap();
}

/// Test that pass counts match the differences between the two trees
#[test]
fn test_created_and_deleted_counts_property() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&tree_strategy(), |tree| {
            let temp_dir = TempDir::new().unwrap();
            let source = temp_dir.path().join("source");
            let replica = temp_dir.path().join("replica");

            let mut tree = tree;
            tree.insert("anchor.txt".to_string(), Some("anchor".to_string()));
            materialize(&source, &tree);

            let controller =
                PassController::new(source.clone(), replica.clone(), Arc::new(MemoryLog::new()));
            let result = controller.run_pass().unwrap();

            let expected = state(&source);
            let files = expected.values().filter(|v| v.is_some()).count();
            let dirs = expected.len() - files;
            prop_assert_eq!(result.files_created, files);
            prop_assert_eq!(result.dirs_created, dirs);
            prop_assert_eq!(result.files_deleted + result.dirs_deleted, 0);

            Ok(())
        })
        .unwrap();
}
